//! Plain value types for transforms and colors, plus the random helpers
//! the simulation uses when placing freshly created shapes.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Uniformly distributed point inside a sphere of the given radius,
    /// by rejection sampling from the enclosing cube.
    pub fn random_in_sphere(rng: &mut impl Rng, radius: f32) -> Self {
        loop {
            let candidate = Self {
                x: rng.gen_range(-1.0f32..1.0),
                y: rng.gen_range(-1.0f32..1.0),
                z: rng.gen_range(-1.0f32..1.0),
            };
            if candidate.length() <= 1.0 {
                return Self {
                    x: candidate.x * radius,
                    y: candidate.y * radius,
                    z: candidate.z * radius,
                };
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Uniform random rotation (Shoemake's subgroup algorithm).
    pub fn random_rotation(rng: &mut impl Rng) -> Self {
        use std::f32::consts::TAU;
        let u1: f32 = rng.gen_range(0.0..1.0);
        let u2: f32 = rng.gen_range(0.0..TAU);
        let u3: f32 = rng.gen_range(0.0..TAU);
        let a = (1.0 - u1).sqrt();
        let b = u1.sqrt();
        Self {
            x: a * u2.sin(),
            y: a * u2.cos(),
            z: b * u3.sin(),
            w: b * u3.cos(),
        }
    }
}

/// RGBA color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Random color drawn from an HSV envelope. Ranges are half-open
    /// `[min, max)` except when min == max, which pins the component.
    pub fn random_hsv(
        rng: &mut impl Rng,
        hue: (f32, f32),
        saturation: (f32, f32),
        value: (f32, f32),
        alpha: (f32, f32),
    ) -> Self {
        fn pick(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
            if min >= max {
                min
            } else {
                rng.gen_range(min..max)
            }
        }
        let h = pick(rng, hue);
        let s = pick(rng, saturation);
        let v = pick(rng, value);
        let a = pick(rng, alpha);
        let (r, g, b) = hsv_to_rgb(h, s, v);
        Self { r, g, b, a }
    }
}

/// Convert hue (in turns, [0, 1)), saturation and value to RGB.
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let h = (h.rem_euclid(1.0)) * 6.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i as i32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Position, rotation and scale of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}
