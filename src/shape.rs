//! The persistable shape entity.

use crate::codec::{PersistError, SaveReader, SaveWriter};
use crate::math::{Rgba, Transform};

/// A typed, transform-bearing entity. The shape id is fixed at
/// instantiation and routes the shape back to its pool on reclaim; the
/// material id is reapplied on every checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    shape_id: u32,
    material_id: u32,
    pub transform: Transform,
    pub color: Rgba,
}

impl Shape {
    pub fn new(shape_id: u32) -> Self {
        Self {
            shape_id,
            material_id: 0,
            transform: Transform::default(),
            color: Rgba::WHITE,
        }
    }

    pub fn shape_id(&self) -> u32 {
        self.shape_id
    }

    pub fn material_id(&self) -> u32 {
        self.material_id
    }

    pub fn set_material(&mut self, material_id: u32) {
        self.material_id = material_id;
    }

    /// Append this shape's own state. Field order is fixed here and
    /// mirrored exactly by [`Shape::load`]; the surrounding ids are the
    /// session's concern, not the shape's.
    pub fn save(&self, writer: &mut SaveWriter) {
        writer.write_vec3(self.transform.position);
        writer.write_quat(self.transform.rotation);
        writer.write_vec3(self.transform.scale);
        writer.write_color(self.color);
    }

    /// Restore state in place, so pooled instances are reloaded rather
    /// than reconstructed.
    pub fn load(&mut self, reader: &mut SaveReader) -> Result<(), PersistError> {
        self.transform.position = reader.read_vec3()?;
        self.transform.rotation = reader.read_quat()?;
        self.transform.scale = reader.read_vec3()?;
        self.color = reader.read_color()?;
        Ok(())
    }
}
