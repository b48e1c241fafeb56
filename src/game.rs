//! Session controller: the live shape population, the spawn/destroy tick
//! loop, and whole-population save/load including the version policy for
//! older stream formats.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::codec::{PersistError, PersistentStorage, SaveReader, SaveWriter};
use crate::factory::ShapeFactory;
use crate::level::{LevelLoader, FIRST_LEVEL};
use crate::math::{Quat, Rgba, Vec3};
use crate::shape::Shape;

/// Newest stream format this build reads and writes.
pub const SAVE_VERSION: i32 = 2;

const SPAWN_RADIUS: f32 = 5.0;
const SCALE_RANGE: (f32, f32) = (0.1, 1.0);

/// Which leading fields a stream revision carries. Each revision adds
/// exactly one field in front of the previous layout, so decoding is a
/// single forward pass; a future version 3 is one more variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveLayout {
    /// Pre-versioning streams: the negated header is the shape count, and
    /// shapes carry no ids (everything is type 0, material 0).
    CountInHeader,
    /// Explicit count and per-shape ids; level is fixed at the first one.
    TaggedShapes,
    /// Adds the persisted level id.
    TaggedShapesWithLevel,
}

impl SaveLayout {
    fn for_version(version: i32) -> Result<Self, PersistError> {
        if version > SAVE_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: version,
                supported: SAVE_VERSION,
            });
        }
        Ok(match version {
            v if v <= 0 => Self::CountInHeader,
            1 => Self::TaggedShapes,
            _ => Self::TaggedShapesWithLevel,
        })
    }

    fn shape_count(self, reader: &mut SaveReader) -> Result<i32, PersistError> {
        match self {
            Self::CountInHeader => Ok(-reader.version()),
            _ => reader.read_i32(),
        }
    }

    fn level_id(self, reader: &mut SaveReader) -> Result<i32, PersistError> {
        match self {
            Self::TaggedShapesWithLevel => reader.read_i32(),
            _ => Ok(FIRST_LEVEL),
        }
    }

    fn has_shape_ids(self) -> bool {
        !matches!(self, Self::CountInHeader)
    }
}

pub struct GameSettings {
    pub seed: u64,
    pub level_count: i32,
    pub creation_speed: f32,
    pub destruction_speed: f32,
}

pub struct Game<L: LevelLoader> {
    factory: ShapeFactory,
    loader: L,
    shapes: Vec<Shape>,
    rng: ChaCha8Rng,
    creation_progress: f32,
    destruction_progress: f32,
    pub creation_speed: f32,
    pub destruction_speed: f32,
    level_count: i32,
    loaded_level: i32,
    enabled: bool,
}

impl<L: LevelLoader> Game<L> {
    pub fn new(factory: ShapeFactory, loader: L, settings: &GameSettings) -> Self {
        Self {
            factory,
            loader,
            shapes: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            creation_progress: 0.0,
            destruction_progress: 0.0,
            creation_speed: settings.creation_speed,
            destruction_speed: settings.destruction_speed,
            level_count: settings.level_count,
            loaded_level: 0,
            enabled: true,
        }
    }

    /// Bring up the first level before any updates run.
    pub async fn start(&mut self) {
        self.load_level(FIRST_LEVEL).await;
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn loaded_level(&self) -> i32 {
        self.loaded_level
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn factory(&self) -> &ShapeFactory {
        &self.factory
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Advance the spawn/destroy accumulators by one tick. Each whole unit
    /// of accumulated progress fires exactly one action, so total actions
    /// over any wall-clock span depend only on elapsed time times speed,
    /// not on how the span was sliced into ticks.
    pub fn update(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }

        self.creation_progress += dt * self.creation_speed;
        while self.creation_progress >= 1.0 {
            self.creation_progress -= 1.0;
            self.create_shape();
        }

        self.destruction_progress += dt * self.destruction_speed;
        while self.destruction_progress >= 1.0 {
            self.destruction_progress -= 1.0;
            self.destroy_shape();
        }
    }

    pub fn create_shape(&mut self) {
        let mut shape = self.factory.get_random(&mut self.rng);
        shape.transform.position = Vec3::random_in_sphere(&mut self.rng, SPAWN_RADIUS);
        shape.transform.rotation = Quat::random_rotation(&mut self.rng);
        shape.transform.scale = Vec3::splat(self.rng.gen_range(SCALE_RANGE.0..SCALE_RANGE.1));
        shape.color = Rgba::random_hsv(
            &mut self.rng,
            (0.0, 1.0),
            (0.5, 1.0),
            (0.25, 1.0),
            (1.0, 1.0),
        );
        self.shapes.push(shape);
    }

    /// Reclaim one uniformly chosen live shape. Removal swaps the last
    /// element into the hole; the collection is order-irrelevant.
    pub fn destroy_shape(&mut self) {
        if self.shapes.is_empty() {
            return;
        }
        let index = self.rng.gen_range(0..self.shapes.len());
        let victim = self.shapes.swap_remove(index);
        self.factory.reclaim(victim);
    }

    /// Reclaim the whole population.
    pub fn begin_new_game(&mut self) {
        for shape in self.shapes.drain(..) {
            self.factory.reclaim(shape);
        }
        self.creation_progress = 0.0;
        self.destruction_progress = 0.0;
    }

    /// Clear the population and transition to the given level, as the
    /// digit keys do in the interactive build.
    pub async fn switch_level(&mut self, level: i32) {
        assert!(
            (FIRST_LEVEL..=self.level_count).contains(&level),
            "level {} out of range 1..={}",
            level,
            self.level_count
        );
        self.begin_new_game();
        self.load_level(level).await;
    }

    /// Persist the population under the rules of the requested format
    /// version. Older layouts are written as they were, which keeps the
    /// load-path branching honest against real legacy streams.
    pub fn save_game(&self, storage: &PersistentStorage, version: i32) -> Result<(), PersistError> {
        let layout = SaveLayout::for_version(version)?;
        // For count-in-header streams the header itself carries the count.
        let header_version = match layout {
            SaveLayout::CountInHeader => -(self.shapes.len() as i32),
            _ => version,
        };
        storage.save_with(header_version, |writer| self.save(writer, layout))
    }

    fn save(&self, writer: &mut SaveWriter, layout: SaveLayout) {
        if layout != SaveLayout::CountInHeader {
            writer.write_i32(self.shapes.len() as i32);
        }
        if layout == SaveLayout::TaggedShapesWithLevel {
            writer.write_i32(self.loaded_level);
        }
        for shape in &self.shapes {
            if layout.has_shape_ids() {
                writer.write_i32(shape.shape_id() as i32);
                writer.write_i32(shape.material_id() as i32);
            }
            shape.save(writer);
        }
    }

    /// Restore a population from storage. A stream newer than this build
    /// aborts before any state is touched; otherwise the current
    /// population is reclaimed, the persisted level transition runs, and
    /// each shape is pulled from the factory and reloaded in place.
    pub async fn load_game(&mut self, storage: &PersistentStorage) -> Result<(), PersistError> {
        let mut reader = storage.open()?;
        let layout = SaveLayout::for_version(reader.version())?;

        self.begin_new_game();
        let count = layout.shape_count(&mut reader)?;
        let level = layout.level_id(&mut reader)?;
        self.load_level(level).await;

        for _ in 0..count {
            let (shape_id, material_id) = if layout.has_shape_ids() {
                (reader.read_i32()? as u32, reader.read_i32()? as u32)
            } else {
                (0, 0)
            };
            let mut shape = self.factory.get(shape_id, material_id);
            shape.load(&mut reader)?;
            self.shapes.push(shape);
        }
        Ok(())
    }

    /// Unload the previous level, load and activate the new one. Updates
    /// are disabled for the duration so no tick mutates the population
    /// mid-transition.
    async fn load_level(&mut self, level: i32) {
        self.enabled = false;
        if self.loaded_level > 0 {
            self.loader.unload(self.loaded_level).await;
        }
        self.loader.load(level).await;
        self.loader.set_active(level);
        self.loaded_level = level;
        self.enabled = true;
    }
}
