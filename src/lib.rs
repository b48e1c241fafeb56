//! A simulation that continuously spawns and destroys typed shapes, with
//! pooled reuse and versioned binary save files that remain readable across
//! format revisions.

pub mod codec;
pub mod context;
pub mod factory;
pub mod game;
pub mod level;
pub mod math;
pub mod scenario;
pub mod shape;

pub use codec::{PersistError, PersistentStorage, SaveReader, SaveWriter};
pub use context::{MemoryScene, ShapeHandle, SpawnContext};
pub use factory::{FactoryStats, MaterialDef, ShapeFactory, ShapePrefab};
pub use game::{Game, GameSettings, SAVE_VERSION};
pub use level::{LevelLoader, SimLevelLoader, FIRST_LEVEL};
pub use scenario::{Scenario, ScenarioLoader};
pub use shape::Shape;
