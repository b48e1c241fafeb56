//! Level loading collaborator.
//!
//! The session controller never touches scene mechanics directly; it asks a
//! [`LevelLoader`] to unload the old level, load the new one and mark it
//! active, awaiting each step. Loading is the only operation that suspends
//! the per-tick update loop.

/// Levels are numbered from 1; 0 means "no level loaded yet".
pub const FIRST_LEVEL: i32 = 1;

pub trait LevelLoader {
    fn load(&mut self, level: i32) -> impl std::future::Future<Output = ()>;
    fn unload(&mut self, level: i32) -> impl std::future::Future<Output = ()>;
    fn set_active(&mut self, level: i32);
}

/// In-process loader that records what a real host would do. Yields to the
/// runtime at each step so transitions exercise the same suspension points
/// as an actual asynchronous host.
#[derive(Debug, Default)]
pub struct SimLevelLoader {
    loaded: Vec<i32>,
    active: Option<i32>,
}

impl SimLevelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded_levels(&self) -> &[i32] {
        &self.loaded
    }

    pub fn active_level(&self) -> Option<i32> {
        self.active
    }
}

impl LevelLoader for SimLevelLoader {
    async fn load(&mut self, level: i32) {
        tokio::task::yield_now().await;
        if !self.loaded.contains(&level) {
            self.loaded.push(level);
        }
        log::info!("level {level} loaded");
    }

    async fn unload(&mut self, level: i32) {
        tokio::task::yield_now().await;
        self.loaded.retain(|&loaded| loaded != level);
        if self.active == Some(level) {
            self.active = None;
        }
        log::info!("level {level} unloaded");
    }

    fn set_active(&mut self, level: i32) {
        debug_assert!(self.loaded.contains(&level));
        self.active = Some(level);
    }
}
