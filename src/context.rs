//! Spawn context: the external environment subdivision where pooled
//! (deactivated) shapes physically live.
//!
//! The factory's free lists only hold handles; the shapes themselves are
//! owned by the context. A host reload can throw the free lists away while
//! the context survives, and the factory re-discovers its members from the
//! context alone.

use crate::shape::Shape;

/// Opaque handle to a deactivated shape held by a spawn context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeHandle(usize);

/// Collaborator interface over the host environment. Implementations own
/// every deactivated instance; a shape is either live (owned by the
/// session) or deposited here, never both.
pub trait SpawnContext {
    /// Whether the context already exists in the host, e.g. it survived a
    /// reload with pooled instances still inside.
    fn is_loaded(&self) -> bool;

    /// Create a fresh, empty context for future pooled instances.
    fn create(&mut self);

    /// Store a deactivated shape, returning its handle.
    fn deposit(&mut self, shape: Shape) -> ShapeHandle;

    /// Remove and return the shape behind a handle. Panics on a stale
    /// handle; handles are only ever minted by `deposit` and spent once.
    fn withdraw(&mut self, handle: ShapeHandle) -> Shape;

    /// Every inactive instance currently in the context, as
    /// `(shape_id, handle)` pairs. Used to rebuild free lists after a
    /// reload.
    fn enumerate_inactive(&self) -> Vec<(u32, ShapeHandle)>;
}

/// In-process spawn context backed by a slot arena.
#[derive(Debug, Default)]
pub struct MemoryScene {
    slots: Vec<Option<Shape>>,
    loaded: bool,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inactive_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl SpawnContext for MemoryScene {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn create(&mut self) {
        self.loaded = true;
    }

    fn deposit(&mut self, shape: Shape) -> ShapeHandle {
        self.loaded = true;
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(shape);
            ShapeHandle(index)
        } else {
            self.slots.push(Some(shape));
            ShapeHandle(self.slots.len() - 1)
        }
    }

    fn withdraw(&mut self, handle: ShapeHandle) -> Shape {
        self.slots[handle.0]
            .take()
            .unwrap_or_else(|| panic!("stale shape handle {:?}", handle))
    }

    fn enumerate_inactive(&self) -> Vec<(u32, ShapeHandle)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.as_ref()
                    .map(|shape| (shape.shape_id(), ShapeHandle(index)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_then_withdraw_returns_the_same_shape() {
        let mut scene = MemoryScene::new();
        let handle = scene.deposit(Shape::new(3));
        assert_eq!(scene.inactive_count(), 1);
        let shape = scene.withdraw(handle);
        assert_eq!(shape.shape_id(), 3);
        assert_eq!(scene.inactive_count(), 0);
    }

    #[test]
    fn slots_are_reused_after_withdrawal() {
        let mut scene = MemoryScene::new();
        let first = scene.deposit(Shape::new(0));
        scene.deposit(Shape::new(1));
        scene.withdraw(first);
        let reused = scene.deposit(Shape::new(2));
        assert_eq!(reused, first);
    }

    #[test]
    fn enumeration_reports_stored_shape_ids() {
        let mut scene = MemoryScene::new();
        scene.deposit(Shape::new(1));
        scene.deposit(Shape::new(0));
        scene.deposit(Shape::new(1));
        let mut ids: Vec<u32> = scene
            .enumerate_inactive()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 1]);
    }

    #[test]
    #[should_panic(expected = "stale shape handle")]
    fn double_withdraw_panics() {
        let mut scene = MemoryScene::new();
        let handle = scene.deposit(Shape::new(0));
        scene.withdraw(handle);
        scene.withdraw(handle);
    }
}
