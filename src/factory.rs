//! Shape factory: typed instantiation with optional pooling.
//!
//! With recycling on, reclaimed shapes are deactivated into the spawn
//! context and indexed by per-type free lists. The lists are built lazily;
//! when the context already holds instances from before a host reload, the
//! lists are rebuilt from the context instead of instantiating anew.

use rand::Rng;

use crate::context::{ShapeHandle, SpawnContext};
use crate::shape::Shape;

/// A registered shape template. Instantiation produces a [`Shape`] tagged
/// with this prefab's index.
#[derive(Debug, Clone)]
pub struct ShapePrefab {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct MaterialDef {
    pub name: String,
}

/// Running counters, mostly for the end-of-run summary and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryStats {
    pub instantiated: u64,
    pub reused: u64,
    pub reclaimed: u64,
    pub destroyed: u64,
}

pub struct ShapeFactory {
    prefabs: Vec<ShapePrefab>,
    materials: Vec<MaterialDef>,
    recycle: bool,
    pools: Option<Vec<Vec<ShapeHandle>>>,
    context: Box<dyn SpawnContext>,
    stats: FactoryStats,
}

impl ShapeFactory {
    pub fn new(
        prefabs: Vec<ShapePrefab>,
        materials: Vec<MaterialDef>,
        recycle: bool,
        context: Box<dyn SpawnContext>,
    ) -> Self {
        assert!(!prefabs.is_empty(), "factory requires at least one prefab");
        assert!(
            !materials.is_empty(),
            "factory requires at least one material"
        );
        Self {
            prefabs,
            materials,
            recycle,
            pools: None,
            context,
            stats: FactoryStats::default(),
        }
    }

    pub fn prefab_count(&self) -> usize {
        self.prefabs.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn stats(&self) -> FactoryStats {
        self.stats
    }

    /// Shapes currently waiting in free lists.
    pub fn pooled_count(&self) -> usize {
        self.pools
            .as_ref()
            .map_or(0, |pools| pools.iter().map(Vec::len).sum())
    }

    /// Check out an activated shape of the requested type with the
    /// requested material applied. Out-of-range ids are authoring errors
    /// and fail fast.
    pub fn get(&mut self, shape_id: u32, material_id: u32) -> Shape {
        assert!(
            (shape_id as usize) < self.prefabs.len(),
            "shape id {} out of range ({} prefabs registered)",
            shape_id,
            self.prefabs.len()
        );
        assert!(
            (material_id as usize) < self.materials.len(),
            "material id {} out of range ({} materials registered)",
            material_id,
            self.materials.len()
        );

        let mut instance = if self.recycle {
            self.ensure_pools();
            let pools = self.pools.as_mut().expect("pools initialized above");
            match pools[shape_id as usize].pop() {
                Some(handle) => {
                    self.stats.reused += 1;
                    self.context.withdraw(handle)
                }
                None => {
                    self.stats.instantiated += 1;
                    Shape::new(shape_id)
                }
            }
        } else {
            self.stats.instantiated += 1;
            Shape::new(shape_id)
        };

        instance.set_material(material_id);
        instance
    }

    /// Check out a shape with uniformly drawn type and material.
    pub fn get_random(&mut self, rng: &mut impl Rng) -> Shape {
        let shape_id = rng.gen_range(0..self.prefabs.len()) as u32;
        let material_id = rng.gen_range(0..self.materials.len()) as u32;
        self.get(shape_id, material_id)
    }

    /// Return a shape the caller is done with. With recycling on it is
    /// deactivated into the spawn context and queued for reuse; otherwise
    /// it is destroyed. Taking the shape by value makes double-reclaim
    /// unrepresentable.
    pub fn reclaim(&mut self, shape: Shape) {
        if self.recycle {
            self.ensure_pools();
            let shape_id = shape.shape_id() as usize;
            let handle = self.context.deposit(shape);
            let pools = self.pools.as_mut().expect("pools initialized above");
            pools[shape_id].push(handle);
            self.stats.reclaimed += 1;
        } else {
            self.stats.destroyed += 1;
        }
    }

    /// Release the spawn context, dropping the in-memory free lists. The
    /// deactivated instances survive inside the context; a factory built
    /// over it later rebuilds its lists from there. This is the reload
    /// boundary of a development-style host.
    pub fn into_context(self) -> Box<dyn SpawnContext> {
        self.context
    }

    fn ensure_pools(&mut self) {
        if self.pools.is_some() {
            return;
        }
        let mut pools: Vec<Vec<ShapeHandle>> = vec![Vec::new(); self.prefabs.len()];

        if self.context.is_loaded() {
            // Host reload: the context kept its instances while our lists
            // were reset. Re-index every inactive instance under its own
            // stored shape id; an unknown id means the registry and the
            // preserved data disagree, which is not recoverable.
            let preserved = self.context.enumerate_inactive();
            for (shape_id, handle) in &preserved {
                let index = *shape_id as usize;
                assert!(
                    index < pools.len(),
                    "preserved pooled instance has unknown shape id {} ({} prefabs registered)",
                    shape_id,
                    pools.len()
                );
                pools[index].push(*handle);
            }
            log::debug!("recovered {} pooled shapes from spawn context", preserved.len());
        } else {
            self.context.create();
        }

        self.pools = Some(pools);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MemoryScene;

    fn test_factory(recycle: bool) -> ShapeFactory {
        let prefabs = ["cube", "sphere", "capsule"]
            .into_iter()
            .map(|name| ShapePrefab { name: name.into() })
            .collect();
        let materials = ["matte", "shiny"]
            .into_iter()
            .map(|name| MaterialDef { name: name.into() })
            .collect();
        ShapeFactory::new(prefabs, materials, recycle, Box::new(MemoryScene::new()))
    }

    #[test]
    fn get_tags_instances_and_applies_material() {
        let mut factory = test_factory(true);
        let shape = factory.get(2, 1);
        assert_eq!(shape.shape_id(), 2);
        assert_eq!(shape.material_id(), 1);
    }

    #[test]
    fn reclaimed_shape_is_reused_before_instantiating() {
        let mut factory = test_factory(true);
        let mut shape = factory.get(1, 0);
        shape.transform.position.x = 9.0;
        factory.reclaim(shape);

        let reused = factory.get(1, 1);
        assert_eq!(reused.transform.position.x, 9.0);
        assert_eq!(reused.material_id(), 1, "material reapplied on reuse");
        assert_eq!(factory.stats().reused, 1);
        assert_eq!(factory.stats().instantiated, 1);
    }

    #[test]
    fn reuse_is_last_reclaimed_first_out() {
        let mut factory = test_factory(true);
        let mut first = factory.get(0, 0);
        first.transform.position.x = 1.0;
        let mut second = factory.get(0, 0);
        second.transform.position.x = 2.0;
        factory.reclaim(first);
        factory.reclaim(second);

        assert_eq!(factory.get(0, 0).transform.position.x, 2.0);
        assert_eq!(factory.get(0, 0).transform.position.x, 1.0);
    }

    #[test]
    fn recycling_disabled_always_instantiates_fresh() {
        let mut factory = test_factory(false);
        let mut shape = factory.get(0, 0);
        shape.transform.position.x = 5.0;
        factory.reclaim(shape);

        let fresh = factory.get(0, 0);
        assert_eq!(fresh.transform.position.x, 0.0);
        assert_eq!(factory.stats().destroyed, 1);
        assert_eq!(factory.stats().instantiated, 2);
    }

    #[test]
    #[should_panic(expected = "shape id 9 out of range")]
    fn out_of_range_shape_id_fails_fast() {
        test_factory(true).get(9, 0);
    }

    #[test]
    #[should_panic(expected = "material id 7 out of range")]
    fn out_of_range_material_id_fails_fast() {
        test_factory(true).get(0, 7);
    }
}
