//! Scenario configuration: which prefabs and materials exist, how fast the
//! population churns, and the simulation defaults for the runner.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::context::MemoryScene;
use crate::factory::{MaterialDef, ShapeFactory, ShapePrefab};
use crate::game::GameSettings;

fn default_seed() -> u64 {
    7
}

fn default_level_count() -> i32 {
    3
}

fn default_recycle() -> bool {
    true
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_level_count")]
    pub level_count: i32,
    #[serde(default = "default_recycle")]
    pub recycle: bool,
    #[serde(default)]
    pub creation_speed: f32,
    #[serde(default)]
    pub destruction_speed: f32,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_dt")]
    pub dt: f32,
    pub prefabs: Vec<String>,
    pub materials: Vec<String>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        anyhow::ensure!(
            !scenario.prefabs.is_empty(),
            "scenario '{}' registers no prefabs",
            scenario.name
        );
        anyhow::ensure!(
            !scenario.materials.is_empty(),
            "scenario '{}' registers no materials",
            scenario.name
        );
        Ok(scenario)
    }
}

impl Scenario {
    pub fn build_factory(&self) -> ShapeFactory {
        let prefabs = self
            .prefabs
            .iter()
            .map(|name| ShapePrefab { name: name.clone() })
            .collect();
        let materials = self
            .materials
            .iter()
            .map(|name| MaterialDef { name: name.clone() })
            .collect();
        ShapeFactory::new(prefabs, materials, self.recycle, Box::new(MemoryScene::new()))
    }

    pub fn game_settings(&self, seed_override: Option<u64>) -> GameSettings {
        GameSettings {
            seed: seed_override.unwrap_or(self.seed),
            level_count: self.level_count,
            creation_speed: self.creation_speed,
            destruction_speed: self.destruction_speed,
        }
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_parses_with_sparse_input() {
        let scenario: Scenario = serde_yaml::from_str(
            "name: minimal\nprefabs: [cube]\nmaterials: [matte]\n",
        )
        .unwrap();
        assert_eq!(scenario.seed, 7);
        assert_eq!(scenario.level_count, 3);
        assert!(scenario.recycle);
        assert_eq!(scenario.creation_speed, 0.0);
        assert_eq!(scenario.ticks(None), 600);
    }

    #[test]
    fn factory_mirrors_the_registries() {
        let scenario: Scenario = serde_yaml::from_str(
            "name: reg\nprefabs: [cube, sphere]\nmaterials: [matte, shiny, glow]\n",
        )
        .unwrap();
        let factory = scenario.build_factory();
        assert_eq!(factory.prefab_count(), 2);
        assert_eq!(factory.material_count(), 3);
    }
}
