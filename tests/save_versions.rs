//! Round-trip coverage for every supported stream format revision, plus
//! rejection of streams newer than this build.

use shapesim::{
    codec::{PersistError, PersistentStorage},
    context::MemoryScene,
    factory::{MaterialDef, ShapeFactory, ShapePrefab},
    game::{Game, GameSettings, SAVE_VERSION},
    level::{SimLevelLoader, FIRST_LEVEL},
    shape::Shape,
};
use tempfile::tempdir;

fn factory() -> ShapeFactory {
    let prefabs = ["cube", "sphere", "capsule"]
        .into_iter()
        .map(|name| ShapePrefab { name: name.into() })
        .collect();
    let materials = ["matte", "shiny", "glow"]
        .into_iter()
        .map(|name| MaterialDef { name: name.into() })
        .collect();
    ShapeFactory::new(prefabs, materials, true, Box::new(MemoryScene::new()))
}

fn settings(seed: u64) -> GameSettings {
    GameSettings {
        seed,
        level_count: 3,
        creation_speed: 0.0,
        destruction_speed: 0.0,
    }
}

async fn populated_game(seed: u64, shapes: usize) -> Game<SimLevelLoader> {
    let mut game = Game::new(factory(), SimLevelLoader::new(), &settings(seed));
    game.start().await;
    for _ in 0..shapes {
        game.create_shape();
    }
    game
}

#[tokio::test]
async fn version_2_round_trip_is_bit_exact() {
    let dir = tempdir().unwrap();
    let storage = PersistentStorage::new(dir.path().join("save.bin"));

    let mut game = populated_game(21, 0).await;
    game.switch_level(2).await;
    for _ in 0..8 {
        game.create_shape();
    }
    let before: Vec<Shape> = game.shapes().to_vec();

    game.save_game(&storage, 2).unwrap();
    game.begin_new_game();
    assert_eq!(game.shape_count(), 0);

    game.load_game(&storage).await.unwrap();
    assert_eq!(game.shapes(), &before[..]);
    assert_eq!(game.loaded_level(), 2);
}

#[tokio::test]
async fn version_1_round_trip_keeps_ids_but_resets_level() {
    let dir = tempdir().unwrap();
    let storage = PersistentStorage::new(dir.path().join("save.bin"));

    let mut game = populated_game(22, 0).await;
    game.switch_level(3).await;
    for _ in 0..4 {
        game.create_shape();
    }
    let before: Vec<Shape> = game.shapes().to_vec();

    game.save_game(&storage, 1).unwrap();
    game.load_game(&storage).await.unwrap();

    assert_eq!(game.shapes(), &before[..]);
    assert_eq!(
        game.loaded_level(),
        FIRST_LEVEL,
        "version 1 streams carry no level id"
    );
}

#[tokio::test]
async fn version_0_round_trip_defaults_every_id() {
    let dir = tempdir().unwrap();
    let storage = PersistentStorage::new(dir.path().join("save.bin"));

    let mut game = populated_game(23, 6).await;
    let before: Vec<Shape> = game.shapes().to_vec();

    game.save_game(&storage, 0).unwrap();
    game.load_game(&storage).await.unwrap();

    assert_eq!(game.shape_count(), 6);
    for (loaded, original) in game.shapes().iter().zip(&before) {
        assert_eq!(loaded.shape_id(), 0);
        assert_eq!(loaded.material_id(), 0);
        assert_eq!(loaded.transform, original.transform);
        assert_eq!(loaded.color, original.color);
    }
}

#[tokio::test]
async fn future_version_leaves_state_untouched() {
    let dir = tempdir().unwrap();
    let storage = PersistentStorage::new(dir.path().join("save.bin"));
    storage
        .save_with(SAVE_VERSION + 1, |writer| {
            writer.write_i32(99);
            writer.write_i32(1);
        })
        .unwrap();

    let mut game = populated_game(24, 3).await;
    let before: Vec<Shape> = game.shapes().to_vec();
    let stats_before = game.factory().stats();

    let err = game.load_game(&storage).await.unwrap_err();
    assert!(matches!(
        err,
        PersistError::UnsupportedVersion { found, supported }
            if found == SAVE_VERSION + 1 && supported == SAVE_VERSION
    ));
    assert_eq!(game.shapes(), &before[..]);
    assert_eq!(game.factory().stats(), stats_before);
    assert_eq!(game.factory().pooled_count(), 0);
}

#[tokio::test]
async fn truncated_stream_reports_an_error() {
    let dir = tempdir().unwrap();
    let storage = PersistentStorage::new(dir.path().join("save.bin"));
    // Claims ten shapes, carries none.
    storage
        .save_with(2, |writer| {
            writer.write_i32(10);
            writer.write_i32(1);
        })
        .unwrap();

    let mut game = populated_game(25, 0).await;
    assert!(matches!(
        game.load_game(&storage).await,
        Err(PersistError::Truncated(_))
    ));
}

#[tokio::test]
async fn missing_save_file_surfaces_io_error() {
    let dir = tempdir().unwrap();
    let storage = PersistentStorage::new(dir.path().join("absent.bin"));
    let mut game = populated_game(26, 1).await;
    assert!(matches!(
        game.load_game(&storage).await,
        Err(PersistError::Io(_))
    ));
    assert_eq!(game.shape_count(), 1);
}
