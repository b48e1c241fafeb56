use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use shapesim::{
    game::{Game, SAVE_VERSION},
    codec::PersistentStorage,
    level::SimLevelLoader,
    scenario::ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "shapesim runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/default.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Seconds of simulated time per tick
    #[arg(long)]
    dt: Option<f32>,

    /// Override the scenario's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Load this save file before running
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write a save file here after running
    #[arg(long)]
    save: Option<PathBuf>,

    /// Format version to save under
    #[arg(long, default_value_t = SAVE_VERSION)]
    save_version: i32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;

    let mut game = Game::new(
        scenario.build_factory(),
        SimLevelLoader::new(),
        &scenario.game_settings(cli.seed),
    );
    game.start().await;

    if let Some(path) = &cli.load {
        match game.load_game(&PersistentStorage::new(path)).await {
            Ok(()) => log::info!("loaded {} shapes from {}", game.shape_count(), path.display()),
            Err(err) => log::error!("load failed, keeping current state: {err}"),
        }
    }

    let ticks = scenario.ticks(cli.ticks);
    let dt = cli.dt.unwrap_or(scenario.dt);
    for _ in 0..ticks {
        game.update(dt);
    }

    if let Some(path) = &cli.save {
        game.save_game(&PersistentStorage::new(path), cli.save_version)?;
        log::info!("saved {} shapes to {}", game.shape_count(), path.display());
    }

    let stats = game.factory().stats();
    println!(
        "Scenario '{}' completed for {} ticks on level {}. Live shapes: {} (instantiated {}, reused {}, reclaimed {}, destroyed {})",
        scenario.name,
        ticks,
        game.loaded_level(),
        game.shape_count(),
        stats.instantiated,
        stats.reused,
        stats.reclaimed,
        stats.destroyed,
    );
    Ok(())
}
