//! Magnetic Engine headless runner
//!
//! Loads a level, drives it with a scripted steering pattern, logs the
//! events, and replays the recorded inputs to check determinism.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use magnetic_engine::{
    TICK_RATE, VERSION,
    game::{
        config::LevelConfig,
        events::GameEventData,
        input::{InputRecording, RotationCommand},
        level::{preset, LEVEL_COUNT},
        state::SimulationState,
        tick::{replay_level, run_until},
    },
    physics::field::{sample_field_grid, FIELD_GRID_RESOLUTION},
};

/// Run a magnetic engine level without a renderer.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Built-in level to play
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=LEVEL_COUNT as i64))]
    level: u32,

    /// JSON level file (overrides --level)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for randomized level layouts
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Maximum ticks to simulate
    #[arg(short, long, default_value_t = 60 * TICK_RATE)]
    ticks: u32,

    /// Write the background field grid as JSON to this path
    #[arg(long)]
    dump_field: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Magnetic Engine v{}", VERSION);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => preset(cli.level, cli.seed)
            .with_context(|| format!("failed to build level {}", cli.level))?,
    };
    info!(
        "Level {} (seed {}): {} obstacles, world {}x{}",
        config.level,
        config.seed,
        config.obstacles.len(),
        config.world.width,
        config.world.height
    );

    if let Some(path) = &cli.dump_field {
        dump_field(&config, path)?;
    }

    run_level(config, cli.ticks)
}

/// Read and validate a JSON level file.
fn load_config(path: &Path) -> Result<LevelConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    LevelConfig::from_json_str(&json)
        .with_context(|| format!("invalid level file {}", path.display()))
}

/// Write the field grid an external compositor would draw.
fn dump_field(config: &LevelConfig, path: &Path) -> Result<()> {
    let grid = sample_field_grid(
        &config.obstacles,
        config.world.width,
        config.world.height,
        FIELD_GRID_RESOLUTION,
        FIELD_GRID_RESOLUTION,
    );
    if let Some((lo, hi)) = grid.amplitude_range() {
        info!("Field amplitude range: {:.3e} .. {:.3e}", lo, hi);
    }

    let json = serde_json::to_string(&grid).context("failed to encode field grid")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Field grid written to {}", path.display());
    Ok(())
}

/// Steering pattern: drift, turn left, drift, turn right.
fn scripted_command(tick: u32) -> RotationCommand {
    let phase = (tick / 30) % 8;
    RotationCommand::from_keys(phase == 2, phase == 6)
}

fn run_level(config: LevelConfig, max_ticks: u32) -> Result<()> {
    let mut state = SimulationState::new(config.clone())?;
    let mut recording = InputRecording::new(config.level, config.seed);

    info!("Running up to {} ticks...", max_ticks);

    let summary = run_until(&mut state, max_ticks, |t| {
        let command = scripted_command(t);
        recording.record(t, command);
        Some(command)
    });
    if summary.ticks > 0 {
        recording.finalize(summary.ticks - 1);
    }

    for event in &summary.events {
        match &event.data {
            GameEventData::WallBounce { axis, bounces, position } => {
                info!("Tick {}: bounce #{} on {:?} wall at ({:.1}, {:.1})",
                      event.tick, bounces, axis, position.x, position.y);
            }
            GameEventData::Crashed { obstacle } => {
                info!("Tick {}: crashed into obstacle {}", event.tick, obstacle);
            }
            GameEventData::BounceLimitExceeded { bounces, max_bounces } => {
                info!("Tick {}: {} bounces, limit is {}", event.tick, bounces, max_bounces);
            }
            GameEventData::TargetReached { distance } => {
                info!("Tick {}: target reached ({:.1} from center)", event.tick, distance);
            }
        }
    }

    // Print final results
    info!("=== Level Results ===");
    info!("Phase: {:?} after {} ticks", summary.phase, summary.ticks);
    let p = state.player.position();
    info!("Player at ({:.2}, {:.2}), angle {:.2} deg", p.x, p.y, state.player.magnet.angle.to_degrees());
    info!("Inputs: {} changes over {} ticks", recording.delta_count(), recording.tick_count());

    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Input Hash: {}", hex::encode(recording.compute_hash()));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay_level(config, &recording, summary.ticks)?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }

    Ok(())
}
