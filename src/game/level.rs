//! Built-in Levels
//!
//! Level 1 is a single cube in the middle of the world. Level 2 scatters six
//! smaller magnets whose sizes and polarities come from the seeded RNG, so a
//! given seed always yields the same layout.

use glam::DVec3;

use crate::core::rng::DeterministicRng;
use crate::game::config::{ConfigError, LevelConfig, WORLD_HEIGHT, WORLD_WIDTH};
use crate::physics::magnet::MagnetBox;

/// Highest built-in level number.
pub const LEVEL_COUNT: u32 = 2;

/// Fixed obstacle centers for level 2.
const LEVEL_TWO_POSITIONS: [(f64, f64); 6] = [
    (150.0, 375.0),
    (450.0, 225.0),
    (750.0, 75.0),
    (375.0, 630.0),
    (630.0, 525.0),
    (900.0, 300.0),
];

/// Build a built-in level.
pub fn preset(level: u32, seed: u64) -> Result<LevelConfig, ConfigError> {
    let mut config = LevelConfig {
        level,
        seed,
        ..LevelConfig::default()
    };
    let m0 = config.tunables.magnetization;

    config.obstacles = match level {
        1 => level_one(m0),
        2 => level_two(m0, seed),
        other => return Err(ConfigError::UnknownLevel(other)),
    };

    config.validate()?;
    Ok(config)
}

fn level_one(m0: f64) -> Vec<MagnetBox> {
    let side = (WORLD_WIDTH / 15.0).floor();
    vec![MagnetBox::new(
        DVec3::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0, 0.0),
        DVec3::splat(side),
        DVec3::new(m0, 0.0, 0.0),
    )]
}

fn level_two(m0: f64, seed: u64) -> Vec<MagnetBox> {
    let mut rng = DeterministicRng::new(seed);

    let polarities: Vec<DVec3> = [
        DVec3::new(m0, 0.0, 0.0),
        DVec3::new(-m0, 0.0, 0.0),
        DVec3::new(0.0, m0, 0.0),
        DVec3::new(0.0, -m0, 0.0),
    ]
    .repeat(3);
    let picked = rng.sample(&polarities, LEVEL_TWO_POSITIONS.len());

    LEVEL_TWO_POSITIONS
        .iter()
        .zip(picked)
        .map(|(&(x, y), magnetization)| {
            let width = rng.next_f64_range(15.0, 45.0);
            let height = rng.next_f64_range(15.0, 45.0);
            MagnetBox::new(
                DVec3::new(x, y, 0.0),
                DVec3::new(width, height, 20.0),
                magnetization,
            )
        })
        .collect()
}
