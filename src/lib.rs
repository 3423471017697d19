//! # Magnetic Engine
//!
//! Deterministic physics core for a magnetic arcade game: a magnetized
//! player block is pushed and turned by static magnets and has to reach a
//! target without touching them or bouncing off the walls too often.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     MAGNETIC ENGINE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── rng.rs       - Xorshift128+ PRNG for level layouts      │
//! │  └── hash.rs      - State hashing for replay checks          │
//! │                                                              │
//! │  physics/         - Magnetostatics and motion                │
//! │  ├── magnet.rs    - Magnetized box                           │
//! │  ├── field.rs     - Closed-form box field                    │
//! │  ├── solver.rs    - Force/torque on a sampled body           │
//! │  ├── collision.rs - Oriented rectangle SAT                   │
//! │  └── integrator.rs- Velocity, friction, wall bounces         │
//! │                                                              │
//! │  game/            - Level loop                               │
//! │  ├── config.rs    - Level configuration and validation       │
//! │  ├── level.rs     - Built-in levels                          │
//! │  ├── input.rs     - Rotation commands, recording             │
//! │  ├── state.rs     - State machine, simulation state          │
//! │  ├── tick.rs      - Simulation loop and replay               │
//! │  └── events.rs    - Game events                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-tick data flow
//!
//! input -> steering -> solver(obstacles, player) -> integrator ->
//! collision + walls -> state machine -> renderer (external)
//!
//! ## Determinism
//!
//! The core performs no I/O and uses no clocks or hash maps. Physics runs
//! in `f64` with a fixed operation order, and all randomness comes from a
//! seeded Xorshift128+, so identical configuration and input give
//! bit-identical trajectories on the same platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod physics;
pub mod game;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use physics::magnet::MagnetBox;
pub use physics::solver::{solve, ForceTorque};
pub use game::config::{ConfigError, LevelConfig};
pub use game::input::{InputRecording, RotationCommand};
pub use game::state::{GamePhase, SimulationState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Intended tick rate of the outer game loop (Hz)
pub const TICK_RATE: u32 = 120;
