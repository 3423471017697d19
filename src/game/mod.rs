//! Game Logic Module
//!
//! Level setup and the per-tick game loop. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `config`: Level configuration, tuning constants, validation
//! - `level`: Built-in level presets
//! - `input`: Rotation commands, recording and replay
//! - `state`: State machine and simulation state
//! - `tick`: Simulation loop
//! - `events`: Game events for replay/verification

pub mod config;
pub mod level;
pub mod input;
pub mod state;
pub mod tick;
pub mod events;

// Re-export key types
pub use config::{ConfigError, LevelConfig, Target, Tunables};
pub use input::{InputRecording, RotationCommand};
pub use state::{GamePhase, GameStateMachine, SimulationState};
pub use tick::{replay_level, run_until, tick, RunSummary, TickResult};
pub use events::{GameEvent, GameEventData};
