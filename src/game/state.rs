//! Game State Definitions
//!
//! The per-level state machine and the complete simulation state that the
//! tick function mutates.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::config::{ConfigError, LevelConfig};
use crate::game::events::GameEvent;
use crate::physics::integrator::{DynamicBody, IntegratorParams};
use crate::physics::solver::ForceTorque;

// =============================================================================
// GAME PHASE
// =============================================================================

/// Outcome of a level so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticks are being simulated
    #[default]
    Running,
    /// Player touched an obstacle
    Crashed {
        /// Obstacle index
        obstacle: usize,
    },
    /// Too many wall bounces
    Terminated {
        /// Bounce count at termination
        bounces: u32,
    },
    /// Player reached the target
    Won,
}

impl GamePhase {
    /// Whether ticks may still run.
    #[inline]
    pub fn is_running(self) -> bool {
        self == GamePhase::Running
    }

    /// Stable code for hashing.
    fn code(self) -> u8 {
        match self {
            GamePhase::Running => 0,
            GamePhase::Crashed { .. } => 1,
            GamePhase::Terminated { .. } => 2,
            GamePhase::Won => 3,
        }
    }
}

/// What the physics produced this tick, as seen by the state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    /// First obstacle overlapping the player
    pub collision: Option<usize>,
    /// Whether a wall reflected the player
    pub bounced: bool,
    /// Distance from the player to the target center
    pub target_distance: f64,
    /// Whether the player is inside the winning region
    pub reached_target: bool,
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Running/Crashed/Terminated/Won bookkeeping plus the bounce counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateMachine {
    /// Current phase
    pub phase: GamePhase,
    /// Wall bounces so far
    pub bounces: u32,
    /// Bounces tolerated
    pub max_bounces: u32,
}

impl GameStateMachine {
    /// Fresh machine in `Running`.
    pub fn new(max_bounces: u32) -> Self {
        Self {
            phase: GamePhase::Running,
            bounces: 0,
            max_bounces,
        }
    }

    /// Back to `Running` with no bounces.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Running;
        self.bounces = 0;
    }

    /// Fold one tick's outcome into the phase.
    ///
    /// Terminal phases absorb. A crash beats running out of bounces, which
    /// beats a win in the same tick.
    pub fn advance(&mut self, outcome: &TickOutcome) -> GamePhase {
        if !self.phase.is_running() {
            return self.phase;
        }

        if outcome.bounced {
            self.bounces += 1;
        }

        self.phase = if let Some(obstacle) = outcome.collision {
            GamePhase::Crashed { obstacle }
        } else if self.bounces > self.max_bounces {
            GamePhase::Terminated { bounces: self.bounces }
        } else if outcome.reached_target {
            GamePhase::Won
        } else {
            GamePhase::Running
        };

        self.phase
    }
}

// =============================================================================
// SIMULATION STATE
// =============================================================================

/// Complete state of one level attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationState {
    /// Level the state was built from (read-only during play)
    pub config: LevelConfig,

    /// Ticks simulated so far
    pub tick: u32,

    /// The player body
    pub player: DynamicBody,

    /// Integration constants derived from the config
    pub params: IntegratorParams,

    /// Steering increment in radians
    pub key_rotation: f64,

    /// Phase and bounce counter
    pub machine: GameStateMachine,

    /// Load applied on the last tick (for the renderer)
    pub last_load: ForceTorque,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl SimulationState {
    /// Validate `config` and set up the level.
    pub fn new(config: LevelConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let player = config.player_body();
        let params = config.integrator_params();
        let key_rotation = config.key_rotation();
        let machine = GameStateMachine::new(config.tunables.max_bounces);

        tracing::debug!(
            level = config.level,
            seed = config.seed,
            obstacles = config.obstacles.len(),
            "level ready"
        );

        Ok(Self {
            config,
            tick: 0,
            player,
            params,
            key_rotation,
            machine,
            last_load: ForceTorque::default(),
            pending_events: Vec::new(),
        })
    }

    /// Put the player back at the start and clear the bounce count.
    pub fn restart(&mut self) {
        self.tick = 0;
        self.player = self.config.player_body();
        self.machine.reset();
        self.last_load = ForceTorque::default();
        self.pending_events.clear();
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.machine.phase
    }

    /// Whether the level has finished.
    pub fn is_ended(&self) -> bool {
        !self.machine.phase.is_running()
    }

    /// Wall bounces so far.
    pub fn bounces(&self) -> u32 {
        self.machine.bounces
    }

    /// Distance from the player to the target center.
    pub fn target_distance(&self) -> f64 {
        self.player.position().distance(self.config.target.position)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.config.seed, |hasher| {
            hasher.update_u32(self.config.level);
            hasher.update_u32(self.machine.bounces);

            let phase = self.machine.phase;
            hasher.update_u8(phase.code());
            match phase {
                GamePhase::Crashed { obstacle } => hasher.update_u64(obstacle as u64),
                GamePhase::Terminated { bounces } => hasher.update_u32(bounces),
                GamePhase::Running | GamePhase::Won => {}
            }

            hasher.update_dvec3(self.player.magnet.position);
            hasher.update_f64(self.player.magnet.angle);
            hasher.update_dvec3(self.player.velocity);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
