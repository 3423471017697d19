//! Simulation Tick
//!
//! One fixed step of the level: steering, force solve, integration,
//! collision and boundary checks, then the state machine. Identical
//! configuration and commands give bit-identical trajectories.

use std::slice;

use crate::game::config::{ConfigError, LevelConfig};
use crate::game::events::GameEvent;
use crate::game::input::{InputRecording, RotationCommand};
use crate::game::state::{GamePhase, SimulationState, TickOutcome};
use crate::physics::collision::first_collision;
use crate::physics::integrator::{apply_steering, step};
use crate::physics::solver::{solve, ForceTorque};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in priority order
    pub events: Vec<GameEvent>,
    /// Phase after the tick
    pub phase: GamePhase,
    /// Load applied to the player
    pub load: ForceTorque,
    /// Whether the level is over
    pub ended: bool,
}

/// Run one simulation tick.
///
/// Order within a tick:
/// 1. steering command (turns the body, suppresses torque)
/// 2. force and torque from every obstacle
/// 3. integration and wall reflection
/// 4. collision test against the obstacles
/// 5. state machine
///
/// A level that has already ended is left untouched.
pub fn tick(state: &mut SimulationState, command: RotationCommand) -> TickResult {
    let mut result = TickResult {
        phase: state.phase(),
        ..TickResult::default()
    };

    if state.is_ended() {
        result.ended = true;
        return result;
    }

    // 0. Advance tick counter
    state.tick += 1;

    // 1. Direct rotation
    let steering = command.steering_angle(state.key_rotation);
    if let Some(delta) = steering {
        apply_steering(&mut state.player, delta);
    }

    // 2. Magnetic load, torque taken about the body center
    let load = solve(
        &state.config.obstacles,
        &state.player.magnet,
        state.player.position(),
        &state.config.tunables.solver,
    );

    // 3. Integrate
    let bounce = step(
        &mut state.player,
        &load,
        steering.is_some(),
        &state.params,
        &state.config.world,
    );
    state.last_load = load;

    // 4. Collisions
    let collision = first_collision(slice::from_ref(&state.player.magnet), &state.config.obstacles)
        .map(|pair| pair.obstacle);

    // 5. State machine
    let outcome = TickOutcome {
        collision,
        bounced: bounce.is_some(),
        target_distance: state.target_distance(),
        reached_target: state.config.target.reached_by(state.player.position()),
    };
    let phase = state.machine.advance(&outcome);

    if let Some(axis) = bounce {
        tracing::debug!(tick = state.tick, ?axis, bounces = state.bounces(), "wall bounce");
        let event = GameEvent::wall_bounce(state.tick, axis, state.bounces(), state.player.position());
        state.push_event(event);
    }

    match phase {
        GamePhase::Running => {}
        GamePhase::Crashed { obstacle } => {
            tracing::debug!(tick = state.tick, obstacle, "crashed");
            state.push_event(GameEvent::crashed(state.tick, obstacle));
        }
        GamePhase::Terminated { bounces } => {
            tracing::debug!(tick = state.tick, bounces, "bounce limit exceeded");
            let event = GameEvent::bounce_limit_exceeded(state.tick, bounces, state.machine.max_bounces);
            state.push_event(event);
        }
        GamePhase::Won => {
            tracing::debug!(tick = state.tick, distance = outcome.target_distance, "target reached");
            state.push_event(GameEvent::target_reached(state.tick, outcome.target_distance));
        }
    }

    result.events = state.take_events();
    result.events.sort();
    result.phase = phase;
    result.load = load;
    result.ended = !phase.is_running();
    result
}

/// Summary of a multi-tick run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Ticks actually simulated
    pub ticks: u32,
    /// Phase at the end
    pub phase: GamePhase,
    /// All events in order
    pub events: Vec<GameEvent>,
    /// Whether the input source asked to stop
    pub quit: bool,
}

/// Tick until the level ends, `max_ticks` have run, or `input` returns
/// `None`. The input callback receives the tick counter before each step.
pub fn run_until<F>(state: &mut SimulationState, max_ticks: u32, mut input: F) -> RunSummary
where
    F: FnMut(u32) -> Option<RotationCommand>,
{
    let mut summary = RunSummary {
        phase: state.phase(),
        ..RunSummary::default()
    };

    while !state.is_ended() && summary.ticks < max_ticks {
        let Some(command) = input(state.tick) else {
            summary.quit = true;
            break;
        };

        let result = tick(state, command);
        summary.ticks += 1;
        summary.phase = result.phase;
        summary.events.extend(result.events);
    }

    summary
}

/// Replay a level from recorded commands.
///
/// Ticks past the end of the recording get no steering.
pub fn replay_level(
    config: LevelConfig,
    recording: &InputRecording,
    tick_count: u32,
) -> Result<(SimulationState, Vec<GameEvent>), ConfigError> {
    let mut state = SimulationState::new(config)?;
    let mut all_events = Vec::new();

    for t in 0..tick_count {
        let command = if t > recording.end_tick {
            RotationCommand::None
        } else {
            recording.command_at(t)
        };

        let result = tick(&mut state, command);
        all_events.extend(result.events);

        if result.ended {
            break;
        }
    }

    Ok((state, all_events))
}
