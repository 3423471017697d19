//! Game Events
//!
//! Events generated during simulation for replay and verification.

use glam::DVec3;
use serde::{Serialize, Deserialize};

use crate::physics::integrator::BounceAxis;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Collisions first
    Crash = 0,
    /// Then running out of bounces
    BounceLimit = 1,
    /// Then reaching the goal
    TargetReached = 2,
    /// Then ordinary wall bounces
    WallBounce = 3,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player was reflected by a wall
    WallBounce {
        /// Which wall pair
        axis: BounceAxis,
        /// Bounce count after this bounce
        bounces: u32,
        /// Player position after the move
        position: DVec3,
    },

    /// Player touched an obstacle
    Crashed {
        /// Index of the obstacle hit
        obstacle: usize,
    },

    /// Bounce count went past the limit
    BounceLimitExceeded {
        /// Bounce count
        bounces: u32,
        /// Configured limit
        max_bounces: u32,
    },

    /// Player reached the target
    TargetReached {
        /// Distance to the target center
        distance: f64,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        Self { tick, priority, data }
    }

    /// Create wall bounce event.
    pub fn wall_bounce(tick: u32, axis: BounceAxis, bounces: u32, position: DVec3) -> Self {
        Self::new(
            tick,
            EventPriority::WallBounce,
            GameEventData::WallBounce { axis, bounces, position },
        )
    }

    /// Create crash event.
    pub fn crashed(tick: u32, obstacle: usize) -> Self {
        Self::new(tick, EventPriority::Crash, GameEventData::Crashed { obstacle })
    }

    /// Create bounce limit event.
    pub fn bounce_limit_exceeded(tick: u32, bounces: u32, max_bounces: u32) -> Self {
        Self::new(
            tick,
            EventPriority::BounceLimit,
            GameEventData::BounceLimitExceeded { bounces, max_bounces },
        )
    }

    /// Create target reached event.
    pub fn target_reached(tick: u32, distance: f64) -> Self {
        Self::new(
            tick,
            EventPriority::TargetReached,
            GameEventData::TargetReached { distance },
        )
    }

    /// Whether this event ends the level.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.data, GameEventData::WallBounce { .. })
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.priority == other.priority
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let bounce = GameEvent::wall_bounce(10, BounceAxis::Y, 6, DVec3::ZERO);
        let limit = GameEvent::bounce_limit_exceeded(10, 6, 5);
        let earlier = GameEvent::wall_bounce(9, BounceAxis::X, 5, DVec3::ZERO);

        // Same tick, but the limit sorts before the bounce that caused it
        assert!(limit < bounce);
        assert!(earlier < limit);

        let mut events = vec![bounce.clone(), limit.clone(), earlier.clone()];
        events.sort();
        assert_eq!(events[0].data, earlier.data);
        assert_eq!(events[1].data, limit.data);
    }

    #[test]
    fn test_terminal_events() {
        assert!(GameEvent::crashed(1, 0).is_terminal());
        assert!(GameEvent::target_reached(1, 3.0).is_terminal());
        assert!(GameEvent::bounce_limit_exceeded(1, 6, 5).is_terminal());
        assert!(!GameEvent::wall_bounce(1, BounceAxis::X, 1, DVec3::ZERO).is_terminal());
    }
}
