//! Rigid Body Integration
//!
//! Advances the player body by one tick: force to velocity, friction,
//! position, torque-driven turning, then wall reflection.

use glam::DVec3;
use serde::{Serialize, Deserialize};

use super::magnet::MagnetBox;
use super::solver::ForceTorque;

/// The dynamic body: a magnet with a velocity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicBody {
    /// Shape, pose and magnetization
    pub magnet: MagnetBox,
    /// World units per tick (z held at zero)
    pub velocity: DVec3,
}

impl DynamicBody {
    /// Create a body with planar velocity.
    pub fn new(magnet: MagnetBox, mut velocity: DVec3) -> Self {
        velocity.z = 0.0;
        Self { magnet, velocity }
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> DVec3 {
        self.magnet.position
    }
}

/// Per-body integration constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegratorParams {
    /// Velocity gained per unit force per tick
    pub translational_factor: f64,
    /// Radians turned per unit torque per tick
    pub rotational_factor: f64,
    /// Velocity multiplier applied every tick, in (0, 1)
    pub friction: f64,
}

/// The world rectangle `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Extent along x
    pub width: f64,
    /// Extent along y
    pub height: f64,
}

/// Wall that reflected the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BounceAxis {
    /// Left or right wall
    X,
    /// Top or bottom wall
    Y,
}

/// Turn the body directly by a steering command.
#[inline]
pub fn apply_steering(body: &mut DynamicBody, delta: f64) {
    body.magnet.rotate_z(delta);
}

/// Advance `body` by one tick under `load`.
///
/// When `steering_active` is set the torque is ignored for this tick.
/// Returns the wall that reflected the body, if any. Only one axis can
/// bounce per tick; x is checked first.
pub fn step(
    body: &mut DynamicBody,
    load: &ForceTorque,
    steering_active: bool,
    params: &IntegratorParams,
    bounds: &WorldBounds,
) -> Option<BounceAxis> {
    let mut force = load.force;
    force.z = 0.0;

    body.velocity += force * params.translational_factor;
    body.velocity *= params.friction;
    body.magnet.position += body.velocity;

    if !steering_active {
        body.magnet.rotate_z(load.torque.z * params.rotational_factor);
    }

    reflect_at_walls(body, bounds)
}

/// Negate the velocity component that carried the body out of bounds.
fn reflect_at_walls(body: &mut DynamicBody, bounds: &WorldBounds) -> Option<BounceAxis> {
    let p = body.magnet.position;
    if p.x < 0.0 || p.x > bounds.width {
        body.velocity.x = -body.velocity.x;
        Some(BounceAxis::X)
    } else if p.y < 0.0 || p.y > bounds.height {
        body.velocity.y = -body.velocity.y;
        Some(BounceAxis::Y)
    } else {
        None
    }
}
