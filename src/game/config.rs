//! Level Configuration
//!
//! Everything a level needs before the first tick: world size, obstacles,
//! target, player start and the tuning constants. Read once, validated once,
//! never mutated during play.

use glam::{DVec2, DVec3};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::physics::integrator::{DynamicBody, IntegratorParams, WorldBounds};
use crate::physics::magnet::MagnetBox;
use crate::physics::solver::SolverSettings;

/// Magnetization amplitude shared by every stock magnet.
pub const DEFAULT_MAGNETIZATION: f64 = 100.0;

/// Default world width (screen pixels).
pub const WORLD_WIDTH: f64 = 960.0;

/// Default world height.
pub const WORLD_HEIGHT: f64 = 720.0;

/// Level setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A box has a zero, negative or non-finite edge.
    #[error("{0} has a non-positive dimension")]
    InvalidDimension(String),

    /// Friction must damp without reversing.
    #[error("friction factor {0} must lie strictly between 0 and 1")]
    InvalidFriction(f64),

    /// Mass factors scale accelerations and must be positive.
    #[error("{name} must be positive, got {value}")]
    InvalidMassFactor {
        /// Which factor
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// The solver needs at least one sample.
    #[error("force grid {x}x{y} has no samples")]
    InvalidGrid {
        /// Samples along x
        x: usize,
        /// Samples along y
        y: usize,
    },

    /// Finite-difference step must be positive.
    #[error("gradient step {0} must be positive")]
    InvalidGradientStep(f64),

    /// World rectangle must have area.
    #[error("world {width}x{height} must have positive size")]
    InvalidWorld {
        /// Width
        width: f64,
        /// Height
        height: f64,
    },

    /// Target radius must be positive.
    #[error("target radius {0} must be positive")]
    InvalidTarget(f64),

    /// Player magnetization direction is zero or non-finite.
    #[error("player magnetization direction must be a non-zero vector")]
    InvalidMagnetization,

    /// A tuning value is NaN or infinite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    /// No built-in level with that number.
    #[error("unknown level {0}")]
    UnknownLevel(u32),

    /// JSON level file could not be parsed.
    #[error("invalid level file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Gameplay tuning constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Translational inverse mass before footprint scaling
    pub mass_factor_force: f64,
    /// Rotational inverse inertia before footprint scaling
    pub mass_factor_torque: f64,
    /// Velocity multiplier per tick
    pub friction: f64,
    /// Degrees turned per tick while a rotation key is held
    pub key_rotation_deg: f64,
    /// Degrees turned per unit of scaled torque
    pub torque_gain: f64,
    /// Wall bounces tolerated; one more ends the level
    pub max_bounces: u32,
    /// Magnetization amplitude (M0)
    pub magnetization: f64,
    /// Force solver settings
    pub solver: SolverSettings,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            mass_factor_force: 1000.0,
            mass_factor_torque: 1000.0,
            friction: 0.985,
            key_rotation_deg: 5.5,
            torque_gain: 2000.0,
            max_bounces: 5,
            magnetization: DEFAULT_MAGNETIZATION,
            solver: SolverSettings::default(),
        }
    }
}

/// Goal region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Center
    pub position: DVec3,
    /// Drawn radius; the body wins inside half of it
    pub radius: f64,
}

impl Target {
    /// Whether a body at `position` has reached the goal.
    #[inline]
    pub fn reached_by(&self, position: DVec3) -> bool {
        position.distance(self.position) < self.radius / 2.0
    }
}

impl Default for Target {
    fn default() -> Self {
        let radius = (WORLD_WIDTH * 0.05).floor();
        Self {
            position: DVec3::new(WORLD_WIDTH - radius, radius, 0.0),
            radius,
        }
    }
}

/// Player start state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start position
    pub position: DVec3,
    /// Half width and half height of the footprint
    pub half_size: DVec2,
    /// Full depth
    pub depth: f64,
    /// Start rotation in degrees
    pub angle_deg: f64,
    /// Start velocity (world units per tick)
    pub velocity: DVec3,
    /// Body-frame magnetization direction, scaled to M0
    pub magnetization_direction: DVec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let half_size = DVec2::new(20.0, 20.0);
        Self {
            position: DVec3::new(
                half_size.x + (0.1 * WORLD_WIDTH).floor(),
                (0.9 * WORLD_HEIGHT).floor() - half_size.y,
                0.0,
            ),
            half_size,
            depth: 20.0,
            angle_deg: 0.0,
            velocity: DVec3::new(1.0, -1.0, 0.0),
            magnetization_direction: DVec3::X,
        }
    }
}

/// Full description of one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Level number (informational)
    pub level: u32,
    /// Seed used for randomized layouts
    pub seed: u64,
    /// Playable rectangle
    pub world: WorldBounds,
    /// Static magnets, in collision-check order
    pub obstacles: Vec<MagnetBox>,
    /// Goal region
    pub target: Target,
    /// Player start state
    pub player: PlayerConfig,
    /// Tuning constants
    pub tunables: Tunables,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            level: 0,
            seed: 0,
            world: WorldBounds { width: WORLD_WIDTH, height: WORLD_HEIGHT },
            obstacles: Vec::new(),
            target: Target::default(),
            player: PlayerConfig::default(),
            tunables: Tunables::default(),
        }
    }
}

impl LevelConfig {
    /// Parse a (possibly partial) JSON level description.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject anything that would make the simulation ill-defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tunables;

        for (name, value) in [
            ("friction", t.friction),
            ("mass_factor_force", t.mass_factor_force),
            ("mass_factor_torque", t.mass_factor_torque),
            ("key_rotation_deg", t.key_rotation_deg),
            ("torque_gain", t.torque_gain),
            ("magnetization", t.magnetization),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }

        if !(t.friction > 0.0 && t.friction < 1.0) {
            return Err(ConfigError::InvalidFriction(t.friction));
        }
        if t.mass_factor_force <= 0.0 {
            return Err(ConfigError::InvalidMassFactor {
                name: "mass_factor_force",
                value: t.mass_factor_force,
            });
        }
        if t.mass_factor_torque <= 0.0 {
            return Err(ConfigError::InvalidMassFactor {
                name: "mass_factor_torque",
                value: t.mass_factor_torque,
            });
        }
        if t.solver.grid_x == 0 || t.solver.grid_y == 0 {
            return Err(ConfigError::InvalidGrid { x: t.solver.grid_x, y: t.solver.grid_y });
        }
        if !(t.solver.gradient_step > 0.0 && t.solver.gradient_step.is_finite()) {
            return Err(ConfigError::InvalidGradientStep(t.solver.gradient_step));
        }
        if !(t.solver.moment_scale.is_finite() && t.solver.torque_scale.is_finite()) {
            return Err(ConfigError::NonFinite("solver scale"));
        }

        let w = &self.world;
        if !(w.width > 0.0 && w.height > 0.0 && w.width.is_finite() && w.height.is_finite()) {
            return Err(ConfigError::InvalidWorld { width: w.width, height: w.height });
        }

        if !(self.target.radius > 0.0 && self.target.radius.is_finite()) {
            return Err(ConfigError::InvalidTarget(self.target.radius));
        }

        for (i, obstacle) in self.obstacles.iter().enumerate() {
            if !obstacle.has_valid_dimension() {
                return Err(ConfigError::InvalidDimension(format!("obstacle {}", i)));
            }
            if !(obstacle.position.is_finite()
                && obstacle.angle.is_finite()
                && obstacle.magnetization.is_finite())
            {
                return Err(ConfigError::NonFinite("obstacle pose"));
            }
        }

        let p = &self.player;
        if !(p.half_size.x > 0.0 && p.half_size.y > 0.0 && p.depth > 0.0)
            || !(p.half_size.is_finite() && p.depth.is_finite())
        {
            return Err(ConfigError::InvalidDimension("player".to_string()));
        }
        if !(p.position.is_finite() && p.velocity.is_finite() && p.angle_deg.is_finite()) {
            return Err(ConfigError::NonFinite("player start"));
        }
        let direction = p.magnetization_direction;
        if !direction.is_finite() || direction.length_squared() == 0.0 {
            return Err(ConfigError::InvalidMagnetization);
        }

        Ok(())
    }

    /// The player body at its start pose.
    pub fn player_body(&self) -> DynamicBody {
        let p = &self.player;
        let magnet = MagnetBox::new(
            p.position,
            DVec3::new(2.0 * p.half_size.x, 2.0 * p.half_size.y, p.depth),
            p.magnetization_direction.normalize() * self.tunables.magnetization,
        )
        .with_angle(p.angle_deg.to_radians());
        DynamicBody::new(magnet, p.velocity)
    }

    /// Integration constants for the player. Inverse masses shrink with
    /// the footprint `half_x * half_y`.
    pub fn integrator_params(&self) -> IntegratorParams {
        let t = &self.tunables;
        let footprint = self.player.half_size.x * self.player.half_size.y;
        IntegratorParams {
            translational_factor: t.mass_factor_force / footprint,
            rotational_factor: (t.mass_factor_torque / footprint * t.torque_gain).to_radians(),
            friction: t.friction,
        }
    }

    /// Steering increment per tick, in radians.
    #[inline]
    pub fn key_rotation(&self) -> f64 {
        self.tunables.key_rotation_deg.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = LevelConfig::default();
        assert_eq!(config.target.radius, 48.0);
        assert_eq!(config.target.position, DVec3::new(912.0, 48.0, 0.0));
        assert_eq!(config.player.position, DVec3::new(116.0, 628.0, 0.0));
        assert!(config.validate().is_ok());

        let params = config.integrator_params();
        assert_eq!(params.translational_factor, 2.5);
        assert_eq!(params.friction, 0.985);
    }

    #[test]
    fn test_player_body_from_config() {
        let config = LevelConfig::default();
        let body = config.player_body();
        assert_eq!(body.magnet.dimension, DVec3::new(40.0, 40.0, 20.0));
        assert_eq!(body.magnet.magnetization, DVec3::new(100.0, 0.0, 0.0));
        assert_eq!(body.velocity, DVec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_target_reached_uses_half_radius() {
        let target = Target { position: DVec3::new(900.0, 50.0, 0.0), radius: 48.0 };
        assert!(target.reached_by(DVec3::new(920.0, 50.0, 0.0)));
        assert!(!target.reached_by(DVec3::new(900.0, 80.0, 0.0)));
        assert!(!target.reached_by(DVec3::new(924.0, 50.0, 0.0)));
    }

    #[test]
    fn test_rejects_bad_friction() {
        for friction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let mut config = LevelConfig::default();
            config.tunables.friction = friction;
            assert!(config.validate().is_err(), "friction {} accepted", friction);
        }
    }

    #[test]
    fn test_rejects_bad_mass_factor() {
        let mut config = LevelConfig::default();
        config.tunables.mass_factor_force = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMassFactor { name: "mass_factor_force", .. })
        ));

        let mut config = LevelConfig::default();
        config.tunables.mass_factor_torque = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMassFactor { name: "mass_factor_torque", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let mut config = LevelConfig::default();
        config.obstacles.push(MagnetBox::new(DVec3::ZERO, DVec3::new(10.0, 0.0, 10.0), DVec3::X));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDimension(_))));

        let mut config = LevelConfig::default();
        config.player.half_size.y = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDimension(_))));
    }

    #[test]
    fn test_rejects_non_finite_obstacle_angle() {
        for angle in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut config = LevelConfig::default();
            let mut cube = MagnetBox::new(DVec3::new(480.0, 360.0, 0.0), DVec3::splat(64.0), DVec3::X);
            cube.angle = angle;
            config.obstacles.push(cube);
            assert!(matches!(config.validate(), Err(ConfigError::NonFinite("obstacle pose"))));
        }
    }

    #[test]
    fn test_rejects_empty_grid_and_world() {
        let mut config = LevelConfig::default();
        config.tunables.solver.grid_y = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGrid { .. })));

        let mut config = LevelConfig::default();
        config.world.height = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorld { .. })));

        let mut config = LevelConfig::default();
        config.target.radius = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTarget(_))));

        let mut config = LevelConfig::default();
        config.player.magnetization_direction = DVec3::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMagnetization)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "level": 7,
            "obstacles": [
                { "position": [480.0, 360.0, 0.0], "angle": 0.0,
                  "dimension": [64.0, 64.0, 64.0], "magnetization": [100.0, 0.0, 0.0] }
            ],
            "tunables": { "friction": 0.9, "max_bounces": 2 }
        }"#;

        let config = LevelConfig::from_json_str(json).unwrap();
        assert_eq!(config.level, 7);
        assert_eq!(config.obstacles.len(), 1);
        assert_eq!(config.tunables.friction, 0.9);
        assert_eq!(config.tunables.max_bounces, 2);
        assert_eq!(config.tunables.key_rotation_deg, 5.5);
        assert_eq!(config.world.width, WORLD_WIDTH);
    }

    #[test]
    fn test_json_errors_surface() {
        assert!(matches!(LevelConfig::from_json_str("{ not json"), Err(ConfigError::Parse(_))));

        let invalid = r#"{ "tunables": { "friction": 1.2 } }"#;
        assert!(matches!(
            LevelConfig::from_json_str(invalid),
            Err(ConfigError::InvalidFriction(_))
        ));
    }
}
