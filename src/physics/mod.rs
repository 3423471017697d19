//! Magnetostatics and rigid-body physics.
//!
//! ## Module Structure
//!
//! - `magnet`: The magnetized box value type
//! - `field`: Closed-form box field, superposition, background sampling
//! - `solver`: Net force and torque on a sampled target body
//! - `collision`: Oriented-rectangle overlap tests in the game plane
//! - `integrator`: Per-tick motion update and wall reflection

pub mod magnet;
pub mod field;
pub mod solver;
pub mod collision;
pub mod integrator;

pub use magnet::MagnetBox;
pub use field::{box_field, field_at, sample_field_grid, FieldGrid};
pub use solver::{solve, ForceTorque, SolverSettings};
pub use collision::{first_collision, test_cuboids_xy, CollisionPair};
pub use integrator::{BounceAxis, DynamicBody, IntegratorParams, WorldBounds};
