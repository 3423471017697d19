//! Force and Torque Solver
//!
//! Net magnetic force and torque on a target box from a set of sources.
//!
//! The target is not treated as a single dipole. Its mid-plane is split into
//! an `grid_x x grid_y` lattice of cell centers, each carrying an equal share
//! of the total moment `M * volume * moment_scale` (rotated with the body).
//! At every sample the source field `B` and its Jacobian are evaluated, the
//! Jacobian by forward differences with step `gradient_step`:
//!
//! ```text
//! dB/dx_i ~ (B(p + h e_i) - B(p)) / h
//! F_k     = (m . grad) B          = sum_i m_i dB/dx_i
//! T_k     = torque_scale * (m x B + (p - r_ref) x F_k)
//! ```
//!
//! The z-component of the summed force is zeroed; the game is planar.
//! Cost is `4 * grid_x * grid_y * |sources|` box-field evaluations.

use glam::DVec3;
use serde::{Serialize, Deserialize};

use super::field::field_at;
use super::magnet::MagnetBox;

/// Converts magnetization x volume into moment units. Together with the
/// default gradient this gives forces of order 0.1 for the stock levels,
/// which the integrator's mass factor turns into px/tick^2.
pub const MOMENT_SCALE: f64 = 7.957_747_154_594_767e-7;

/// Lever-arm scale applied to the summed torque.
pub const TORQUE_SCALE: f64 = 1e-3;

/// Forward-difference step (world units).
pub const GRADIENT_STEP: f64 = 1e-3;

/// Solver tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Samples along the body x-axis
    pub grid_x: usize,
    /// Samples along the body y-axis
    pub grid_y: usize,
    /// Finite-difference step for the field gradient
    pub gradient_step: f64,
    /// Magnetization x volume to moment conversion
    pub moment_scale: f64,
    /// Scale on the summed torque
    pub torque_scale: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            grid_x: 6,
            grid_y: 6,
            gradient_step: GRADIENT_STEP,
            moment_scale: MOMENT_SCALE,
            torque_scale: TORQUE_SCALE,
        }
    }
}

/// Net load on a body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceTorque {
    /// Net force (z always zero)
    pub force: DVec3,
    /// Net torque about the reference point
    pub torque: DVec3,
}

/// One lattice sample of the target body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    /// World position
    pub position: DVec3,
    /// Moment carried by this sample (world frame)
    pub moment: DVec3,
}

/// Field and its three partial derivatives at a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldGradient {
    /// Field at the point
    pub field: DVec3,
    /// `[dB/dx, dB/dy, dB/dz]`
    pub partials: [DVec3; 3],
}

impl FieldGradient {
    /// Force on a point dipole `moment`: `(m . grad) B`.
    #[inline]
    pub fn force_on(&self, moment: DVec3) -> DVec3 {
        self.partials[0] * moment.x + self.partials[1] * moment.y + self.partials[2] * moment.z
    }
}

/// Split `target` into its moment-carrying samples.
pub fn sample_lattice(target: &MagnetBox, settings: &SolverSettings) -> Vec<SamplePoint> {
    let (nx, ny) = (settings.grid_x, settings.grid_y);
    let count = nx * ny;
    if count == 0 {
        return Vec::new();
    }

    let half = target.half_extents();
    let moment = target.world_magnetization() * target.volume() * settings.moment_scale
        / count as f64;
    let cell_x = 2.0 * half.x / nx as f64;
    let cell_y = 2.0 * half.y / ny as f64;

    let mut samples = Vec::with_capacity(count);
    for j in 0..ny {
        for i in 0..nx {
            let local = DVec3::new(
                -half.x + (i as f64 + 0.5) * cell_x,
                -half.y + (j as f64 + 0.5) * cell_y,
                0.0,
            );
            samples.push(SamplePoint {
                position: target.to_world(local),
                moment,
            });
        }
    }
    samples
}

/// Field of `sources` at `point` with a forward-difference Jacobian.
pub fn field_gradient(sources: &[MagnetBox], point: DVec3, step: f64) -> FieldGradient {
    let field = field_at(sources, point);
    let partials = [DVec3::X, DVec3::Y, DVec3::Z]
        .map(|axis| (field_at(sources, point + axis * step) - field) / step);
    FieldGradient { field, partials }
}

/// Net force and torque on `target` from `sources`, torque taken about
/// `reference` (normally the target's center).
pub fn solve(
    sources: &[MagnetBox],
    target: &MagnetBox,
    reference: DVec3,
    settings: &SolverSettings,
) -> ForceTorque {
    let mut force = DVec3::ZERO;
    let mut torque = DVec3::ZERO;

    for sample in sample_lattice(target, settings) {
        let gradient = field_gradient(sources, sample.position, settings.gradient_step);
        let local_force = gradient.force_on(sample.moment);

        force += local_force;
        torque += sample.moment.cross(gradient.field)
            + (sample.position - reference).cross(local_force);
    }

    force.z = 0.0;
    torque *= settings.torque_scale;

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(?force, ?torque, sources = sources.len(), "solved load");

    ForceTorque { force, torque }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const M0: f64 = 100.0;

    fn block(x: f64, y: f64, magnetization: DVec3) -> MagnetBox {
        MagnetBox::new(DVec3::new(x, y, 0.0), DVec3::new(40.0, 40.0, 20.0), magnetization)
    }

    #[test]
    fn test_like_poles_repel() {
        let source = block(0.0, 0.0, DVec3::new(M0, 0.0, 0.0));
        let target = block(100.0, 0.0, DVec3::new(-M0, 0.0, 0.0));

        let load = solve(&[source], &target, target.position, &SolverSettings::default());
        assert!(load.force.x > 0.0, "expected repulsion, got {:?}", load.force);
        assert!(load.force.y.abs() < load.force.x.abs() * 1e-6);
    }

    #[test]
    fn test_opposite_poles_attract() {
        let source = block(0.0, 0.0, DVec3::new(M0, 0.0, 0.0));
        let target = block(100.0, 0.0, DVec3::new(M0, 0.0, 0.0));

        let load = solve(&[source], &target, target.position, &SolverSettings::default());
        assert!(load.force.x < 0.0, "expected attraction, got {:?}", load.force);
    }

    #[test]
    fn test_force_has_no_z_component() {
        let source = block(0.0, 0.0, DVec3::new(0.0, M0, 0.0)).with_angle(0.3);
        let target = block(70.0, 45.0, DVec3::new(M0, 0.0, 0.0)).with_angle(-1.1);

        let load = solve(&[source], &target, target.position, &SolverSettings::default());
        assert_eq!(load.force.z, 0.0);
        assert!(load.force.is_finite());
        assert!(load.torque.is_finite());
    }

    #[test]
    fn test_aligned_dipole_has_no_torque() {
        // Target on the source axis, magnetized along the local field
        let source = block(0.0, 0.0, DVec3::new(M0, 0.0, 0.0));
        let target = block(100.0, 0.0, DVec3::new(M0, 0.0, 0.0));

        let load = solve(&[source], &target, target.position, &SolverSettings::default());
        assert!(load.torque.z.abs() < 1e-9, "torque {:?}", load.torque);
    }

    #[test]
    fn test_misaligned_dipole_turns_toward_field() {
        // Field on the +x axis of the source points along +x; a target
        // magnetized slightly counter-clockwise of it must be pulled back.
        let source = block(0.0, 0.0, DVec3::new(M0, 0.0, 0.0));
        let target = block(100.0, 0.0, DVec3::new(M0, 0.0, 0.0)).with_angle(PI / 8.0);

        let load = solve(&[source], &target, target.position, &SolverSettings::default());
        assert!(load.torque.z < 0.0, "torque {:?}", load.torque);
    }

    #[test]
    fn test_no_sources_no_load() {
        let target = block(10.0, 10.0, DVec3::new(M0, 0.0, 0.0));
        let load = solve(&[], &target, target.position, &SolverSettings::default());
        assert_eq!(load, ForceTorque::default());
    }

    #[test]
    fn test_sample_lattice_layout() {
        let target = block(100.0, 50.0, DVec3::new(M0, 0.0, 0.0));
        let settings = SolverSettings { grid_x: 4, grid_y: 2, ..SolverSettings::default() };
        let samples = sample_lattice(&target, &settings);

        assert_eq!(samples.len(), 8);
        assert_eq!(samples[0].position, DVec3::new(85.0, 40.0, 0.0));
        assert_eq!(samples[7].position, DVec3::new(115.0, 60.0, 0.0));

        let total: DVec3 = samples.iter().fold(DVec3::ZERO, |acc, s| acc + s.moment);
        let expected = target.world_magnetization() * target.volume() * settings.moment_scale;
        assert!((total - expected).length() < expected.length() * 1e-12);

        let empty = SolverSettings { grid_x: 0, ..settings };
        assert!(sample_lattice(&target, &empty).is_empty());
    }

    #[test]
    fn test_finer_grid_converges() {
        let source = block(0.0, 0.0, DVec3::new(M0, 0.0, 0.0));
        let target = block(90.0, 20.0, DVec3::new(0.0, M0, 0.0));

        let coarse = SolverSettings { grid_x: 6, grid_y: 6, ..SolverSettings::default() };
        let fine = SolverSettings { grid_x: 12, grid_y: 12, ..SolverSettings::default() };

        let a = solve(&[source], &target, target.position, &coarse).force;
        let b = solve(&[source], &target, target.position, &fine).force;
        assert!((a - b).length() < 0.1 * b.length(), "coarse {:?} fine {:?}", a, b);
    }
}
