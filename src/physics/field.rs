//! Field Evaluation
//!
//! Closed-form magnetic field of a uniformly magnetized box.
//!
//! The box is replaced by its equivalent surface charge: each face carries a
//! uniform density `sigma = M . n`. The field of a uniformly charged rectangle
//! is analytic (one `atan` term for the normal component, `ln` terms for the
//! two tangential ones, summed over the four corners), so the box field is the
//! sum over six faces scaled by `1 / 4pi`. Outside the box this is the
//! magnetic flux density in the same units as the magnetization.
//!
//! Points on a face plane or on an edge line are singular; the normal offset
//! and the squared edge distance are clamped to [`MIN_DISTANCE`] so the result
//! stays finite. Evaluation inside a source is not physically meaningful but
//! still returns a finite vector.

use std::f64::consts::PI;

use glam::DVec3;
use serde::{Serialize, Deserialize};

use super::magnet::MagnetBox;

/// Smallest distance (world units) used in the singular terms.
pub const MIN_DISTANCE: f64 = 1e-6;

/// Default background grid resolution per axis.
pub const FIELD_GRID_RESOLUTION: usize = 45;

/// Field produced by one box at a world point.
pub fn box_field(magnet: &MagnetBox, point: DVec3) -> DVec3 {
    let local = magnet.to_local(point);
    let field = cuboid_field_local(magnet.magnetization, magnet.half_extents(), local);
    let field = magnet.rotation() * field;
    if field.is_finite() {
        field
    } else {
        DVec3::ZERO
    }
}

/// Superposed field of all `sources` at `point`.
pub fn field_at(sources: &[MagnetBox], point: DVec3) -> DVec3 {
    sources
        .iter()
        .fold(DVec3::ZERO, |acc, magnet| acc + box_field(magnet, point))
}

/// Field of an axis-aligned box centered at the origin, in its own frame.
fn cuboid_field_local(magnetization: DVec3, half: DVec3, point: DVec3) -> DVec3 {
    let m = magnetization.to_array();
    let h = half.to_array();
    let p = point.to_array();
    let mut field = [0.0f64; 3];

    for normal in 0..3 {
        if m[normal] == 0.0 {
            continue;
        }
        let u = (normal + 1) % 3;
        let v = (normal + 2) % 3;

        for side in [-1.0, 1.0] {
            let sigma = side * m[normal];
            let offset = p[normal] - side * h[normal];
            let g = charged_rectangle(p[u], p[v], offset, h[u], h[v]);
            field[u] += sigma * g[0];
            field[v] += sigma * g[1];
            field[normal] += sigma * g[2];
        }
    }

    DVec3::from_array(field) / (4.0 * PI)
}

/// Integral of `(r - r') / |r - r'|^3` over the rectangle `[-hu, hu] x [-hv, hv]`.
///
/// `(pu, pv)` is the in-plane observation point and `w` its signed distance
/// from the rectangle plane. Returns `[G_u, G_v, G_w]`.
fn charged_rectangle(pu: f64, pv: f64, w: f64, hu: f64, hv: f64) -> [f64; 3] {
    let w = if w.abs() < MIN_DISTANCE {
        MIN_DISTANCE.copysign(w)
    } else {
        w
    };
    let w2 = w * w;
    let mut g = [0.0f64; 3];

    for (su, cu) in [(-1.0, -hu), (1.0, hu)] {
        for (sv, cv) in [(-1.0, -hv), (1.0, hv)] {
            let sign = su * sv;
            let x = cu - pu;
            let y = cv - pv;
            let r = (x * x + y * y + w2).sqrt();

            g[0] += sign * log_sum(y, r, x * x + w2);
            g[1] += sign * log_sum(x, r, y * y + w2);
            g[2] += sign * (x * y / (w * r)).atan();
        }
    }

    g
}

/// `ln(t + r)` where `r = sqrt(t^2 + rho2)`, without cancellation for `t < 0`.
#[inline]
fn log_sum(t: f64, r: f64, rho2: f64) -> f64 {
    if t >= 0.0 {
        (t + r).ln()
    } else {
        let rho2 = rho2.max(MIN_DISTANCE * MIN_DISTANCE);
        (rho2 / (r - t)).ln()
    }
}

/// Field sampled on a regular grid over the game plane.
///
/// Row-major: index `row * cols + col`. Grid lines include both world edges.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldGrid {
    /// Samples per row
    pub cols: usize,
    /// Number of rows
    pub rows: usize,
    /// Sample positions
    pub points: Vec<DVec3>,
    /// Field vector at each sample
    pub field: Vec<DVec3>,
}

impl FieldGrid {
    /// Field amplitude at a grid cell.
    pub fn amplitude(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.field.get(row * self.cols + col).map(|b| b.length())
    }

    /// Amplitudes of all samples in grid order.
    pub fn amplitudes(&self) -> Vec<f64> {
        self.field.iter().map(|b| b.length()).collect()
    }

    /// Smallest and largest amplitude, if the grid is non-empty.
    pub fn amplitude_range(&self) -> Option<(f64, f64)> {
        self.field.iter().map(|b| b.length()).fold(None, |range, a| match range {
            None => Some((a, a)),
            Some((lo, hi)) => Some((lo.min(a), hi.max(a))),
        })
    }
}

/// Sample the superposed field of `sources` on a `cols x rows` grid spanning
/// `[0, width] x [0, height]` at z = 0.
pub fn sample_field_grid(
    sources: &[MagnetBox],
    width: f64,
    height: f64,
    cols: usize,
    rows: usize,
) -> FieldGrid {
    let spacing = |extent: f64, n: usize| if n > 1 { extent / (n - 1) as f64 } else { 0.0 };
    let dx = spacing(width, cols);
    let dy = spacing(height, rows);

    let mut points = Vec::with_capacity(cols * rows);
    let mut field = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let point = DVec3::new(col as f64 * dx, row as f64 * dy, 0.0);
            points.push(point);
            field.push(field_at(sources, point));
        }
    }

    FieldGrid { cols, rows, points, field }
}
