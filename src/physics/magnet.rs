//! Magnetized Box
//!
//! The single magnet shape the engine models: a uniformly magnetized
//! rectangular prism that may only rotate about the world z-axis.

use std::f64::consts::{PI, TAU};

use glam::{DQuat, DVec2, DVec3};
use serde::{Serialize, Deserialize};

/// A uniformly magnetized rectangular prism.
///
/// `magnetization` is expressed in the box's own frame; the world-frame
/// vector is obtained by applying the z-rotation `angle`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagnetBox {
    /// Center in world coordinates
    pub position: DVec3,
    /// Rotation about +z in radians, kept in (-PI, PI]
    pub angle: f64,
    /// Full edge lengths (width, height, depth)
    pub dimension: DVec3,
    /// Body-frame magnetization
    pub magnetization: DVec3,
}

impl MagnetBox {
    /// Create an unrotated box.
    pub fn new(position: DVec3, dimension: DVec3, magnetization: DVec3) -> Self {
        Self {
            position,
            angle: 0.0,
            dimension,
            magnetization,
        }
    }

    /// Builder-style rotation in radians.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = wrap_angle(angle);
        self
    }

    /// Half edge lengths.
    #[inline]
    pub fn half_extents(&self) -> DVec3 {
        self.dimension * 0.5
    }

    /// Box volume.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.dimension.x * self.dimension.y * self.dimension.z
    }

    /// Whether every edge length is strictly positive and finite.
    pub fn has_valid_dimension(&self) -> bool {
        self.dimension.is_finite()
            && self.dimension.x > 0.0
            && self.dimension.y > 0.0
            && self.dimension.z > 0.0
    }

    /// Body-to-world rotation.
    #[inline]
    pub fn rotation(&self) -> DQuat {
        DQuat::from_rotation_z(self.angle)
    }

    /// Magnetization rotated into the world frame.
    #[inline]
    pub fn world_magnetization(&self) -> DVec3 {
        self.rotation() * self.magnetization
    }

    /// Express a world point in the box's frame (origin at its center).
    #[inline]
    pub fn to_local(&self, point: DVec3) -> DVec3 {
        self.rotation().inverse() * (point - self.position)
    }

    /// Map a body-frame point to world coordinates.
    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation() * local
    }

    /// Rotate about z by `delta` radians.
    pub fn rotate_z(&mut self, delta: f64) {
        self.angle = wrap_angle(self.angle + delta);
    }

    /// Corners of the horizontal footprint, counter-clockwise from (+x, +y).
    pub fn footprint_corners(&self) -> [DVec2; 4] {
        let half = self.half_extents();
        let (sin, cos) = self.angle.sin_cos();
        let center = self.position.truncate();
        [
            (half.x, half.y),
            (-half.x, half.y),
            (-half.x, -half.y),
            (half.x, -half.y),
        ]
        .map(|(x, y)| center + DVec2::new(x * cos - y * sin, x * sin + y * cos))
    }
}

/// Wrap an angle into (-PI, PI].
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}
