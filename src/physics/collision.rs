//! Collision Detection
//!
//! Overlap tests for magnet boxes projected onto the game plane.
//! Boxes become oriented rectangles and are tested with the separating
//! axis theorem on the four edge normals. Touching counts as overlap.

use glam::DVec2;
use serde::{Serialize, Deserialize};

use super::magnet::MagnetBox;

/// A rectangle in the xy-plane with arbitrary rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    /// Center
    pub center: DVec2,
    /// Half width and half height
    pub half_extents: DVec2,
    /// Rotation in radians
    pub angle: f64,
}

impl OrientedRect {
    /// Horizontal footprint of a magnet box.
    pub fn from_box(magnet: &MagnetBox) -> Self {
        Self {
            center: magnet.position.truncate(),
            half_extents: magnet.half_extents().truncate(),
            angle: magnet.angle,
        }
    }

    /// The two edge normals (unit length).
    #[inline]
    pub fn axes(&self) -> [DVec2; 2] {
        let (sin, cos) = self.angle.sin_cos();
        [DVec2::new(cos, sin), DVec2::new(-sin, cos)]
    }

    /// Corner points.
    pub fn corners(&self) -> [DVec2; 4] {
        let [ax, ay] = self.axes();
        let ex = ax * self.half_extents.x;
        let ey = ay * self.half_extents.y;
        [
            self.center + ex + ey,
            self.center - ex + ey,
            self.center - ex - ey,
            self.center + ex - ey,
        ]
    }

    /// Min and max of the corner projections onto `axis`.
    #[inline]
    fn project(&self, axis: DVec2) -> (f64, f64) {
        self.corners()
            .iter()
            .map(|c| c.dot(axis))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
    }
}

/// Separating axis test for two oriented rectangles.
pub fn rects_overlap(a: &OrientedRect, b: &OrientedRect) -> bool {
    let [a0, a1] = a.axes();
    let [b0, b1] = b.axes();

    for axis in [a0, a1, b0, b1] {
        let (min_a, max_a) = a.project(axis);
        let (min_b, max_b) = b.project(axis);
        if max_a < min_b || max_b < min_a {
            return false;
        }
    }
    true
}

/// Check whether two boxes overlap in the horizontal plane.
#[inline]
pub fn boxes_overlap_xy(a: &MagnetBox, b: &MagnetBox) -> bool {
    rects_overlap(&OrientedRect::from_box(a), &OrientedRect::from_box(b))
}

/// Test positional pairs `(boxes_a[i], boxes_b[i])`.
///
/// Returns the index of the first overlapping pair. Pairing stops at the
/// shorter of the two slices.
pub fn test_cuboids_xy(boxes_a: &[MagnetBox], boxes_b: &[MagnetBox]) -> Option<usize> {
    debug_assert_eq!(boxes_a.len(), boxes_b.len(), "pairwise test needs equal lengths");

    boxes_a
        .iter()
        .zip(boxes_b)
        .position(|(a, b)| boxes_overlap_xy(a, b))
}

/// Indices of a colliding body/obstacle pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPair {
    /// Index into the body slice
    pub body: usize,
    /// Index into the obstacle slice
    pub obstacle: usize,
}

/// Check every body against every obstacle in deterministic order
/// (bodies outer, obstacles inner) and return the first hit.
pub fn first_collision(bodies: &[MagnetBox], obstacles: &[MagnetBox]) -> Option<CollisionPair> {
    bodies.iter().enumerate().find_map(|(body, b)| {
        obstacles
            .iter()
            .position(|o| boxes_overlap_xy(b, o))
            .map(|obstacle| CollisionPair { body, obstacle })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn rect_box(x: f64, y: f64, w: f64, h: f64, angle: f64) -> MagnetBox {
        MagnetBox::new(DVec3::new(x, y, 0.0), DVec3::new(w, h, 20.0), DVec3::X).with_angle(angle)
    }

    /// Rotate a box about `pivot` by `angle`, turning it in place too.
    fn rotate_about(magnet: &MagnetBox, pivot: DVec2, angle: f64) -> MagnetBox {
        let rel = magnet.position.truncate() - pivot;
        let rotated = DVec2::from_angle(angle).rotate(rel) + pivot;
        let mut out = *magnet;
        out.position = rotated.extend(magnet.position.z);
        out.rotate_z(angle);
        out
    }

    #[test]
    fn test_identical_boxes_collide_at_index_zero() {
        let a = rect_box(50.0, 50.0, 20.0, 10.0, 0.0);
        assert_eq!(test_cuboids_xy(&[a], &[a]), Some(0));
    }

    #[test]
    fn test_separated_boxes_do_not_collide() {
        let a = rect_box(0.0, 0.0, 10.0, 10.0, 0.0);
        let b = rect_box(20.0, 0.0, 10.0, 10.0, 0.0);
        assert_eq!(test_cuboids_xy(&[a], &[b]), None);
    }

    #[test]
    fn test_first_colliding_pair_reported() {
        let far = rect_box(500.0, 500.0, 10.0, 10.0, 0.0);
        let body = rect_box(0.0, 0.0, 10.0, 10.0, 0.0);
        let hit = rect_box(8.0, 0.0, 10.0, 10.0, 0.0);

        let result = test_cuboids_xy(&[body, body, body], &[far, hit, hit]);
        assert_eq!(result, Some(1));
    }

    #[test]
    fn test_touching_edges_count_as_overlap() {
        let a = rect_box(0.0, 0.0, 10.0, 10.0, 0.0);
        let b = rect_box(10.0, 0.0, 10.0, 10.0, 0.0);
        assert!(boxes_overlap_xy(&a, &b));
    }

    #[test]
    fn test_rotation_separates_diagonal_gap() {
        // AABBs overlap, but the rotated square's corner misses the other box
        let a = rect_box(0.0, 0.0, 10.0, 10.0, 0.0);
        let b = rect_box(11.0, 11.0, 10.0, 10.0, PI / 4.0);
        assert!(!boxes_overlap_xy(&a, &b));

        // Corner of the diamond pokes into the square
        let c = rect_box(11.0, 0.0, 10.0, 10.0, PI / 4.0);
        assert!(boxes_overlap_xy(&a, &c));
    }

    #[test]
    fn test_all_pairs_first_collision() {
        let bodies = [rect_box(0.0, 0.0, 10.0, 10.0, 0.0), rect_box(100.0, 0.0, 10.0, 10.0, 0.0)];
        let obstacles = [rect_box(300.0, 0.0, 10.0, 10.0, 0.0), rect_box(104.0, 4.0, 10.0, 10.0, 0.3)];

        assert_eq!(
            first_collision(&bodies, &obstacles),
            Some(CollisionPair { body: 1, obstacle: 1 })
        );
        assert_eq!(first_collision(&bodies[..1], &obstacles), None);
        assert_eq!(first_collision(&[], &obstacles), None);
    }

    proptest! {
        #[test]
        fn prop_disjoint_aabbs_never_collide(
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            w1 in 1.0f64..100.0,
            h1 in 1.0f64..100.0,
            w2 in 1.0f64..100.0,
            h2 in 1.0f64..100.0,
            gap in 0.01f64..50.0,
            horizontal in any::<bool>(),
        ) {
            let a = rect_box(x, y, w1, h1, 0.0);
            let b = if horizontal {
                rect_box(x + (w1 + w2) / 2.0 + gap, y, w2, h2, 0.0)
            } else {
                rect_box(x, y + (h1 + h2) / 2.0 + gap, w2, h2, 0.0)
            };
            prop_assert_eq!(test_cuboids_xy(&[a], &[b]), None);
        }

        #[test]
        fn prop_rotation_preserves_collision(
            dx in -8.0f64..8.0,
            dy in -8.0f64..8.0,
            a0 in -PI..PI,
            a1 in -PI..PI,
            turn in -PI..PI,
        ) {
            // Centers at most 8*sqrt(2) apart with inradius 10 each: always overlapping
            let a = rect_box(200.0, 200.0, 20.0, 20.0, a0);
            let b = rect_box(200.0 + dx, 200.0 + dy, 20.0, 20.0, a1);
            prop_assume!(boxes_overlap_xy(&a, &b));

            let pivot = DVec2::new(200.0 + dx / 2.0, 200.0 + dy / 2.0);
            let ra = rotate_about(&a, pivot, turn);
            let rb = rotate_about(&b, pivot, turn);
            prop_assert_eq!(test_cuboids_xy(&[ra], &[rb]), Some(0));
        }
    }
}
