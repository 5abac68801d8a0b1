//! View frustum planes in homogeneous clip space
//!
//! Every plane passes through the clip-space origin, so each one is a
//! half-space `normal · v >= 0`. With the projection from
//! [`mat4_perspective`](crate::geometry::mat4_perspective) the planes are:
//!
//! | plane  | inside when  |
//! |--------|--------------|
//! | near   | `z >= 0`     |
//! | far    | `z <= w`     |
//! | left   | `x >= -w`    |
//! | right  | `x <= w`     |
//! | bottom | `y >= -w`    |
//! | top    | `y <= w`     |

use crate::geometry::{project_onto_plane, Vec4};

/// A clip plane given as a point on it and an inward-facing normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    pub point: Vec4,
    pub normal: Vec4,
}

impl ClipPlane {
    pub const NEAR: ClipPlane = ClipPlane::through_origin(0.0, 0.0, 1.0, 0.0);
    pub const FAR: ClipPlane = ClipPlane::through_origin(0.0, 0.0, -1.0, 1.0);
    pub const LEFT: ClipPlane = ClipPlane::through_origin(1.0, 0.0, 0.0, 1.0);
    pub const RIGHT: ClipPlane = ClipPlane::through_origin(-1.0, 0.0, 0.0, 1.0);
    pub const BOTTOM: ClipPlane = ClipPlane::through_origin(0.0, 1.0, 0.0, 1.0);
    pub const TOP: ClipPlane = ClipPlane::through_origin(0.0, -1.0, 0.0, 1.0);

    const fn through_origin(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self {
            point: Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 },
            normal: Vec4 { x, y, z, w },
        }
    }

    /// Distance along the normal; negative means outside.
    pub fn signed_distance(&self, v: Vec4) -> f32 {
        self.normal.dot(v - self.point)
    }

    pub fn contains(&self, v: Vec4) -> bool {
        self.signed_distance(v) >= 0.0
    }

    /// Where the segment between an inside and an outside vertex crosses
    /// this plane.
    pub fn intersect(&self, inside: Vec4, outside: Vec4) -> Vec4 {
        project_onto_plane(outside, inside, self.normal, self.normal.dot(self.point))
    }
}

const ALL_PLANES: [ClipPlane; 6] = [
    ClipPlane::NEAR,
    ClipPlane::FAR,
    ClipPlane::LEFT,
    ClipPlane::RIGHT,
    ClipPlane::BOTTOM,
    ClipPlane::TOP,
];

/// Ordered plane sets for the two culling modes.
pub struct Frustum;

impl Frustum {
    /// Near first, so everything after it only sees vertices with `w > 0`.
    /// Without culling only the depth planes apply and geometry beside the
    /// view cone is left for the rasterizer to reject.
    pub fn planes(culling: bool) -> &'static [ClipPlane] {
        if culling {
            &ALL_PLANES
        } else {
            &ALL_PLANES[..2]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_sets() {
        assert_eq!(Frustum::planes(true).len(), 6);
        assert_eq!(Frustum::planes(false), &[ClipPlane::NEAR, ClipPlane::FAR]);
        assert_eq!(Frustum::planes(true)[0], ClipPlane::NEAR);
    }

    #[test]
    fn test_depth_planes() {
        let on_near = Vec4::new(0.0, 0.0, 0.0, 0.5);
        let in_front_of_near = Vec4::new(0.0, 0.0, -0.1, 0.05);
        let beyond_far = Vec4::new(0.0, 0.0, 120.0, 100.0);
        assert!(ClipPlane::NEAR.contains(on_near));
        assert!(!ClipPlane::NEAR.contains(in_front_of_near));
        assert!(!ClipPlane::FAR.contains(beyond_far));
        assert!(ClipPlane::FAR.contains(Vec4::new(0.0, 0.0, 1.0, 2.0)));
    }

    #[test]
    fn test_side_planes() {
        let w = 2.0;
        assert!(ClipPlane::LEFT.contains(Vec4::new(-2.0, 0.0, 1.0, w)));
        assert!(!ClipPlane::LEFT.contains(Vec4::new(-2.5, 0.0, 1.0, w)));
        assert!(!ClipPlane::RIGHT.contains(Vec4::new(2.5, 0.0, 1.0, w)));
        assert!(!ClipPlane::TOP.contains(Vec4::new(0.0, 2.5, 1.0, w)));
        assert!(!ClipPlane::BOTTOM.contains(Vec4::new(0.0, -2.5, 1.0, w)));
    }

    #[test]
    fn test_intersect_lands_on_plane() {
        let inside = Vec4::new(0.0, 0.0, 1.0, 2.0);
        let outside = Vec4::new(6.0, 0.0, 1.0, 2.0);
        let hit = ClipPlane::RIGHT.intersect(inside, outside);
        assert!(ClipPlane::RIGHT.signed_distance(hit).abs() < 0.0001);
        assert!((hit.x - 2.0).abs() < 0.0001);
    }
}
