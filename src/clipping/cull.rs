//! Back-face culling

use crate::geometry::{Vec3, Vec4};

/// True if the triangle faces the camera (counter-clockwise on screen).
///
/// Runs on the undivided clip coordinates, so it also works for triangles
/// that straddle or sit behind the eye. `(x, y, -w)` is a positively scaled
/// copy of view space with the eye at the origin, which lets the usual
/// `normal · eye_to_vertex <= 0` test apply directly.
pub fn is_front_facing(tri: &[Vec4; 3]) -> bool {
    let [v0, v1, v2] = tri.map(|v| Vec3::new(v.x, v.y, -v.w));
    let normal = (v1 - v0).cross(v2 - v0);
    normal.dot(v0) <= 0.0
}
