//! Triangle clipping against homogeneous planes
//!
//! Sutherland-Hodgman specialised for triangles: one plane turns a
//! triangle into at most two triangles, never a general polygon. Output
//! triangles keep the input winding and carry freshly computed vertices.

use super::frustum::ClipPlane;
use crate::geometry::Vec4;

/// Three clip-space vertices.
pub type ClipTriangle = [Vec4; 3];

/// Result of clipping one triangle against one plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipResult {
    /// No vertex outside; the triangle passes through untouched.
    Inside(ClipTriangle),
    /// Two vertices outside; the triangle shrinks to its inside corner.
    Trimmed(ClipTriangle),
    /// One vertex outside; the remaining quad is split in two.
    Split(ClipTriangle, ClipTriangle),
    /// Every vertex outside.
    Outside,
}

impl ClipResult {
    pub fn len(&self) -> usize {
        match self {
            ClipResult::Inside(_) | ClipResult::Trimmed(_) => 1,
            ClipResult::Split(_, _) => 2,
            ClipResult::Outside => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ClipResult::Outside)
    }
}

impl IntoIterator for ClipResult {
    type Item = ClipTriangle;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<ClipTriangle>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        let slots = match self {
            ClipResult::Inside(t) | ClipResult::Trimmed(t) => [Some(t), None],
            ClipResult::Split(a, b) => [Some(a), Some(b)],
            ClipResult::Outside => [None, None],
        };
        slots.into_iter().flatten()
    }
}

/// Clip one triangle against one plane.
pub fn clip_triangle(tri: ClipTriangle, plane: &ClipPlane) -> ClipResult {
    let inside = [
        plane.contains(tri[0]),
        plane.contains(tri[1]),
        plane.contains(tri[2]),
    ];

    match inside.iter().filter(|&&i| !i).count() {
        0 => ClipResult::Inside(tri),
        3 => ClipResult::Outside,
        1 => {
            // Rotate so the lone outside vertex comes first; rotation keeps winding
            let lone = inside.iter().position(|&i| !i).unwrap_or(0);
            let (a, b, c) = (tri[lone], tri[(lone + 1) % 3], tri[(lone + 2) % 3]);
            let ab = plane.intersect(b, a);
            let ac = plane.intersect(c, a);
            ClipResult::Split([b, c, ac], [b, ac, ab])
        }
        _ => {
            let lone = inside.iter().position(|&i| i).unwrap_or(0);
            let (a, b, c) = (tri[lone], tri[(lone + 1) % 3], tri[(lone + 2) % 3]);
            let ab = plane.intersect(a, b);
            let ac = plane.intersect(a, c);
            ClipResult::Trimmed([a, ab, ac])
        }
    }
}

/// Clip a triangle against each plane in turn, feeding every survivor of
/// one plane into the next.
pub fn frustum_clip(tri: ClipTriangle, planes: &[ClipPlane]) -> Vec<ClipTriangle> {
    let mut alive = vec![tri];
    for plane in planes {
        alive = alive
            .into_iter()
            .flat_map(|t| clip_triangle(t, plane))
            .collect();
        if alive.is_empty() {
            break;
        }
    }
    alive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipping::Frustum;
    use crate::geometry::{double_area, signed_double_area, Vec2};

    fn tri2(points: [(f32, f32); 3]) -> ClipTriangle {
        points.map(|(x, y)| Vec4::new(x, y, 0.5, 1.0))
    }

    fn area(t: &ClipTriangle) -> f32 {
        double_area(t[0].truncate().xy(), t[1].truncate().xy(), t[2].truncate().xy()) * 0.5
    }

    fn winding(t: &ClipTriangle) -> f32 {
        signed_double_area(
            Vec2::new(t[0].x, t[0].y),
            Vec2::new(t[1].x, t[1].y),
            Vec2::new(t[2].x, t[2].y),
        )
    }

    #[test]
    fn test_fully_inside_passes_through() {
        let t = tri2([(-0.5, -0.5), (0.5, -0.5), (0.0, 0.5)]);
        for plane in Frustum::planes(true) {
            assert_eq!(clip_triangle(t, plane), ClipResult::Inside(t));
        }
    }

    #[test]
    fn test_fully_outside_is_empty() {
        let t = tri2([(2.0, 0.0), (3.0, 0.0), (2.5, 0.5)]);
        let result = clip_triangle(t, &ClipPlane::RIGHT);
        assert!(result.is_empty());
        assert_eq!(result.into_iter().count(), 0);
    }

    #[test]
    fn test_one_outside_splits_in_two() {
        // Left plane keeps x >= -1; the full area is 8, the kept part 7.5
        let t = tri2([(-2.0, 0.0), (2.0, 0.0), (2.0, 4.0)]);
        let result = clip_triangle(t, &ClipPlane::LEFT);
        assert_eq!(result.len(), 2);

        let pieces: Vec<_> = result.into_iter().collect();
        let total: f32 = pieces.iter().map(area).sum();
        assert!((total - 7.5).abs() < 0.0001, "kept area {}", total);
        for piece in &pieces {
            assert!(winding(piece) > 0.0);
            for v in piece {
                assert!(v.x >= -1.0 - 0.0001);
            }
        }
    }

    #[test]
    fn test_two_outside_trims_to_one() {
        // Right plane keeps x <= 1: only the corner (0,0),(1,0),(1,1) survives
        let t = tri2([(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]);
        let result = clip_triangle(t, &ClipPlane::RIGHT);
        let pieces: Vec<_> = result.into_iter().collect();
        assert_eq!(pieces.len(), 1);
        assert!((area(&pieces[0]) - 0.5).abs() < 0.0001);
        assert!(winding(&pieces[0]) > 0.0);
        assert_eq!(pieces[0][0], t[0]);
    }

    #[test]
    fn test_outside_vertex_position_is_irrelevant_to_order() {
        // Same triangle with the outside vertex in each slot
        let base = [(-2.0, 0.0), (2.0, 0.0), (2.0, 4.0)];
        for shift in 0..3 {
            let rotated = [base[shift], base[(shift + 1) % 3], base[(shift + 2) % 3]];
            let pieces: Vec<_> = clip_triangle(tri2(rotated), &ClipPlane::LEFT).into_iter().collect();
            let total: f32 = pieces.iter().map(area).sum();
            assert!((total - 7.5).abs() < 0.0001);
        }
    }

    #[test]
    fn test_frustum_clip_chains_planes() {
        // Larger than the view on every side: the result tiles the unit square
        let t = tri2([(-3.0, -3.0), (6.0, -3.0), (-3.0, 6.0)]);
        let pieces = frustum_clip(t, Frustum::planes(true));
        let total: f32 = pieces.iter().map(area).sum();
        assert!((total - 4.0).abs() < 0.001, "clipped area {}", total);
        for piece in &pieces {
            for v in piece {
                assert!(v.x.abs() <= 1.0001 && v.y.abs() <= 1.0001);
            }
        }
    }

    #[test]
    fn test_frustum_clip_without_culling_keeps_sides() {
        let t = tri2([(-3.0, -3.0), (6.0, -3.0), (-3.0, 6.0)]);
        let pieces = frustum_clip(t, Frustum::planes(false));
        assert_eq!(pieces, vec![t]);
    }

    #[test]
    fn test_near_plane_removes_geometry_behind_camera() {
        let behind = [
            Vec4::new(0.0, 0.0, -1.0, -1.0),
            Vec4::new(1.0, 0.0, -1.0, -1.0),
            Vec4::new(0.0, 1.0, -1.0, -1.0),
        ];
        assert!(frustum_clip(behind, Frustum::planes(false)).is_empty());
    }

    #[test]
    fn test_near_clip_leaves_positive_w() {
        // One vertex behind the eye, two in front
        let t = [
            Vec4::new(0.0, 0.0, -0.5, -0.4),
            Vec4::new(1.0, 0.0, 0.8, 1.0),
            Vec4::new(0.0, 1.0, 0.8, 1.0),
        ];
        let pieces = frustum_clip(t, Frustum::planes(false));
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            for v in piece {
                assert!(v.z >= -0.0001);
                assert!(v.w > 0.0);
            }
        }
    }
}
