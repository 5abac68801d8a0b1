//! 2D triangle tests in NDC space
//!
//! Edge functions, containment with a top-left fill rule, and barycentric
//! weights for depth interpolation. Positive signed area means the
//! triangle is counter-clockwise with +Y up.

use super::vector::Vec2;
use super::AREA_EPSILON;

/// Axis-aligned bounding box in NDC (x, y)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point. An empty slice gives an inverted
    /// box that contains nothing.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    /// Inclusive on all four sides.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
pub fn signed_double_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

pub fn double_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    signed_double_area(a, b, c).abs()
}

/// Which side of the directed edge `start -> end` the point lies on:
/// positive to the left, zero on the line.
///
/// Evaluated in a canonical endpoint order, so the two triangles sharing an
/// edge get values that are exact negatives of each other.
pub fn edge_function(start: Vec2, end: Vec2, p: Vec2) -> f32 {
    let canonical = start.x < end.x || (start.x == end.x && start.y <= end.y);
    if canonical {
        signed_double_area(start, end, p)
    } else {
        -signed_double_area(end, start, p)
    }
}

/// Top-left edge of a counter-clockwise triangle (owns its boundary points).
fn is_top_left(start: Vec2, end: Vec2) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    dy < 0.0 || (dy == 0.0 && dx < 0.0)
}

/// Half-plane containment test.
///
/// Works for either winding. Points on an edge belong to the triangle only
/// if that edge is top-left, so a point on an edge shared by two adjacent
/// triangles is inside exactly one of them. Degenerate triangles contain
/// nothing.
pub fn point_in_triangle(p: Vec2, tri: &[Vec2; 3]) -> bool {
    let [a, mut b, mut c] = *tri;
    let area = signed_double_area(a, b, c);
    if area.abs() < AREA_EPSILON {
        return false;
    }
    if area < 0.0 {
        std::mem::swap(&mut b, &mut c);
    }

    for (start, end) in [(a, b), (b, c), (c, a)] {
        let w = edge_function(start, end, p);
        if w > 0.0 {
            continue;
        }
        if w == 0.0 && is_top_left(start, end) {
            continue;
        }
        return false;
    }
    true
}

/// Barycentric weights of `p` relative to `tri`.
///
/// Sub-areas are taken as absolute values and normalised by their sum, so
/// the weights always add to one and a query at a vertex yields exactly
/// `1, 0, 0`. Returns `None` for a degenerate triangle.
pub fn barycentric_weights(p: Vec2, tri: &[Vec2; 3]) -> Option<[f32; 3]> {
    let [a, b, c] = *tri;
    if double_area(a, b, c) < AREA_EPSILON {
        return None;
    }
    let wa = double_area(p, b, c);
    let wb = double_area(a, p, c);
    let wc = double_area(a, b, p);
    let sum = wa + wb + wc;
    if sum < AREA_EPSILON {
        return None;
    }
    Some([wa / sum, wb / sum, wc / sum])
}

/// Weighted blend of a per-vertex scalar.
pub fn interpolate_attribute(weights: [f32; 3], values: [f32; 3]) -> f32 {
    weights[0] * values[0] + weights[1] * values[1] + weights[2] * values[2]
}
