//! Vector math for the glyph pipeline
//!
//! Plain `Copy` value types: every operation returns a new vector.
//! `Vec4` carries an explicit homogeneous `w`; dividing by it takes a
//! clip-space point into normalized device coordinates.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use super::W_EPSILON;

/// 2D Vector (NDC screen positions, fragment sample points)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn abs(self) -> Vec2 {
        Vec2::new(self.x.abs(), self.y.abs())
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }

    pub fn squared_distance(self, other: Vec2) -> f32 {
        let d = self - other;
        d.dot(d)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        self.squared_distance(other).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        self.scale(s)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn abs(self) -> Vec3 {
        Vec3::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn squared_distance(self, other: Vec3) -> f32 {
        let d = self - other;
        d.dot(d)
    }

    pub fn distance(self, other: Vec3) -> f32 {
        self.squared_distance(other).sqrt()
    }

    /// Lift into homogeneous space with the given `w` (1.0 for points).
    pub fn to_homogeneous(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }

    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Homogeneous 4D vector (clip space)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn dot(self, other: Vec4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn scale(self, s: f32) -> Vec4 {
        Vec4::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }

    pub fn abs(self) -> Vec4 {
        Vec4::new(self.x.abs(), self.y.abs(), self.z.abs(), self.w.abs())
    }

    pub fn squared_distance(self, other: Vec4) -> f32 {
        let d = self - other;
        d.dot(d)
    }

    pub fn distance(self, other: Vec4) -> f32 {
        self.squared_distance(other).sqrt()
    }

    /// Drop `w` without dividing.
    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Perspective divide: `(x/w, y/w, z/w)`.
    ///
    /// Returns `None` when `|w|` is below [`W_EPSILON`]; such a point has no
    /// finite image and contributes nothing downstream.
    pub fn to_euclidean(self) -> Option<Vec3> {
        if self.w.abs() < W_EPSILON {
            return None;
        }
        let inv = 1.0 / self.w;
        Some(Vec3::new(self.x * inv, self.y * inv, self.z * inv))
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, other: Vec4) -> Vec4 {
        Vec4::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, s: f32) -> Vec4 {
        self.scale(s)
    }
}

impl Neg for Vec4 {
    type Output = Vec4;
    fn neg(self) -> Vec4 {
        Vec4::new(-self.x, -self.y, -self.z, -self.w)
    }
}

/// Intersect the segment `source -> vertex` with the plane `{p : axis·p = offset}`.
///
/// `axis` is usually a basis axis (giving an axis-aligned plane) but any
/// homogeneous direction works, which is how the frustum's slanted side
/// planes reuse this. The interpolation ratio is taken as an absolute value
/// so the result does not depend on which endpoint lies on which side.
/// A segment parallel to the plane returns `source` unchanged.
pub fn project_onto_plane(vertex: Vec4, source: Vec4, axis: Vec4, offset: f32) -> Vec4 {
    let from = axis.dot(source);
    let span = axis.dot(vertex) - from;
    if span.abs() < W_EPSILON {
        return source;
    }
    let ratio = ((offset - from) / span).abs();
    source + (vertex - source) * ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_componentwise_ops() {
        let a = Vec3::new(1.0, -2.0, 3.0);
        let b = Vec3::new(0.5, 0.5, -1.0);
        assert_eq!(a + b, Vec3::new(1.5, -1.5, 2.0));
        assert_eq!(a - b, Vec3::new(0.5, -2.5, 4.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, -4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, 2.0, -3.0));
        assert_eq!(a.abs(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Vec2::new(-1.0, 2.0).abs(), Vec2::new(1.0, 2.0));
        assert_eq!(Vec4::new(1.0, 2.0, 3.0, 4.0) - Vec4::new(1.0, 1.0, 1.0, 1.0), Vec4::new(0.0, 1.0, 2.0, 3.0));
    }

    #[test]
    fn test_distance() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 0.0001);
        assert!((a.squared_distance(b) - 25.0).abs() < 0.0001);
        assert!((Vec2::new(1.0, 1.0).distance(Vec2::new(4.0, 5.0)) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_homogeneous_round_trip() {
        for v in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.5, -2.25, 3.0),
            Vec3::new(-1000.0, 0.001, 42.0),
        ] {
            assert_eq!(v.to_homogeneous(1.0).to_euclidean(), Some(v));
        }
    }

    #[test]
    fn test_to_euclidean_divides_by_w() {
        let v = Vec4::new(2.0, 4.0, 6.0, 2.0).to_euclidean().unwrap();
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_to_euclidean_rejects_zero_w() {
        assert!(Vec4::new(1.0, 1.0, 1.0, 0.0).to_euclidean().is_none());
        assert!(Vec4::new(1.0, 1.0, 1.0, 1e-9).to_euclidean().is_none());
    }

    #[test]
    fn test_project_onto_axis_plane() {
        // Segment from z=-1 to z=3 crosses z=0 a quarter of the way along
        let source = Vec4::new(0.0, 0.0, -1.0, 1.0);
        let vertex = Vec4::new(4.0, 0.0, 3.0, 1.0);
        let hit = project_onto_plane(vertex, source, Vec4::new(0.0, 0.0, 1.0, 0.0), 0.0);
        assert!((hit.x - 1.0).abs() < 0.0001);
        assert!(hit.z.abs() < 0.0001);
    }

    #[test]
    fn test_project_onto_plane_is_endpoint_order_independent() {
        let a = Vec4::new(-2.0, 1.0, 0.0, 1.0);
        let b = Vec4::new(2.0, 3.0, 0.0, 1.0);
        let axis = Vec4::new(1.0, 0.0, 0.0, 0.0);
        let p = project_onto_plane(a, b, axis, 1.0);
        let q = project_onto_plane(b, a, axis, 1.0);
        assert!(p.distance(q) < 0.0001);
        assert!((p.x - 1.0).abs() < 0.0001);
        assert!((p.y - 2.5).abs() < 0.0001);
    }
}
