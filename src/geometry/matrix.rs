//! 4x4 matrix operations
//!
//! Row-major `[[f32; 4]; 4]`, column vectors. `mat4_compose(a, b)` applies
//! `b` first, then `a`.

use super::vector::{Vec3, Vec4};

/// 4x4 transformation matrix type
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const MAT4_IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Multiply two 4x4 matrices (`a * b`: apply `b`, then `a`)
pub fn mat4_compose(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

pub fn mat4_transpose(m: &Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = m[j][i];
        }
    }
    result
}

/// Transform a homogeneous vector by a 4x4 matrix
pub fn mat4_transform(m: &Mat4, v: Vec4) -> Vec4 {
    Vec4::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3] * v.w,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3] * v.w,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3] * v.w,
        m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3] * v.w,
    )
}

/// Transform a point (w = 1) and divide back to 3D.
/// `None` if the result lands on the w = 0 plane.
pub fn mat4_transform_point(m: &Mat4, p: Vec3) -> Option<Vec3> {
    mat4_transform(m, p.to_homogeneous(1.0)).to_euclidean()
}

/// Uniform scale matrix
pub fn mat4_scale(s: f32) -> Mat4 {
    [
        [s, 0.0, 0.0, 0.0],
        [0.0, s, 0.0, 0.0],
        [0.0, 0.0, s, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Create translation matrix
pub fn mat4_translation(t: Vec3) -> Mat4 {
    [
        [1.0, 0.0, 0.0, t.x],
        [0.0, 1.0, 0.0, t.y],
        [0.0, 0.0, 1.0, t.z],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation of `theta` radians about `axis` (Rodrigues' formula).
///
/// Counter-clockwise when looking down the axis toward the origin. The axis
/// is normalized here; a zero axis yields the identity.
pub fn mat4_rotation(theta: f32, axis: Vec3) -> Mat4 {
    let axis = axis.normalize();
    if axis == Vec3::ZERO {
        return MAT4_IDENTITY;
    }
    let (x, y, z) = (axis.x, axis.y, axis.z);
    let (s, c) = theta.sin_cos();
    let o = 1.0 - c;

    [
        [o * x * x + c, o * y * x - z * s, o * z * x + y * s, 0.0],
        [o * x * y + z * s, o * y * y + c, o * z * y - x * s, 0.0],
        [o * x * z - y * s, o * y * z + x * s, o * z * z + c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Perspective projection for a camera looking down -Z.
///
/// Output `w` is the view depth (`-z`), and after the divide `z` runs from
/// 0 at `near` to 1 at `far`.
pub fn mat4_perspective(near: f32, far: f32, fov: f32, aspect: f32) -> Mat4 {
    let f = 1.0 / (fov * 0.5).tan();
    let range = far - near;

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, -far / range, -far * near / range],
        [0.0, 0.0, -1.0, 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 0.0001
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = mat4_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mat4_compose(&MAT4_IDENTITY, &m), m);
        assert_eq!(mat4_compose(&m, &MAT4_IDENTITY), m);
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        // Scale then translate: (1,0,0) -> (2,0,0) -> (2,5,0)
        let m = mat4_compose(&mat4_translation(Vec3::new(0.0, 5.0, 0.0)), &mat4_scale(2.0));
        let p = mat4_transform_point(&m, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(approx(p, Vec3::new(2.0, 5.0, 0.0)));

        // Translate then scale: (1,0,0) -> (1,5,0) -> (2,10,0)
        let m = mat4_compose(&mat4_scale(2.0), &mat4_translation(Vec3::new(0.0, 5.0, 0.0)));
        let p = mat4_transform_point(&m, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(approx(p, Vec3::new(2.0, 10.0, 0.0)));
    }

    #[test]
    fn test_transpose() {
        let m = mat4_translation(Vec3::new(1.0, 2.0, 3.0));
        let t = mat4_transpose(&m);
        assert_eq!(t[3][0], 1.0);
        assert_eq!(t[3][2], 3.0);
        assert_eq!(mat4_transpose(&t), m);
    }

    #[test]
    fn test_rotation_about_y() {
        // Quarter turn about +Y takes -Z to -X
        let m = mat4_rotation(FRAC_PI_2, Vec3::Y);
        let p = mat4_transform_point(&m, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(approx(p, Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotation_about_arbitrary_axis() {
        // Half turn about the (1,1,0) diagonal swaps X and Y
        let m = mat4_rotation(PI, Vec3::new(1.0, 1.0, 0.0));
        let p = mat4_transform_point(&m, Vec3::X).unwrap();
        assert!(approx(p, Vec3::Y));
    }

    #[test]
    fn test_rotation_inverse_is_transpose() {
        let m = mat4_rotation(0.7, Vec3::new(0.3, -1.0, 0.5));
        let product = mat4_compose(&m, &mat4_transpose(&m));
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product[i][j] - expected).abs() < 0.0001);
            }
        }
    }

    #[test]
    fn test_perspective_depth_range() {
        let m = mat4_perspective(0.5, 50.0, FRAC_PI_2, 1.0);

        let near = mat4_transform(&m, Vec4::new(0.0, 0.0, -0.5, 1.0));
        assert!((near.w - 0.5).abs() < 0.0001);
        assert!(near.to_euclidean().unwrap().z.abs() < 0.0001);

        let far = mat4_transform(&m, Vec4::new(0.0, 0.0, -50.0, 1.0));
        assert!((far.w - 50.0).abs() < 0.001);
        assert!((far.to_euclidean().unwrap().z - 1.0).abs() < 0.0001);

        let mid = mat4_transform(&m, Vec4::new(0.0, 0.0, -5.0, 1.0)).to_euclidean().unwrap();
        assert!(mid.z > 0.0 && mid.z < 1.0);
    }

    #[test]
    fn test_perspective_fov_edge_maps_to_ndc_one() {
        // 90 degree fov: at depth 2 the visible half-height is 2
        let m = mat4_perspective(0.1, 100.0, FRAC_PI_2, 2.0);
        let top = mat4_transform(&m, Vec4::new(0.0, 2.0, -2.0, 1.0)).to_euclidean().unwrap();
        assert!((top.y - 1.0).abs() < 0.0001);
        let right = mat4_transform(&m, Vec4::new(4.0, 0.0, -2.0, 1.0)).to_euclidean().unwrap();
        assert!((right.x - 1.0).abs() < 0.0001);
    }
}
