//! Transform building
//!
//! [`Transformer`] accumulates scale, rotate and translate steps into one
//! matrix. In inverse mode each step is inverted and applied in reverse
//! order, which turns a camera's placement into its view matrix.

use serde::{Deserialize, Serialize};

use crate::geometry::{
    mat4_compose, mat4_rotation, mat4_scale, mat4_transform_point, mat4_translation, Mat4, Vec3,
    MAT4_IDENTITY,
};

/// Accumulating matrix builder
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    inverse: bool,
    matrix: Mat4,
}

impl Transformer {
    /// Each call applies after everything before it.
    pub fn new() -> Self {
        Self {
            inverse: false,
            matrix: MAT4_IDENTITY,
        }
    }

    /// Builds the inverse of the same sequence of calls made on [`Transformer::new`].
    pub fn inverse() -> Self {
        Self {
            inverse: true,
            matrix: MAT4_IDENTITY,
        }
    }

    fn push(mut self, step: Mat4, inverse_step: Mat4) -> Self {
        self.matrix = if self.inverse {
            mat4_compose(&self.matrix, &inverse_step)
        } else {
            mat4_compose(&step, &self.matrix)
        };
        self
    }

    /// Uniform scale. A zero scale has no inverse and is skipped in inverse mode.
    pub fn scale(self, s: f32) -> Self {
        let inverse = if s == 0.0 { MAT4_IDENTITY } else { mat4_scale(1.0 / s) };
        self.push(mat4_scale(s), inverse)
    }

    pub fn translate(self, offset: Vec3) -> Self {
        self.push(mat4_translation(offset), mat4_translation(-offset))
    }

    /// Rotate `theta` radians about `axis`.
    pub fn rotate(self, theta: f32, axis: Vec3) -> Self {
        self.push(mat4_rotation(theta, axis), mat4_rotation(-theta, axis))
    }

    pub fn apply(&self, point: Vec3) -> Option<Vec3> {
        mat4_transform_point(&self.matrix, point)
    }

    pub fn build(&self) -> Mat4 {
        self.matrix
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Placement of an object: scaled, then rotated about an axis, then moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation axis; need not be normalized
    pub axis: Vec3,
    /// Rotation about `axis` in radians
    pub angle: f32,
    pub scale: f32,
}

impl Transform {
    /// Identity transform (origin, no rotation, scale 1)
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        axis: Vec3::Y,
        angle: 0.0,
        scale: 1.0,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Convert to a 4x4 model matrix
    pub fn to_matrix(&self) -> Mat4 {
        Transformer::new()
            .scale(self.scale)
            .rotate(self.angle, self.axis)
            .translate(self.position)
            .build()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
