//! Geometry kernel
//!
//! Pure value math used by every pipeline stage: vectors, 4x4 matrices,
//! and 2D triangle tests in normalized device coordinates.

pub mod matrix;
pub mod triangle;
pub mod vector;

pub use matrix::*;
pub use triangle::*;
pub use vector::*;

/// Smallest |w| a homogeneous point may have before the perspective
/// divide is refused.
pub const W_EPSILON: f32 = 1e-6;

/// Triangles with twice-area below this contain nothing and interpolate
/// nothing.
pub const AREA_EPSILON: f32 = 1e-9;
