//! Clipping and culling
//!
//! Back-face rejection and view-frustum clipping, both in homogeneous clip
//! space before the perspective divide.

pub mod clip;
pub mod cull;
pub mod frustum;

pub use clip::{clip_triangle, frustum_clip, ClipResult, ClipTriangle};
pub use cull::is_front_facing;
pub use frustum::{ClipPlane, Frustum};
