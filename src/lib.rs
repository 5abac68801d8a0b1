//! glyph-raster: a software rasterizer that draws 3D scenes as text
//!
//! Triangles and camera-facing sprites are projected through a perspective
//! camera, clipped against the view frustum and depth-tested per output
//! cell. The result is a grid of characters, one per cell, ready to print.
//!
//! - [`geometry`]: vectors, 4x4 matrices, 2D triangle tests
//! - [`clipping`]: frustum planes, triangle clipping, back-face test
//! - [`pipeline`]: the five-stage per-frame pipeline and worker distribution
//! - [`frame`]: fragment grid generation and frame assembly
//! - [`resource`]: OBJ/MTL models, colormaps, sprite images
//! - [`scene`]: handles, instances, camera and frame seeding
//! - [`config`]: RON engine and scene files
//! - [`timing`]: frame pacing

pub mod clipping;
pub mod config;
pub mod frame;
pub mod geometry;
pub mod pipeline;
pub mod resource;
pub mod scene;
pub mod timing;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use frame::{assemble_frame, generate_fragments, Frame, FrameError};
pub use pipeline::{run_pipeline, Glyph, Inline, PipelineInput, PipelineOutput, PipelineSettings, WorkerPool, Workers};
pub use scene::{Camera, Scene, SceneError};
pub use timing::FrameClock;
