//! Per-frame records passed between pipeline stages
//!
//! One struct per stage transition. Everything here is created fresh for a
//! frame and dropped when the frame is assembled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::{Aabb, Mat4, Vec2, Vec3, Vec4};

/// What a surface draws into a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Glyph {
    Solid(char),
    /// Never drawn and never hides anything behind it.
    Transparent,
}

impl Glyph {
    pub fn is_transparent(self) -> bool {
        matches!(self, Glyph::Transparent)
    }

    pub fn as_char(self) -> Option<char> {
        match self {
            Glyph::Solid(c) => Some(c),
            Glyph::Transparent => None,
        }
    }
}

/// Grid of glyphs for a billboard, stored top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteBitmap {
    pub width: usize,
    pub height: usize,
    pub glyphs: Vec<Glyph>,
}

impl SpriteBitmap {
    /// `glyphs` must hold `width * height` entries, row-major from the top.
    pub fn new(width: usize, height: usize, glyphs: Vec<Glyph>) -> Self {
        debug_assert_eq!(glyphs.len(), width * height);
        Self { width, height, glyphs }
    }

    /// Glyph at `(col, row)` with row 0 at the top. Out of range reads as
    /// transparent.
    pub fn get(&self, col: usize, row: usize) -> Glyph {
        if col >= self.width || row >= self.height {
            return Glyph::Transparent;
        }
        self.glyphs
            .get(row * self.width + col)
            .copied()
            .unwrap_or(Glyph::Transparent)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// =============================================================================
// Stage inputs (seeded by the scene)
// =============================================================================

/// One model-space vertex with its full model-to-clip transform.
#[derive(Debug, Clone, Copy)]
pub struct VertexRecord {
    pub position: Vec3,
    pub transform: Mat4,
}

/// Triangle referencing three entries of the frame's vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonRecord {
    pub indices: [usize; 3],
    pub glyph: Glyph,
}

/// Billboard to project this frame.
///
/// `bound` is a world point whose screen distance from `origin` sets the
/// sprite's half-height; `transform` takes world space to clip space.
#[derive(Debug, Clone)]
pub struct SpriteRecord {
    pub origin: Vec3,
    pub bound: Vec3,
    pub transform: Mat4,
    /// Width over height of the view, in output cells scaled by cell shape.
    pub aspect: f32,
    pub bitmap: Arc<SpriteBitmap>,
}

/// One output cell's sample point in NDC, plus an optional overlay glyph
/// that wins over any geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentRecord {
    pub point: Vec2,
    pub overlay: Option<char>,
}

// =============================================================================
// Stage outputs
// =============================================================================

/// Output of the vertex stage. `ndc` is `None` when `w` is too close to zero
/// to divide by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedVertex {
    pub clip: Vec4,
    pub ndc: Option<Vec3>,
}

/// Polygon with its indices swapped for concrete vertex data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPolygon {
    pub clip: [Vec4; 3],
    pub ndc: [Option<Vec3>; 3],
    pub glyph: Glyph,
}

/// Screen-space triangle ready for fragment tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterPolygon {
    pub points: [Vec2; 3],
    /// NDC depth per vertex, 0 at the near plane
    pub depths: [f32; 3],
    pub aabb: Aabb,
    pub glyph: Glyph,
}

/// Projected billboard.
#[derive(Debug, Clone)]
pub struct RasterSprite {
    pub aabb: Aabb,
    pub depth: f32,
    /// NDC extent of one bitmap pixel
    pub pixel_size: Vec2,
    pub bitmap: Arc<SpriteBitmap>,
}

/// What became of one polygon in the polygon stage.
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonOutcome {
    Culled,
    ClippedAway,
    Visible(Vec<RasterPolygon>),
}

/// A fragment together with everything it has to be tested against.
#[derive(Debug, Clone, Copy)]
pub struct FragmentJob<'a> {
    pub fragment: FragmentRecord,
    pub polygons: &'a [RasterPolygon],
    pub sprites: &'a [RasterSprite],
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Wall-clock time per stage of one frame (ms)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineTimings {
    /// Vertex transform and perspective divide
    pub vertex_ms: f32,
    /// Back-face test, clipping and projection of polygons
    pub polygon_ms: f32,
    /// Billboard projection
    pub sprite_ms: f32,
    /// Index resolution and fragment job assembly
    pub sync_ms: f32,
    /// Per-fragment rasterization
    pub raster_ms: f32,
}

impl PipelineTimings {
    /// Accumulate timings from another instance
    pub fn accumulate(&mut self, other: &PipelineTimings) {
        self.vertex_ms += other.vertex_ms;
        self.polygon_ms += other.polygon_ms;
        self.sprite_ms += other.sprite_ms;
        self.sync_ms += other.sync_ms;
        self.raster_ms += other.raster_ms;
    }

    pub fn total_ms(&self) -> f32 {
        self.vertex_ms + self.polygon_ms + self.sprite_ms + self.sync_ms + self.raster_ms
    }
}

/// Element counts for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub vertices: usize,
    pub polygons: usize,
    /// Polygons dropped by the back-face test
    pub culled: usize,
    /// Polygons with nothing left after clipping
    pub clipped_away: usize,
    /// Triangles handed to the rasterizer
    pub raster_polygons: usize,
    pub sprites: usize,
    pub visible_sprites: usize,
    pub fragments: usize,
}
