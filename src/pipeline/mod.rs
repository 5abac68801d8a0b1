//! Rendering pipeline
//!
//! Stages, in order:
//! 1. vertex transform (parallel)
//! 2. polygon cull, clip and project (parallel)
//! 3. sprite projection (parallel)
//! 4. synchronization: index resolution and fragment job assembly (sequential)
//! 5. fragment rasterization (parallel)
//!
//! Each parallel stage is a single [`WorkDistributor::map`] call that
//! returns before the next stage starts, so every stage boundary is a join.

pub mod raster;
pub mod stages;
pub mod types;
pub mod workers;

use std::time::Instant;

use tracing::debug;

use crate::clipping::Frustum;

pub use raster::shade_fragment;
pub use stages::{process_polygon, project_sprite, resolve_polygons, synchronize, transform_vertex};
pub use types::*;
pub use workers::{Inline, WorkDistributor, WorkerError, WorkerPool, Workers};

/// Records for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineInput<'a> {
    pub vertices: &'a [VertexRecord],
    pub polygons: &'a [PolygonRecord],
    pub sprites: &'a [SpriteRecord],
    pub fragments: &'a [FragmentRecord],
}

/// Per-frame switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Clip against the four side planes as well as near and far
    pub culling: bool,
    /// Drawn where nothing covers a fragment
    pub fog_glyph: char,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            culling: true,
            fog_glyph: ' ',
        }
    }
}

/// One glyph per input fragment, in input order.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub glyphs: Vec<char>,
    pub timings: PipelineTimings,
    pub stats: PipelineStats,
}

fn elapsed_ms(start: Instant) -> f32 {
    start.elapsed().as_secs_f32() * 1000.0
}

/// Run all five stages over one frame's records.
pub fn run_pipeline<W: WorkDistributor>(
    workers: &W,
    input: &PipelineInput,
    settings: &PipelineSettings,
) -> PipelineOutput {
    let mut timings = PipelineTimings::default();
    let mut stats = PipelineStats {
        vertices: input.vertices.len(),
        polygons: input.polygons.len(),
        sprites: input.sprites.len(),
        fragments: input.fragments.len(),
        ..Default::default()
    };

    // Stage 1
    let start = Instant::now();
    let transformed = workers.map(input.vertices, transform_vertex);
    timings.vertex_ms = elapsed_ms(start);

    // Index resolution needs every vertex, so it sits between stages 1 and 2
    let start = Instant::now();
    let resolved = resolve_polygons(input.polygons, &transformed);
    timings.sync_ms = elapsed_ms(start);

    // Stage 2
    let start = Instant::now();
    let planes = Frustum::planes(settings.culling);
    let outcomes = workers.map(&resolved, |polygon| process_polygon(polygon, planes));
    let mut raster_polygons = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            PolygonOutcome::Culled => stats.culled += 1,
            PolygonOutcome::ClippedAway => stats.clipped_away += 1,
            PolygonOutcome::Visible(pieces) => raster_polygons.extend(pieces),
        }
    }
    stats.raster_polygons = raster_polygons.len();
    timings.polygon_ms = elapsed_ms(start);

    // Stage 3
    let start = Instant::now();
    let raster_sprites: Vec<RasterSprite> = workers
        .map(input.sprites, project_sprite)
        .into_iter()
        .flatten()
        .collect();
    stats.visible_sprites = raster_sprites.len();
    timings.sprite_ms = elapsed_ms(start);

    // Stage 4
    let start = Instant::now();
    let jobs = synchronize(input.fragments, &raster_polygons, &raster_sprites);
    timings.sync_ms += elapsed_ms(start);

    // Stage 5
    let start = Instant::now();
    let fog = settings.fog_glyph;
    let glyphs = workers.map(&jobs, |job| shade_fragment(job, fog));
    timings.raster_ms = elapsed_ms(start);

    debug!(
        vertices = stats.vertices,
        polygons = stats.polygons,
        culled = stats.culled,
        clipped_away = stats.clipped_away,
        raster_polygons = stats.raster_polygons,
        sprites = stats.visible_sprites,
        total_ms = timings.total_ms(),
        "Pipeline frame complete"
    );

    PipelineOutput { glyphs, timings, stats }
}
