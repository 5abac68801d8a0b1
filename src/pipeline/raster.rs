//! Stage 5: per-fragment nearest-surface resolution

use super::types::{FragmentJob, Glyph, RasterPolygon, RasterSprite};
use crate::geometry::{barycentric_weights, interpolate_attribute, point_in_triangle, Vec2};

/// Resolve one fragment to a single character.
///
/// An overlay wins outright. Otherwise the nearest non-transparent hit
/// across all polygons and sprites is drawn, and `fog` fills the cell when
/// nothing covers it.
pub fn shade_fragment(job: &FragmentJob, fog: char) -> char {
    if let Some(overlay) = job.fragment.overlay {
        return overlay;
    }

    let point = job.fragment.point;
    let mut nearest: Option<(f32, char)> = None;
    let mut consider = |depth: f32, glyph: char| {
        if nearest.is_none_or(|(best, _)| depth < best) {
            nearest = Some((depth, glyph));
        }
    };

    for polygon in job.polygons {
        if let Some((depth, glyph)) = sample_polygon(polygon, point) {
            consider(depth, glyph);
        }
    }
    for sprite in job.sprites {
        if let Some(glyph) = sample_sprite(sprite, point) {
            consider(sprite.depth, glyph);
        }
    }

    nearest.map_or(fog, |(_, glyph)| glyph)
}

/// Depth and glyph of `polygon` at `point`, if it covers the point and is
/// drawable.
fn sample_polygon(polygon: &RasterPolygon, point: Vec2) -> Option<(f32, char)> {
    let glyph = polygon.glyph.as_char()?;
    if !polygon.aabb.contains(point) || !point_in_triangle(point, &polygon.points) {
        return None;
    }
    let weights = barycentric_weights(point, &polygon.points)?;
    let depth = interpolate_attribute(weights, polygon.depths);
    depth.is_finite().then_some((depth, glyph))
}

/// Glyph of the bitmap pixel under `point`.
fn sample_sprite(sprite: &RasterSprite, point: Vec2) -> Option<char> {
    if !sprite.aabb.contains(point) {
        return None;
    }
    let bitmap = &sprite.bitmap;
    let col = ((point.x - sprite.aabb.min.x) / sprite.pixel_size.x).floor() as usize;
    let row = ((sprite.aabb.max.y - point.y) / sprite.pixel_size.y).floor() as usize;
    let col = col.min(bitmap.width.saturating_sub(1));
    let row = row.min(bitmap.height.saturating_sub(1));
    match bitmap.get(col, row) {
        Glyph::Solid(c) => Some(c),
        Glyph::Transparent => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Aabb;
    use crate::pipeline::types::{FragmentRecord, SpriteBitmap};
    use std::sync::Arc;

    fn polygon(points: [(f32, f32); 3], depth: f32, glyph: Glyph) -> RasterPolygon {
        let points = points.map(|(x, y)| Vec2::new(x, y));
        RasterPolygon {
            points,
            depths: [depth; 3],
            aabb: Aabb::from_points(&points),
            glyph,
        }
    }

    fn job<'a>(point: Vec2, polygons: &'a [RasterPolygon], sprites: &'a [RasterSprite]) -> FragmentJob<'a> {
        FragmentJob {
            fragment: FragmentRecord { point, overlay: None },
            polygons,
            sprites,
        }
    }

    const COVER: [(f32, f32); 3] = [(-1.0, -1.0), (1.0, -1.0), (0.0, 1.0)];

    #[test]
    fn test_empty_fragment_gets_fog() {
        assert_eq!(shade_fragment(&job(Vec2::ZERO, &[], &[]), ' '), ' ');
        assert_eq!(shade_fragment(&job(Vec2::ZERO, &[], &[]), '.'), '.');
    }

    #[test]
    fn test_nearest_wins_in_any_order() {
        let near = polygon(COVER, 0.2, Glyph::Solid('n'));
        let far = polygon(COVER, 0.8, Glyph::Solid('f'));
        assert_eq!(shade_fragment(&job(Vec2::ZERO, &[near, far], &[]), ' '), 'n');
        assert_eq!(shade_fragment(&job(Vec2::ZERO, &[far, near], &[]), ' '), 'n');
    }

    #[test]
    fn test_equal_depth_keeps_first() {
        let a = polygon(COVER, 0.5, Glyph::Solid('a'));
        let b = polygon(COVER, 0.5, Glyph::Solid('b'));
        assert_eq!(shade_fragment(&job(Vec2::ZERO, &[a, b], &[]), ' '), 'a');
        assert_eq!(shade_fragment(&job(Vec2::ZERO, &[b, a], &[]), ' '), 'b');
    }

    #[test]
    fn test_transparent_polygon_does_not_occlude() {
        let glass = polygon(COVER, 0.1, Glyph::Transparent);
        let wall = polygon(COVER, 0.9, Glyph::Solid('#'));
        assert_eq!(shade_fragment(&job(Vec2::ZERO, &[glass, wall], &[]), ' '), '#');
    }

    #[test]
    fn test_overlay_wins() {
        let wall = [polygon(COVER, 0.1, Glyph::Solid('#'))];
        let mut fragment_job = job(Vec2::ZERO, &wall, &[]);
        fragment_job.fragment.overlay = Some('!');
        assert_eq!(shade_fragment(&fragment_job, ' '), '!');
    }

    #[test]
    fn test_interpolated_depth_decides() {
        // Two crossing planes: left side of `tilted` is nearer than `flat`
        let mut tilted = polygon(COVER, 0.0, Glyph::Solid('t'));
        tilted.depths = [0.1, 0.9, 0.5];
        let flat = polygon(COVER, 0.5, Glyph::Solid('f'));
        let polygons = [tilted, flat];
        assert_eq!(shade_fragment(&job(Vec2::new(-0.5, -0.5), &polygons, &[]), ' '), 't');
        assert_eq!(shade_fragment(&job(Vec2::new(0.5, -0.5), &polygons, &[]), ' '), 'f');
    }

    fn sprite(depth: f32) -> RasterSprite {
        // 2x2 bitmap over [-0.5, 0.5]^2, top-right pixel transparent
        RasterSprite {
            aabb: Aabb::new(Vec2::new(-0.5, -0.5), Vec2::new(0.5, 0.5)),
            depth,
            pixel_size: Vec2::new(0.5, 0.5),
            bitmap: Arc::new(SpriteBitmap::new(
                2,
                2,
                vec![Glyph::Solid('a'), Glyph::Transparent, Glyph::Solid('c'), Glyph::Solid('d')],
            )),
        }
    }

    #[test]
    fn test_sprite_pixel_mapping() {
        let sprites = [sprite(0.5)];
        assert_eq!(shade_fragment(&job(Vec2::new(-0.25, 0.25), &[], &sprites), ' '), 'a');
        assert_eq!(shade_fragment(&job(Vec2::new(0.25, 0.25), &[], &sprites), ' '), ' ');
        assert_eq!(shade_fragment(&job(Vec2::new(-0.25, -0.25), &[], &sprites), ' '), 'c');
        assert_eq!(shade_fragment(&job(Vec2::new(0.25, -0.25), &[], &sprites), ' '), 'd');
        // Bottom-right corner clamps into the last pixel
        assert_eq!(shade_fragment(&job(Vec2::new(0.5, -0.5), &[], &sprites), ' '), 'd');
    }

    #[test]
    fn test_sprite_and_polygon_share_depth_test() {
        let wall = [polygon(COVER, 0.3, Glyph::Solid('#'))];
        let behind = [sprite(0.6)];
        let in_front = [sprite(0.1)];
        let p = Vec2::new(-0.25, 0.25);
        assert_eq!(shade_fragment(&job(p, &wall, &behind), ' '), '#');
        assert_eq!(shade_fragment(&job(p, &wall, &in_front), ' '), 'a');
        // Transparent sprite pixel shows the wall behind it
        assert_eq!(shade_fragment(&job(Vec2::new(0.25, 0.25), &wall, &in_front), ' '), '#');
    }
}
