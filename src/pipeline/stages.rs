//! Individual pipeline stages
//!
//! Each function handles one element and touches nothing but its inputs,
//! so the parallel stages can be mapped over any [`WorkDistributor`].
//!
//! [`WorkDistributor`]: super::workers::WorkDistributor

use super::types::*;
use crate::clipping::{frustum_clip, is_front_facing, ClipPlane};
use crate::geometry::{mat4_transform, Aabb, Vec2, Vec3, W_EPSILON};

/// Stage 1: model space to clip space, keeping the NDC image alongside.
pub fn transform_vertex(vertex: &VertexRecord) -> TransformedVertex {
    let clip = mat4_transform(&vertex.transform, vertex.position.to_homogeneous(1.0));
    TransformedVertex {
        clip,
        ndc: clip.to_euclidean(),
    }
}

/// Swap vertex indices for the transformed vertices they name.
///
/// Polygons referencing a vertex outside the buffer are dropped.
pub fn resolve_polygons(polygons: &[PolygonRecord], vertices: &[TransformedVertex]) -> Vec<ResolvedPolygon> {
    polygons
        .iter()
        .filter_map(|polygon| {
            let [a, b, c] = polygon.indices;
            let (a, b, c) = (vertices.get(a)?, vertices.get(b)?, vertices.get(c)?);
            Some(ResolvedPolygon {
                clip: [a.clip, b.clip, c.clip],
                ndc: [a.ndc, b.ndc, c.ndc],
                glyph: polygon.glyph,
            })
        })
        .collect()
}

/// Stage 2: back-face test, frustum clip, and projection of what is left.
pub fn process_polygon(polygon: &ResolvedPolygon, planes: &[ClipPlane]) -> PolygonOutcome {
    if !is_front_facing(&polygon.clip) {
        return PolygonOutcome::Culled;
    }

    let untouched = planes
        .iter()
        .all(|plane| polygon.clip.iter().all(|&v| plane.contains(v)));

    // Nothing to clip: reuse the divide from the vertex stage
    if untouched {
        if let [Some(a), Some(b), Some(c)] = polygon.ndc {
            return PolygonOutcome::Visible(vec![raster_polygon([a, b, c], polygon.glyph)]);
        }
    }

    let pieces: Vec<RasterPolygon> = frustum_clip(polygon.clip, planes)
        .into_iter()
        .filter_map(|tri| {
            let [a, b, c] = tri.map(|v| v.to_euclidean());
            Some(raster_polygon([a?, b?, c?], polygon.glyph))
        })
        .collect();

    if pieces.is_empty() {
        PolygonOutcome::ClippedAway
    } else {
        PolygonOutcome::Visible(pieces)
    }
}

fn raster_polygon(ndc: [Vec3; 3], glyph: Glyph) -> RasterPolygon {
    let points = ndc.map(|v| v.xy());
    RasterPolygon {
        points,
        depths: ndc.map(|v| v.z),
        aabb: Aabb::from_points(&points),
        glyph,
    }
}

/// Stage 3: project a billboard.
///
/// The sprite is dropped when its origin falls outside the depth range or
/// its projected size collapses to nothing.
pub fn project_sprite(sprite: &SpriteRecord) -> Option<RasterSprite> {
    if sprite.bitmap.is_empty() {
        return None;
    }

    let origin_clip = mat4_transform(&sprite.transform, sprite.origin.to_homogeneous(1.0));
    if origin_clip.w <= W_EPSILON
        || !ClipPlane::NEAR.contains(origin_clip)
        || !ClipPlane::FAR.contains(origin_clip)
    {
        return None;
    }
    let origin = origin_clip.to_euclidean()?;
    let bound = mat4_transform(&sprite.transform, sprite.bound.to_homogeneous(1.0)).to_euclidean()?;

    // Measure the origin-to-bound distance in vertical NDC units
    let dx = (bound.x - origin.x) * sprite.aspect;
    let dy = bound.y - origin.y;
    let half_height = (dx * dx + dy * dy).sqrt();
    if half_height < W_EPSILON {
        return None;
    }

    let pixel_height = 2.0 * half_height / sprite.bitmap.height as f32;
    let pixel_width = pixel_height / sprite.aspect;
    let half_width = pixel_width * sprite.bitmap.width as f32 * 0.5;

    Some(RasterSprite {
        aabb: Aabb::new(
            Vec2::new(origin.x - half_width, origin.y - half_height),
            Vec2::new(origin.x + half_width, origin.y + half_height),
        ),
        depth: origin.z,
        pixel_size: Vec2::new(pixel_width, pixel_height),
        bitmap: sprite.bitmap.clone(),
    })
}

/// Stage 4: hand every fragment the full set of surviving polygons and
/// sprites. This is the join point between geometry and rasterization.
pub fn synchronize<'a>(
    fragments: &[FragmentRecord],
    polygons: &'a [RasterPolygon],
    sprites: &'a [RasterSprite],
) -> Vec<FragmentJob<'a>> {
    fragments
        .iter()
        .map(|&fragment| FragmentJob {
            fragment,
            polygons,
            sprites,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipping::Frustum;
    use crate::geometry::mat4_perspective;
    use std::f32::consts::FRAC_PI_2;
    use std::sync::Arc;

    fn projection() -> crate::geometry::Mat4 {
        mat4_perspective(0.1, 100.0, FRAC_PI_2, 1.0)
    }

    fn resolved(points: [Vec3; 3]) -> ResolvedPolygon {
        let transformed = points.map(|p| {
            transform_vertex(&VertexRecord {
                position: p,
                transform: projection(),
            })
        });
        ResolvedPolygon {
            clip: transformed.map(|t| t.clip),
            ndc: transformed.map(|t| t.ndc),
            glyph: Glyph::Solid('#'),
        }
    }

    #[test]
    fn test_transform_vertex_keeps_clip_and_ndc() {
        let out = transform_vertex(&VertexRecord {
            position: Vec3::new(1.0, 0.5, -2.0),
            transform: projection(),
        });
        assert!((out.clip.w - 2.0).abs() < 0.0001);
        let ndc = out.ndc.unwrap();
        assert!((ndc.x - 0.5).abs() < 0.0001);
        assert!((ndc.y - 0.25).abs() < 0.0001);
    }

    #[test]
    fn test_transform_vertex_at_eye_has_no_ndc() {
        let out = transform_vertex(&VertexRecord {
            position: Vec3::ZERO,
            transform: projection(),
        });
        assert!(out.ndc.is_none());
    }

    #[test]
    fn test_resolve_skips_bad_indices() {
        let vertices = vec![
            TransformedVertex { clip: crate::geometry::Vec4::new(0.0, 0.0, 0.0, 1.0), ndc: Some(Vec3::ZERO) };
            3
        ];
        let polygons = [
            PolygonRecord { indices: [0, 1, 2], glyph: Glyph::Solid('a') },
            PolygonRecord { indices: [0, 1, 7], glyph: Glyph::Solid('b') },
        ];
        let out = resolve_polygons(&polygons, &vertices);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].glyph, Glyph::Solid('a'));
    }

    #[test]
    fn test_visible_polygon_passes_through() {
        let polygon = resolved([
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        match process_polygon(&polygon, Frustum::planes(true)) {
            PolygonOutcome::Visible(pieces) => {
                assert_eq!(pieces.len(), 1);
                assert_eq!(pieces[0].points[1], Vec2::new(0.5, 0.0));
                assert!(pieces[0].aabb.contains(Vec2::new(0.25, 0.25)));
            }
            other => panic!("expected visible polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_back_face_is_culled() {
        let polygon = resolved([
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
            Vec3::new(1.0, 0.0, -2.0),
        ]);
        assert_eq!(process_polygon(&polygon, Frustum::planes(true)), PolygonOutcome::Culled);
    }

    #[test]
    fn test_polygon_before_near_plane_is_clipped_away() {
        let polygon = resolved([
            Vec3::new(0.0, 0.0, -0.05),
            Vec3::new(0.01, 0.0, -0.05),
            Vec3::new(0.0, 0.01, -0.05),
        ]);
        assert_eq!(process_polygon(&polygon, Frustum::planes(false)), PolygonOutcome::ClippedAway);
    }

    #[test]
    fn test_straddling_polygon_is_split() {
        // Crosses the right edge of the view
        let polygon = resolved([
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(6.0, 0.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        match process_polygon(&polygon, Frustum::planes(true)) {
            PolygonOutcome::Visible(pieces) => {
                assert_eq!(pieces.len(), 2);
                for piece in &pieces {
                    assert!(piece.aabb.max.x <= 1.0001);
                    for depth in piece.depths {
                        assert!((0.0..=1.0).contains(&depth));
                    }
                }
            }
            other => panic!("expected split polygon, got {:?}", other),
        }
        // Without side planes the triangle survives whole
        match process_polygon(&polygon, Frustum::planes(false)) {
            PolygonOutcome::Visible(pieces) => assert_eq!(pieces.len(), 1),
            other => panic!("expected visible polygon, got {:?}", other),
        }
    }

    fn sprite_at(origin: Vec3, half_height: f32) -> SpriteRecord {
        SpriteRecord {
            origin,
            bound: origin + Vec3::Y * half_height,
            transform: projection(),
            aspect: 1.0,
            bitmap: Arc::new(SpriteBitmap::new(2, 4, vec![Glyph::Solid('@'); 8])),
        }
    }

    #[test]
    fn test_project_sprite_size() {
        // Half-height 1 at depth 2 under a 90 degree fov covers NDC y in [-0.5, 0.5]
        let sprite = project_sprite(&sprite_at(Vec3::new(0.0, 0.0, -2.0), 1.0)).unwrap();
        assert!((sprite.aabb.max.y - 0.5).abs() < 0.0001);
        assert!((sprite.aabb.min.y + 0.5).abs() < 0.0001);
        assert!((sprite.pixel_size.y - 0.25).abs() < 0.0001);
        assert!((sprite.aabb.max.x - 0.25).abs() < 0.0001);
        assert!(sprite.depth > 0.0 && sprite.depth < 1.0);
    }

    #[test]
    fn test_project_sprite_behind_camera() {
        assert!(project_sprite(&sprite_at(Vec3::new(0.0, 0.0, 2.0), 1.0)).is_none());
        assert!(project_sprite(&sprite_at(Vec3::new(0.0, 0.0, -200.0), 1.0)).is_none());
    }

    #[test]
    fn test_project_sprite_zero_size() {
        assert!(project_sprite(&sprite_at(Vec3::new(0.0, 0.0, -2.0), 0.0)).is_none());
    }

    #[test]
    fn test_synchronize_shares_geometry() {
        let fragments = [
            FragmentRecord { point: Vec2::new(-0.5, 0.0), overlay: None },
            FragmentRecord { point: Vec2::new(0.5, 0.0), overlay: Some('x') },
        ];
        let polygon = RasterPolygon {
            points: [Vec2::ZERO; 3],
            depths: [0.5; 3],
            aabb: Aabb::from_points(&[Vec2::ZERO]),
            glyph: Glyph::Solid('#'),
        };
        let polygons = vec![polygon];
        let jobs = synchronize(&fragments, &polygons, &[]);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].fragment.overlay, Some('x'));
        assert!(std::ptr::eq(jobs[0].polygons, jobs[1].polygons));
    }
}
