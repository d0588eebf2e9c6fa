use core::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::render::vertex::{Index, Vertex2D};

use super::{checked_triangles, quality, GeometryEncoder, VertexSink, RECT_INDICES};

/// Outer frame: 8 vertices (outer/inner pairs per corner), 24 indices.
const RECT_FRAME_INDICES: [Index; 24] = [
    0, 1, 2, 3, 2, 1, 0, 4, 1, 5, 1, 4, 5, 4, 7, 6, 7, 4, 3, 7, 2, 6, 2, 7,
];

impl GeometryEncoder {
    /// Axis-aligned rectangle; negative extents are normalized.
    pub fn rect(&self, sink: &mut dyn VertexSink, rect: Rect, color: Color) -> u32 {
        let mut region = sink.request(4, 6);
        for (v, p) in region.vertices.iter_mut().zip(rect.normalized().corners()) {
            *v = Vertex2D::shape(p, color);
        }
        region.write_indices(&RECT_INDICES);
        6
    }

    /// Frame of `thickness` drawn outside `rect`.
    pub fn rect_frame(&self, sink: &mut dyn VertexSink, rect: Rect, thickness: f32, color: Color) -> u32 {
        if !(thickness > 0.0) {
            return 0;
        }
        let r = rect.normalized();
        let t = thickness;
        let pts = [
            Vec2::new(r.left() - t, r.top() - t),
            Vec2::new(r.left(), r.top()),
            Vec2::new(r.left() - t, r.bottom() + t),
            Vec2::new(r.left(), r.bottom()),
            Vec2::new(r.right() + t, r.top() - t),
            Vec2::new(r.right(), r.top()),
            Vec2::new(r.right() + t, r.bottom() + t),
            Vec2::new(r.right(), r.bottom()),
        ];

        let mut region = sink.request(8, 24);
        for (v, p) in region.vertices.iter_mut().zip(pts) {
            *v = Vertex2D::shape(p, color);
        }
        region.write_indices(&RECT_FRAME_INDICES);
        24
    }

    /// Rectangle with UVs taken from `uv` (normalized texture coordinates).
    pub fn textured_rect(&self, sink: &mut dyn VertexSink, rect: Rect, uv: Rect, color: Color) -> u32 {
        let mut region = sink.request(4, 6);
        for ((v, p), t) in region.vertices.iter_mut().zip(rect.corners()).zip(uv.corners()) {
            *v = Vertex2D::new(p, t, color);
        }
        region.write_indices(&RECT_INDICES);
        6
    }

    /// Arbitrary quad (perimeter order, starting top-left) with UVs from `uv`.
    pub fn textured_quad(&self, sink: &mut dyn VertexSink, corners: [Vec2; 4], uv: Rect, color: Color) -> u32 {
        let [tl, tr, bl, br] = uv.corners();
        self.quad(sink, corners, [tl, tr, br, bl], color)
    }

    /// Filled circle as a fan of `quality` segments around the center.
    ///
    /// `quality` is clamped to `[3, max_quality]`. A non-positive radius emits nothing.
    pub fn circle(&self, sink: &mut dyn VertexSink, center: Vec2, radius: f32, color: Color, quality: u32) -> u32 {
        self.ellipse(sink, center, radius, radius, color, quality)
    }

    /// Ring between `inner_radius` and `inner_radius + thickness`.
    pub fn circle_frame(
        &self,
        sink: &mut dyn VertexSink,
        center: Vec2,
        inner_radius: f32,
        thickness: f32,
        inner_color: Color,
        outer_color: Color,
        quality: u32,
    ) -> u32 {
        self.ellipse_frame(sink, center, inner_radius, inner_radius, thickness, inner_color, outer_color, quality)
    }

    /// Circle sector. Angles are clockwise from 12 o'clock, in radians.
    pub fn circle_pie(
        &self,
        sink: &mut dyn VertexSink,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        angle: f32,
        color: Color,
        quality: u32,
    ) -> u32 {
        if angle == 0.0 {
            return 0;
        }
        let angle = angle.clamp(-TAU, TAU);
        self.fan(sink, center, radius, start_angle - FRAC_PI_2, angle, quality, color)
    }

    /// Thick arc from `inner_radius` out to `inner_radius + thickness`.
    ///
    /// Angles are clockwise from 12 o'clock, in radians; `quality` is the
    /// number of segments along the arc.
    pub fn circle_arc(
        &self,
        sink: &mut dyn VertexSink,
        center: Vec2,
        inner_radius: f32,
        thickness: f32,
        start_angle: f32,
        angle: f32,
        inner_color: Color,
        outer_color: Color,
        quality: u32,
    ) -> u32 {
        if angle == 0.0 || !(thickness > 0.0) || inner_radius < 0.0 {
            return 0;
        }
        let sweep = angle.clamp(-TAU, TAU);
        let start = start_angle - FRAC_PI_2;
        let segments = self.clamp(quality);
        let outer_radius = inner_radius + thickness;
        let index_count = segments * 6;

        let mut region = sink.request((segments + 1) * 2, index_count);
        for (i, pair) in region.vertices.chunks_exact_mut(2).enumerate() {
            let a = start + sweep * (i as f32 / segments as f32);
            let dir = Vec2::new(a.cos(), a.sin());
            pair[0] = Vertex2D::shape(center + dir * outer_radius, outer_color);
            pair[1] = Vertex2D::shape(center + dir * inner_radius, inner_color);
        }

        let base = region.base;
        for (i, quad) in region.indices.chunks_exact_mut(6).enumerate() {
            let o = base + i as Index * 2;
            quad.copy_from_slice(&[o, o + 1, o + 2, o + 2, o + 1, o + 3]);
        }
        index_count
    }

    /// Fan of `segments` triangles from `center` along an arc. Angles are in the
    /// +Y-down math convention (`0` = +X, increasing clockwise on screen).
    pub(crate) fn fan(
        &self,
        sink: &mut dyn VertexSink,
        center: Vec2,
        radius: f32,
        start: f32,
        sweep: f32,
        segments: u32,
        color: Color,
    ) -> u32 {
        if !(radius > 0.0) {
            return 0;
        }
        let segments = self.clamp(segments);
        let index_count = segments * 3;

        let mut region = sink.request(segments + 2, index_count);
        region.vertices[0] = Vertex2D::shape(center, color);
        for (i, v) in region.vertices[1..].iter_mut().enumerate() {
            let a = start + sweep * (i as f32 / segments as f32);
            *v = Vertex2D::shape(center + Vec2::new(a.cos(), a.sin()) * radius, color);
        }

        let base = region.base;
        for (i, tri) in region.indices.chunks_exact_mut(3).enumerate() {
            let i = i as Index;
            tri.copy_from_slice(&[base, base + i + 1, base + i + 2]);
        }
        index_count
    }

    /// Rectangle with circular corners of `radius` (clamped to half the shorter side).
    ///
    /// `corner_quality` is the number of segments per corner.
    pub fn round_rect(
        &self,
        sink: &mut dyn VertexSink,
        rect: Rect,
        radius: f32,
        color: Color,
        corner_quality: u32,
    ) -> u32 {
        let r = rect.normalized();
        let radius = radius.min(r.size.x * 0.5).min(r.size.y * 0.5);
        if !(radius > 0.0) {
            return self.rect(sink, r, color);
        }

        let segs = self.clamp(corner_quality);
        let per_corner = segs + 1;
        let vertex_count = per_corner * 4;
        let index_count = (vertex_count - 2) * 3;

        let corners = [
            (Vec2::new(r.left() + radius, r.top() + radius), PI),
            (Vec2::new(r.right() - radius, r.top() + radius), PI + FRAC_PI_2),
            (Vec2::new(r.right() - radius, r.bottom() - radius), 0.0),
            (Vec2::new(r.left() + radius, r.bottom() - radius), FRAC_PI_2),
        ];

        let mut region = sink.request(vertex_count, index_count);
        let mut dst = region.vertices.iter_mut();
        for (c, start) in corners {
            for s in 0..per_corner {
                let a = start + FRAC_PI_2 * (s as f32 / segs as f32);
                if let Some(v) = dst.next() {
                    *v = Vertex2D::shape(c + Vec2::new(a.cos(), a.sin()) * radius, color);
                }
            }
        }

        // Convex perimeter: fan from the first vertex.
        let base = region.base;
        for (i, tri) in region.indices.chunks_exact_mut(3).enumerate() {
            let i = i as Index;
            tri.copy_from_slice(&[base, base + i + 1, base + i + 2]);
        }
        index_count
    }

    /// Pre-triangulated polygon: `indices` index into `points`, then `offset` is added.
    ///
    /// An index past the end of `points` rejects the whole shape.
    pub fn shape(
        &self,
        sink: &mut dyn VertexSink,
        points: &[Vec2],
        indices: &[Index],
        offset: Vec2,
        color: Color,
    ) -> u32 {
        if points.is_empty() {
            return 0;
        }
        let Some(indices) = checked_triangles(indices, points.len(), "shape") else {
            return 0;
        };
        if indices.is_empty() {
            return 0;
        }
        let index_count = indices.len() as u32;

        let mut region = sink.request(points.len() as u32, index_count);
        for (v, &p) in region.vertices.iter_mut().zip(points) {
            *v = Vertex2D::shape(p + offset, color);
        }
        region.write_indices(indices);
        index_count
    }

    /// Automatic segment count for a circle of `radius` drawn at `scale`.
    #[inline]
    pub fn circle_quality(&self, radius: f32, scale: f32) -> u32 {
        self.clamp(quality::circle(radius.abs() * scale))
    }

    #[inline]
    pub fn ring_quality(&self, outer_radius: f32, scale: f32) -> u32 {
        self.clamp(quality::ring(outer_radius.abs() * scale))
    }

    #[inline]
    pub fn pie_quality(&self, radius: f32, angle: f32, scale: f32) -> u32 {
        self.clamp(quality::pie(radius.abs() * scale, angle))
    }

    #[inline]
    pub fn corner_quality(&self, radius: f32, scale: f32) -> u32 {
        self.clamp(quality::corner_fan(radius.abs() * scale))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_sink::VecSink;
    use super::*;

    fn enc() -> GeometryEncoder {
        GeometryEncoder::default()
    }

    // ── rect ──────────────────────────────────────────────────────────────

    #[test]
    fn rect_uses_standard_table() {
        let mut sink = VecSink::default();
        assert_eq!(enc().rect(&mut sink, Rect::new(0.0, 0.0, 4.0, 2.0), Color::WHITE), 6);
        assert_eq!(sink.indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(sink.vertices[3].pos, [4.0, 2.0]);
    }

    #[test]
    fn rect_frame_surrounds_rect() {
        let mut sink = VecSink::default();
        assert_eq!(enc().rect_frame(&mut sink, Rect::new(10.0, 10.0, 5.0, 5.0), 2.0, Color::WHITE), 24);
        assert_eq!(sink.vertices[0].pos, [8.0, 8.0]);
        assert_eq!(sink.vertices[6].pos, [17.0, 17.0]);
        assert!(sink.indices_in_range());
    }

    #[test]
    fn rect_frame_without_thickness_is_noop() {
        let mut sink = VecSink::default();
        assert_eq!(enc().rect_frame(&mut sink, Rect::new(0.0, 0.0, 5.0, 5.0), 0.0, Color::WHITE), 0);
        assert_eq!(sink.requests, 0);
    }

    #[test]
    fn textured_rect_maps_uv_corners() {
        let mut sink = VecSink::default();
        enc().textured_rect(&mut sink, Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(0.5, 0.0, 0.5, 0.5), Color::WHITE);
        assert_eq!(sink.vertices[0].tex, [0.5, 0.0]);
        assert_eq!(sink.vertices[3].tex, [1.0, 0.5]);
    }

    // ── circle ────────────────────────────────────────────────────────────

    #[test]
    fn circle_fan_layout() {
        let mut sink = VecSink::default();
        let n = enc().circle(&mut sink, Vec2::new(50.0, 50.0), 10.0, Color::WHITE, 8);
        assert_eq!(n, 24);
        assert_eq!(sink.vertices.len(), 9);
        assert_eq!(&sink.indices[..3], &[1, 0, 2]);
        assert_eq!(&sink.indices[21..], &[8, 0, 1]);

        for v in &sink.vertices[1..] {
            let d = v.position() - Vec2::new(50.0, 50.0);
            assert!((d.length() - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn circle_quality_is_clamped() {
        let mut sink = VecSink::default();
        assert_eq!(enc().circle(&mut sink, Vec2::zero(), 1.0, Color::WHITE, 0), 9);

        let mut sink = VecSink::default();
        let capped = GeometryEncoder::new(16);
        assert_eq!(capped.circle(&mut sink, Vec2::zero(), 1.0, Color::WHITE, 1000), 48);
    }

    #[test]
    fn zero_or_negative_radius_emits_nothing() {
        let mut sink = VecSink::default();
        assert_eq!(enc().circle(&mut sink, Vec2::zero(), 0.0, Color::WHITE, 32), 0);
        assert_eq!(enc().circle(&mut sink, Vec2::zero(), -3.0, Color::WHITE, 32), 0);
        assert_eq!(sink.requests, 0);
        assert!(sink.vertices.is_empty());
    }

    #[test]
    fn ring_wraps_around() {
        let mut sink = VecSink::default();
        let n = enc().circle_frame(&mut sink, Vec2::zero(), 10.0, 2.0, Color::WHITE, Color::BLACK, 6);
        assert_eq!(n, 36);
        assert_eq!(sink.vertices.len(), 12);
        assert!(sink.indices_in_range());
        assert_eq!(&sink.indices[30..], &[10, 11, 0, 0, 11, 1]);
    }

    #[test]
    fn pie_starts_at_twelve_oclock() {
        let mut sink = VecSink::default();
        enc().circle_pie(&mut sink, Vec2::zero(), 10.0, 0.0, FRAC_PI_2, Color::WHITE, 4);
        let first = sink.vertices[1].position();
        let last = sink.vertices.last().map(|v| v.position()).unwrap_or_default();
        assert!(first.x.abs() < 1e-4 && (first.y + 10.0).abs() < 1e-4);
        assert!((last.x - 10.0).abs() < 1e-4 && last.y.abs() < 1e-4);
        assert_eq!(sink.indices.len(), 12);
    }

    #[test]
    fn arc_spans_quarter_turn_clockwise() {
        let mut sink = VecSink::default();
        let n = enc().circle_arc(&mut sink, Vec2::zero(), 10.0, 2.0, 0.0, FRAC_PI_2, Color::WHITE, Color::BLACK, 4);
        assert_eq!(n, 24);
        assert_eq!(sink.vertices.len(), 10);
        assert!(sink.indices_in_range());

        let first_outer = sink.vertices[0].position();
        let first_inner = sink.vertices[1].position();
        let last_outer = sink.vertices[8].position();
        assert!(first_outer.x.abs() < 1e-4 && (first_outer.y + 12.0).abs() < 1e-4);
        assert!(first_inner.x.abs() < 1e-4 && (first_inner.y + 10.0).abs() < 1e-4);
        assert!((last_outer.x - 12.0).abs() < 1e-4 && last_outer.y.abs() < 1e-4);
        assert_eq!(&sink.indices[..6], &[0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn degenerate_arcs_emit_nothing() {
        let mut sink = VecSink::default();
        let e = enc();
        assert_eq!(e.circle_arc(&mut sink, Vec2::zero(), 10.0, 2.0, 0.0, 0.0, Color::WHITE, Color::WHITE, 8), 0);
        assert_eq!(e.circle_arc(&mut sink, Vec2::zero(), 10.0, 0.0, 0.0, PI, Color::WHITE, Color::WHITE, 8), 0);
        assert_eq!(e.circle_arc(&mut sink, Vec2::zero(), -1.0, 2.0, 0.0, PI, Color::WHITE, Color::WHITE, 8), 0);
        assert_eq!(sink.requests, 0);
    }

    // ── round rect ────────────────────────────────────────────────────────

    #[test]
    fn round_rect_stays_inside_bounds() {
        let mut sink = VecSink::default();
        let r = Rect::new(0.0, 0.0, 40.0, 20.0);
        let n = enc().round_rect(&mut sink, r, 6.0, Color::WHITE, 5);
        assert_eq!(sink.vertices.len(), 24);
        assert_eq!(n, 66);
        for v in &sink.vertices {
            assert!(v.pos[0] >= -1e-4 && v.pos[0] <= 40.0 + 1e-4);
            assert!(v.pos[1] >= -1e-4 && v.pos[1] <= 20.0 + 1e-4);
        }
        assert!(sink.indices_in_range());
    }

    #[test]
    fn round_rect_without_radius_is_plain_rect() {
        let mut sink = VecSink::default();
        assert_eq!(enc().round_rect(&mut sink, Rect::new(0.0, 0.0, 4.0, 4.0), 0.0, Color::WHITE, 5), 6);
    }

    // ── shape ─────────────────────────────────────────────────────────────

    #[test]
    fn shape_offsets_points_and_truncates_partial_triangles() {
        let mut sink = VecSink::default();
        let pts = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)];
        let n = enc().shape(&mut sink, &pts, &[0, 1, 2, 2, 1, 3, 0], Vec2::new(5.0, 5.0), Color::WHITE);
        assert_eq!(n, 6);
        assert_eq!(sink.vertices[3].pos, [6.0, 6.0]);
    }

    #[test]
    fn shape_with_out_of_range_index_is_skipped() {
        let mut sink = VecSink::default();
        let pts = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        assert_eq!(enc().shape(&mut sink, &pts, &[0, 1, 7], Vec2::zero(), Color::WHITE), 0);
        assert_eq!(sink.requests, 0);
    }

    #[test]
    fn dropped_partial_triangle_is_not_range_checked() {
        let mut sink = VecSink::default();
        let pts = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        assert_eq!(enc().shape(&mut sink, &pts, &[0, 1, 2, 9], Vec2::zero(), Color::WHITE), 3);
        assert!(sink.indices_in_range());
    }
}
