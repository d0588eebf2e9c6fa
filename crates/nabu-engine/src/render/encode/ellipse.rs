use core::f32::consts::TAU;

use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::render::vertex::{Index, Vertex2D};

use super::{GeometryEncoder, VertexSink};

impl GeometryEncoder {
    /// Filled axis-aligned ellipse with radii `rx` and `ry`, as a fan of
    /// `quality` segments. A non-positive radius emits nothing.
    pub fn ellipse(&self, sink: &mut dyn VertexSink, center: Vec2, rx: f32, ry: f32, color: Color, quality: u32) -> u32 {
        if !(rx > 0.0) || !(ry > 0.0) {
            return 0;
        }
        self.disc(sink, center, Vec2::new(rx, ry), Rect::default(), color, quality)
    }

    /// Ring between the inner radii and the inner radii grown by `thickness`.
    pub fn ellipse_frame(
        &self,
        sink: &mut dyn VertexSink,
        center: Vec2,
        inner_rx: f32,
        inner_ry: f32,
        thickness: f32,
        inner_color: Color,
        outer_color: Color,
        quality: u32,
    ) -> u32 {
        if !(thickness > 0.0) || inner_rx < 0.0 || inner_ry < 0.0 {
            return 0;
        }
        let quality = self.clamp(quality);
        let inner = Vec2::new(inner_rx, inner_ry);
        let outer = Vec2::new(inner_rx + thickness, inner_ry + thickness);
        let index_count = quality * 6;

        let mut region = sink.request(quality * 2, index_count);
        let step = TAU / quality as f32;
        for (i, pair) in region.vertices.chunks_exact_mut(2).enumerate() {
            let rad = step * i as f32;
            let (c, s) = (rad.cos(), -rad.sin());
            pair[0] = Vertex2D::shape(center + Vec2::new(outer.x * c, outer.y * s), outer_color);
            pair[1] = Vertex2D::shape(center + Vec2::new(inner.x * c, inner.y * s), inner_color);
        }

        let base = region.base;
        let wrap = quality * 2;
        for (i, quad) in region.indices.chunks_exact_mut(6).enumerate() {
            let o0 = i as Index * 2;
            let i0 = o0 + 1;
            let o1 = (o0 + 2) % wrap;
            let i1 = (o0 + 3) % wrap;
            quad.copy_from_slice(&[
                base + o0, base + i0, base + o1,
                base + o1, base + i0, base + i1,
            ]);
        }
        index_count
    }

    /// Circle sampling `uv` (normalized texture coordinates) as if the texture
    /// region were stretched over the circle's bounding square.
    pub fn textured_circle(
        &self,
        sink: &mut dyn VertexSink,
        center: Vec2,
        radius: f32,
        uv: Rect,
        color: Color,
        quality: u32,
    ) -> u32 {
        if !(radius > 0.0) {
            return 0;
        }
        self.disc(sink, center, Vec2::new(radius, radius), uv, color, quality)
    }

    /// Fan around `center`; rim vertex `i` sits at angle `i · TAU / quality`,
    /// counter-clockwise on screen starting at +X. UVs map the same angles onto
    /// the ellipse inscribed in `uv`.
    fn disc(&self, sink: &mut dyn VertexSink, center: Vec2, radii: Vec2, uv: Rect, color: Color, quality: u32) -> u32 {
        let quality = self.clamp(quality);
        let index_count = quality * 3;
        let uv_center = uv.center();
        let uv_radii = uv.size * 0.5;

        let mut region = sink.request(quality + 1, index_count);
        region.vertices[0] = Vertex2D::new(center, uv_center, color);

        let step = TAU / quality as f32;
        for (i, v) in region.vertices[1..].iter_mut().enumerate() {
            let rad = step * i as f32;
            let (c, s) = (rad.cos(), -rad.sin());
            let p = center + Vec2::new(radii.x * c, radii.y * s);
            let t = uv_center + Vec2::new(uv_radii.x * c, uv_radii.y * s);
            *v = Vertex2D::new(p, t, color);
        }

        let base = region.base;
        for (i, tri) in region.indices.chunks_exact_mut(3).enumerate() {
            let i = i as Index;
            let next = if i + 1 == quality { 1 } else { i + 2 };
            tri.copy_from_slice(&[base + i + 1, base, base + next]);
        }
        index_count
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_sink::VecSink;
    use super::*;

    fn enc() -> GeometryEncoder {
        GeometryEncoder::default()
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    // ── ellipse ───────────────────────────────────────────────────────────

    #[test]
    fn ellipse_uses_both_radii() {
        let mut sink = VecSink::default();
        let c = Vec2::new(50.0, 50.0);
        assert_eq!(enc().ellipse(&mut sink, c, 20.0, 10.0, Color::WHITE, 8), 24);
        assert_eq!(sink.vertices.len(), 9);
        assert!(close(sink.vertices[1].position(), Vec2::new(70.0, 50.0)));
        assert!(close(sink.vertices[3].position(), Vec2::new(50.0, 40.0)));
        assert!(close(sink.vertices[5].position(), Vec2::new(30.0, 50.0)));
        assert!(sink.indices_in_range());
    }

    #[test]
    fn flat_ellipse_emits_nothing() {
        let mut sink = VecSink::default();
        assert_eq!(enc().ellipse(&mut sink, Vec2::zero(), 20.0, 0.0, Color::WHITE, 8), 0);
        assert_eq!(enc().ellipse(&mut sink, Vec2::zero(), -1.0, 5.0, Color::WHITE, 8), 0);
        assert_eq!(sink.requests, 0);
    }

    // ── ellipse frame ─────────────────────────────────────────────────────

    #[test]
    fn ellipse_frame_pairs_outer_and_inner() {
        let mut sink = VecSink::default();
        let n = enc().ellipse_frame(&mut sink, Vec2::zero(), 20.0, 10.0, 4.0, Color::WHITE, Color::BLACK, 6);
        assert_eq!(n, 36);
        assert_eq!(sink.vertices.len(), 12);
        assert!(close(sink.vertices[0].position(), Vec2::new(24.0, 0.0)));
        assert!(close(sink.vertices[1].position(), Vec2::new(20.0, 0.0)));
        assert_eq!(sink.vertices[0].color, Color::BLACK.to_array());
        assert_eq!(&sink.indices[30..], &[10, 11, 0, 0, 11, 1]);
    }

    #[test]
    fn ellipse_frame_without_thickness_is_noop() {
        let mut sink = VecSink::default();
        let n = enc().ellipse_frame(&mut sink, Vec2::zero(), 20.0, 10.0, 0.0, Color::WHITE, Color::WHITE, 6);
        assert_eq!(n, 0);
        assert_eq!(sink.requests, 0);
    }

    // ── textured circle ───────────────────────────────────────────────────

    #[test]
    fn textured_circle_maps_rim_onto_uv_region() {
        let mut sink = VecSink::default();
        let uv = Rect::new(0.5, 0.5, 0.5, 0.5);
        assert_eq!(enc().textured_circle(&mut sink, Vec2::zero(), 10.0, uv, Color::WHITE, 8), 24);

        assert_eq!(sink.vertices[0].tex, [0.75, 0.75]);
        let right = sink.vertices[1].tex;
        let top = sink.vertices[3].tex;
        assert!(close(Vec2::new(right[0], right[1]), Vec2::new(1.0, 0.75)));
        assert!(close(Vec2::new(top[0], top[1]), Vec2::new(0.75, 0.5)));
    }

    #[test]
    fn untextured_shapes_keep_uv_at_origin() {
        let mut sink = VecSink::default();
        enc().ellipse(&mut sink, Vec2::zero(), 3.0, 3.0, Color::WHITE, 6);
        assert!(sink.vertices.iter().all(|v| v.tex == [0.0, 0.0]));
    }
}
