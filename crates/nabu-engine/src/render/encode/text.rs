use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::render::vertex::{Index, Vertex2D};

use super::{GeometryEncoder, VertexSink, RECT_INDICES};

/// One pre-rasterized glyph: where it lands relative to the run origin and
/// which atlas region (normalized UVs) it samples.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Glyph {
    pub rect: Rect,
    pub uv: Rect,
}

impl Glyph {
    #[inline]
    pub const fn new(rect: Rect, uv: Rect) -> Self {
        Self { rect, uv }
    }
}

impl GeometryEncoder {
    /// One textured quad per glyph, written in a single reservation.
    ///
    /// Glyphs with an empty rect (spaces) are skipped; a run with nothing
    /// visible emits nothing.
    pub fn glyph_run(&self, sink: &mut dyn VertexSink, origin: Vec2, glyphs: &[Glyph], color: Color) -> u32 {
        let visible = glyphs.iter().filter(|g| !g.rect.is_empty()).count() as u32;
        if visible == 0 {
            return 0;
        }

        let index_count = visible * 6;
        let mut region = sink.request(visible * 4, index_count);
        let base = region.base;

        let quads = region
            .vertices
            .chunks_exact_mut(4)
            .zip(region.indices.chunks_exact_mut(6));
        let mut local: Index = 0;
        for ((verts, idx), glyph) in quads.zip(glyphs.iter().filter(|g| !g.rect.is_empty())) {
            let rect = glyph.rect.offset(origin);
            for ((v, p), t) in verts.iter_mut().zip(rect.corners()).zip(glyph.uv.corners()) {
                *v = Vertex2D::new(p, t, color);
            }
            for (dst, &i) in idx.iter_mut().zip(&RECT_INDICES) {
                *dst = base + local + i;
            }
            local += 4;
        }
        index_count
    }
}
