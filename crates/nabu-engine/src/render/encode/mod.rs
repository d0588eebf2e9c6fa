//! Geometry encoder: turns drawing primitives into [`Vertex2D`] + triangle indices.
//!
//! Every encoder writes through a [`VertexSink`], asking for the exact region it
//! needs and filling it completely. Degenerate input (non-positive radius or
//! thickness, empty glyph runs, out-of-range caller indices) returns `0`
//! without touching the sink, so it never opens a draw command. Non-finite
//! coordinates are not checked and propagate into the vertices.
//!
//! Every encoder returns the number of indices it wrote.

mod curves;
mod ellipse;
pub mod quality;
mod shapes;
mod sprite;
mod text;

use crate::coords::Vec2;
use crate::paint::Color;

use super::vertex::{Index, Vertex2D};

pub use curves::{sample_cubic_bezier, sample_quadratic_bezier, LineCap, DEFAULT_CURVE_QUALITY};
pub use text::Glyph;

/// Two triangles over corners in `[top-left, top-right, bottom-left, bottom-right]` order.
pub(crate) const RECT_INDICES: [Index; 6] = [0, 1, 2, 2, 1, 3];

/// Two triangles over corners in perimeter order.
pub(crate) const QUAD_INDICES: [Index; 6] = [0, 1, 2, 0, 2, 3];

/// Whole triangles of caller-supplied `indices`, or `None` if one of them
/// points past `vertex_count`. A trailing partial triangle is dropped.
pub(crate) fn checked_triangles<'a>(indices: &'a [Index], vertex_count: usize, what: &str) -> Option<&'a [Index]> {
    let whole = &indices[..indices.len() - indices.len() % 3];
    if let Some(&bad) = whole.iter().find(|&&i| i as usize >= vertex_count) {
        log::warn!("{what}: index {bad} out of range for {vertex_count} vertices, draw skipped");
        return None;
    }
    Some(whole)
}

/// Mutable region handed to an encoder.
///
/// Index values must be written relative to the start of the enclosing draw
/// command, i.e. `base + local_vertex_index`.
pub struct WriteRegion<'a> {
    pub vertices: &'a mut [Vertex2D],
    pub indices: &'a mut [Index],
    pub base: Index,
}

impl WriteRegion<'_> {
    /// Writes `table` (local indices) into the region, offset by `base`.
    #[inline]
    pub(crate) fn write_indices(&mut self, table: &[Index]) {
        for (dst, &i) in self.indices.iter_mut().zip(table) {
            *dst = self.base + i;
        }
    }
}

/// Destination for encoded geometry.
///
/// Implementations decide which draw command the region belongs to before
/// handing it out, so the returned region is always attributed to a command
/// whose state matches the state active at encode time.
pub trait VertexSink {
    /// Reserves exactly `vertex_count` vertices and `index_count` indices.
    ///
    /// Never fails: capacity exhaustion is handled by growing storage.
    fn request(&mut self, vertex_count: u32, index_count: u32) -> WriteRegion<'_>;
}

/// Converts primitives to vertices/indices.
///
/// Stateless apart from the quality ceiling applied to curved shapes.
#[derive(Debug, Copy, Clone)]
pub struct GeometryEncoder {
    max_quality: u32,
}

impl Default for GeometryEncoder {
    fn default() -> Self {
        Self::new(quality::MAX_QUALITY)
    }
}

impl GeometryEncoder {
    pub fn new(max_quality: u32) -> Self {
        Self {
            max_quality: quality::clamp_quality(max_quality, quality::MAX_QUALITY),
        }
    }

    #[inline]
    pub fn max_quality(&self) -> u32 {
        self.max_quality
    }

    #[inline]
    pub(crate) fn clamp(&self, quality: u32) -> u32 {
        quality::clamp_quality(quality, self.max_quality)
    }

    /// Quad with per-corner UVs; `corners` in perimeter order (either winding).
    /// 4 vertices, 6 indices.
    pub fn quad(&self, sink: &mut dyn VertexSink, corners: [Vec2; 4], uvs: [Vec2; 4], color: Color) -> u32 {
        let mut region = sink.request(4, 6);
        for ((v, p), uv) in region.vertices.iter_mut().zip(corners).zip(uvs) {
            *v = Vertex2D::new(p, uv, color);
        }
        region.write_indices(&QUAD_INDICES);
        6
    }

    pub fn triangle(&self, sink: &mut dyn VertexSink, points: [Vec2; 3], color: Color) -> u32 {
        let mut region = sink.request(3, 3);
        for (v, p) in region.vertices.iter_mut().zip(points) {
            *v = Vertex2D::shape(p, color);
        }
        region.write_indices(&[0, 1, 2]);
        3
    }
}

#[cfg(test)]
pub(crate) mod test_sink {
    use super::*;

    /// Sink that appends into plain vectors; the base is the running vertex count.
    #[derive(Default)]
    pub(crate) struct VecSink {
        pub vertices: Vec<Vertex2D>,
        pub indices: Vec<Index>,
        pub requests: usize,
    }

    impl VertexSink for VecSink {
        fn request(&mut self, vertex_count: u32, index_count: u32) -> WriteRegion<'_> {
            self.requests += 1;
            let v0 = self.vertices.len();
            let i0 = self.indices.len();
            self.vertices.resize(v0 + vertex_count as usize, Vertex2D::default());
            self.indices.resize(i0 + index_count as usize, 0);
            WriteRegion {
                vertices: &mut self.vertices[v0..],
                indices: &mut self.indices[i0..],
                base: v0 as Index,
            }
        }
    }

    impl VecSink {
        /// Every index points at a written vertex.
        pub(crate) fn indices_in_range(&self) -> bool {
            self.indices.iter().all(|&i| (i as usize) < self.vertices.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_sink::VecSink;
    use super::*;

    #[test]
    fn quad_emits_four_vertices_six_indices() {
        let mut sink = VecSink::default();
        let corners = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0), Vec2::new(0.0, 10.0)];
        let uvs = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        let n = GeometryEncoder::default().quad(&mut sink, corners, uvs, Color::WHITE);

        assert_eq!(n, 6);
        assert_eq!(sink.vertices.len(), 4);
        assert_eq!(sink.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(sink.vertices[2].tex, [1.0, 1.0]);
    }

    #[test]
    fn indices_are_offset_by_base() {
        let mut sink = VecSink::default();
        let enc = GeometryEncoder::default();
        let pts = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        enc.triangle(&mut sink, pts, Color::WHITE);
        enc.triangle(&mut sink, pts, Color::WHITE);
        assert_eq!(sink.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn nan_input_propagates_silently() {
        let mut sink = VecSink::default();
        let nan = Vec2::new(f32::NAN, 0.0);
        let n = GeometryEncoder::default().quad(&mut sink, [nan; 4], [Vec2::zero(); 4], Color::WHITE);
        assert_eq!(n, 6);
        assert!(sink.vertices[0].pos[0].is_nan());
    }

    #[test]
    fn max_quality_is_clamped() {
        assert_eq!(GeometryEncoder::new(1).max_quality(), quality::MIN_QUALITY);
        assert_eq!(GeometryEncoder::new(10_000).max_quality(), quality::MAX_QUALITY);
    }
}
