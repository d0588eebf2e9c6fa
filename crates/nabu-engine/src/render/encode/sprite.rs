use crate::render::vertex::{Index, Vertex2D};

use super::{checked_triangles, GeometryEncoder, VertexSink};

impl GeometryEncoder {
    /// Caller-built vertices and triangle indices, copied as they are.
    ///
    /// `indices` are local to `vertices`. A trailing partial triangle is
    /// dropped; an index past the end of `vertices` rejects the whole sprite.
    pub fn sprite(&self, sink: &mut dyn VertexSink, vertices: &[Vertex2D], indices: &[Index]) -> u32 {
        if vertices.is_empty() {
            return 0;
        }
        let Some(indices) = checked_triangles(indices, vertices.len(), "sprite") else {
            return 0;
        };
        if indices.is_empty() {
            return 0;
        }

        let index_count = indices.len() as u32;
        let mut region = sink.request(vertices.len() as u32, index_count);
        region.vertices.copy_from_slice(vertices);
        region.write_indices(indices);
        index_count
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_sink::VecSink;
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color;

    fn corner(x: f32, y: f32) -> Vertex2D {
        Vertex2D::new(Vec2::new(x, y), Vec2::new(x / 10.0, y / 10.0), Color::WHITE)
    }

    #[test]
    fn sprite_copies_vertices_and_offsets_indices() {
        let mut sink = VecSink::default();
        let enc = GeometryEncoder::default();
        enc.triangle(&mut sink, [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)], Color::WHITE);

        let verts = [corner(0.0, 0.0), corner(10.0, 0.0), corner(0.0, 10.0), corner(10.0, 10.0)];
        assert_eq!(enc.sprite(&mut sink, &verts, &[0, 1, 2, 2, 1, 3, 0]), 6);
        assert_eq!(&sink.vertices[3..], &verts);
        assert_eq!(&sink.indices[3..], &[3, 4, 5, 5, 4, 6]);
    }

    #[test]
    fn out_of_range_index_rejects_sprite() {
        let mut sink = VecSink::default();
        let verts = [corner(0.0, 0.0), corner(10.0, 0.0), corner(0.0, 10.0)];
        assert_eq!(GeometryEncoder::default().sprite(&mut sink, &verts, &[0, 1, 7]), 0);
        assert_eq!(sink.requests, 0);
    }

    #[test]
    fn sprite_without_whole_triangle_is_noop() {
        let mut sink = VecSink::default();
        let verts = [corner(0.0, 0.0), corner(10.0, 0.0)];
        assert_eq!(GeometryEncoder::default().sprite(&mut sink, &verts, &[0, 1]), 0);
        assert_eq!(GeometryEncoder::default().sprite(&mut sink, &[], &[0, 1, 2]), 0);
        assert_eq!(sink.requests, 0);
    }
}
