use core::f32::consts::PI;

use crate::coords::Vec2;
use crate::paint::Color;
use crate::render::vertex::{Index, Vertex2D};

use super::{quality, GeometryEncoder, VertexSink, RECT_INDICES};

/// Segment count used for bezier curves when the caller does not pick one.
pub const DEFAULT_CURVE_QUALITY: u32 = 24;

/// Miter length limit, in multiples of half the thickness.
const MITER_LIMIT: f32 = 4.0;

/// End treatment of open lines.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LineCap {
    /// Ends exactly at the endpoints.
    #[default]
    Flat,
    /// Extends past each endpoint by half the thickness.
    Square,
    /// Half-disc past each endpoint.
    Round,
}

/// Samples a quadratic bezier at `quality + 2` evenly spaced parameters,
/// endpoints included.
pub fn sample_quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, quality: u32) -> Vec<Vec2> {
    let steps = quality + 1;
    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let u = 1.0 - t;
            p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
        })
        .collect()
}

/// Samples a cubic bezier at `quality + 2` evenly spaced parameters,
/// endpoints included.
pub fn sample_cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, quality: u32) -> Vec<Vec2> {
    let steps = quality + 1;
    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let u = 1.0 - t;
            p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
        })
        .collect()
}

impl GeometryEncoder {
    /// Thick segment from `begin` to `end`, colors interpolated along it.
    ///
    /// `cap_quality` is the segment count of each round cap (see
    /// [`cap_quality`](Self::cap_quality)); other caps ignore it. A zero-length
    /// segment emits nothing.
    pub fn line(
        &self,
        sink: &mut dyn VertexSink,
        begin: Vec2,
        end: Vec2,
        thickness: f32,
        colors: [Color; 2],
        cap: LineCap,
        cap_quality: u32,
    ) -> u32 {
        if !(thickness > 0.0) {
            return 0;
        }
        let dir = (end - begin).normalized();
        if dir == Vec2::zero() {
            return 0;
        }

        let half = thickness * 0.5;
        let (b, e) = match cap {
            LineCap::Square => (begin - dir * half, end + dir * half),
            _ => (begin, end),
        };
        let n = dir.perp() * half;

        let mut written = {
            let mut region = sink.request(4, 6);
            let pts = [(b + n, colors[0]), (b - n, colors[0]), (e + n, colors[1]), (e - n, colors[1])];
            for (v, (p, c)) in region.vertices.iter_mut().zip(pts) {
                *v = Vertex2D::shape(p, c);
            }
            region.write_indices(&RECT_INDICES);
            6
        };

        if cap == LineCap::Round {
            written += self.round_cap(sink, begin, dir.perp(), half, colors[0], cap_quality);
            written += self.round_cap(sink, end, -dir.perp(), half, colors[1], cap_quality);
        }
        written
    }

    /// Half-disc at `center` starting at `normal` and sweeping away from the line body.
    fn round_cap(
        &self,
        sink: &mut dyn VertexSink,
        center: Vec2,
        normal: Vec2,
        half: f32,
        color: Color,
        segments: u32,
    ) -> u32 {
        self.fan(sink, center, half, normal.y.atan2(normal.x), PI, segments, color)
    }

    /// Automatic segment count for a round cap of half-thickness `half` drawn at `scale`.
    #[inline]
    pub fn cap_quality(&self, half: f32, scale: f32) -> u32 {
        self.clamp(quality::round_cap(half.abs() * scale))
    }

    /// Thick line strip through `points` with mitered joins.
    ///
    /// Consecutive duplicate points are skipped. When `closed` is set and at
    /// least three distinct points remain, the last point joins the first and
    /// `cap` is ignored.
    pub fn polyline(
        &self,
        sink: &mut dyn VertexSink,
        points: &[Vec2],
        thickness: f32,
        color: Color,
        closed: bool,
        cap: LineCap,
        cap_quality: u32,
    ) -> u32 {
        if !(thickness > 0.0) {
            return 0;
        }

        let mut pts: Vec<Vec2> = Vec::with_capacity(points.len());
        for &p in points {
            if pts.last() != Some(&p) {
                pts.push(p);
            }
        }
        if closed && pts.len() > 1 && pts.first() == pts.last() {
            pts.pop();
        }
        if pts.len() < 2 {
            return 0;
        }
        if pts.len() == 2 {
            return self.line(sink, pts[0], pts[1], thickness, [color; 2], cap, cap_quality);
        }

        let closed = closed && pts.len() >= 3;
        let half = thickness * 0.5;
        let n = pts.len();
        let last = n - 1;

        if !closed && cap == LineCap::Square {
            let d0 = (pts[1] - pts[0]).normalized();
            let d1 = (pts[last] - pts[last - 1]).normalized();
            pts[0] -= d0 * half;
            pts[last] += d1 * half;
        }

        let segments = (if closed { n } else { n - 1 }) as u32;
        let index_count = segments * 6;

        let mut region = sink.request(n as u32 * 2, index_count);
        for (i, pair) in region.vertices.chunks_exact_mut(2).enumerate() {
            let prev = if i > 0 { Some(pts[i - 1]) } else if closed { Some(pts[last]) } else { None };
            let next = if i < last { Some(pts[i + 1]) } else if closed { Some(pts[0]) } else { None };
            let offset = join_offset(prev, pts[i], next, half);
            pair[0] = Vertex2D::shape(pts[i] + offset, color);
            pair[1] = Vertex2D::shape(pts[i] - offset, color);
        }

        let base = region.base;
        let wrap = n as Index * 2;
        for (s, quad) in region.indices.chunks_exact_mut(6).enumerate() {
            let a = s as Index * 2;
            let b = (a + 2) % wrap;
            quad.copy_from_slice(&[
                base + a, base + a + 1, base + b,
                base + b, base + a + 1, base + b + 1,
            ]);
        }

        let mut written = index_count;
        if !closed && cap == LineCap::Round {
            let d0 = (pts[1] - pts[0]).normalized();
            let d1 = (pts[last] - pts[last - 1]).normalized();
            written += self.round_cap(sink, pts[0], d0.perp(), half, color, cap_quality);
            written += self.round_cap(sink, pts[last], -d1.perp(), half, color, cap_quality);
        }
        written
    }

    /// Quadratic bezier sampled at `quality + 2` points and stroked as a polyline.
    pub fn quadratic_bezier(
        &self,
        sink: &mut dyn VertexSink,
        control: [Vec2; 3],
        thickness: f32,
        color: Color,
        quality: u32,
    ) -> u32 {
        if !(thickness > 0.0) {
            return 0;
        }
        let [p0, p1, p2] = control;
        let pts = sample_quadratic_bezier(p0, p1, p2, quality.min(self.max_quality()));
        self.polyline(sink, &pts, thickness, color, false, LineCap::Flat, 0)
    }

    /// Cubic bezier sampled at `quality + 2` points and stroked as a polyline.
    pub fn cubic_bezier(
        &self,
        sink: &mut dyn VertexSink,
        control: [Vec2; 4],
        thickness: f32,
        color: Color,
        quality: u32,
    ) -> u32 {
        if !(thickness > 0.0) {
            return 0;
        }
        let [p0, p1, p2, p3] = control;
        let pts = sample_cubic_bezier(p0, p1, p2, p3, quality.min(self.max_quality()));
        self.polyline(sink, &pts, thickness, color, false, LineCap::Flat, 0)
    }
}

/// Offset from `at` to the left edge of the stroke, mitered against its neighbours.
fn join_offset(prev: Option<Vec2>, at: Vec2, next: Option<Vec2>, half: f32) -> Vec2 {
    let n_in = prev.map(|p| (at - p).normalized().perp());
    let n_out = next.map(|p| (p - at).normalized().perp());

    match (n_in, n_out) {
        (Some(a), Some(b)) => {
            let miter = (a + b).normalized();
            let cos = miter.dot(a);
            if miter == Vec2::zero() || cos.abs() < 1e-4 {
                return a * half;
            }
            let len = (half / cos).min(half * MITER_LIMIT);
            miter * len
        }
        (Some(a), None) | (None, Some(a)) => a * half,
        (None, None) => Vec2::zero(),
    }
}
