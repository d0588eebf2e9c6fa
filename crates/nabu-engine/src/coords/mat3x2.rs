use core::ops::Mul;

use super::Vec2;

/// 2D affine transform stored as a 3×2 matrix (row-vector convention).
///
/// A point maps as `p' = (x·m11 + y·m21 + m31, x·m12 + y·m22 + m32)`.
/// `a * b` applies `a` first, then `b`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3x2 {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub m31: f32,
    pub m32: f32,
}

impl Default for Mat3x2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3x2 {
    pub const IDENTITY: Mat3x2 = Mat3x2::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    #[inline]
    pub const fn new(m11: f32, m12: f32, m21: f32, m22: f32, m31: f32, m32: f32) -> Self {
        Self { m11, m12, m21, m22, m31, m32 }
    }

    #[inline]
    pub const fn translate(offset: Vec2) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, offset.x, offset.y)
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Clockwise rotation on screen (+Y down) by `angle` radians around the origin.
    #[inline]
    pub fn rotate(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Rotation around `center`.
    #[inline]
    pub fn rotate_at(angle: f32, center: Vec2) -> Self {
        Self::translate(-center) * Self::rotate(angle) * Self::translate(center)
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.m11 + p.y * self.m21 + self.m31,
            p.x * self.m12 + p.y * self.m22 + self.m32,
        )
    }

    /// Largest factor by which this transform stretches any direction.
    ///
    /// Used to pick tessellation quality from the on-screen size of a shape.
    pub fn max_scaling(&self) -> f32 {
        let sx = (self.m11 * self.m11 + self.m12 * self.m12).sqrt();
        let sy = (self.m21 * self.m21 + self.m22 * self.m22).sqrt();
        sx.max(sy)
    }

    /// Packs the matrix for the backend's vertex constants:
    /// `[[m11, m12, m31, m32], [m21, m22, 0, 1]]`.
    #[inline]
    pub fn to_rows(&self) -> [[f32; 4]; 2] {
        [
            [self.m11, self.m12, self.m31, self.m32],
            [self.m21, self.m22, 0.0, 1.0],
        ]
    }
}

impl Mul for Mat3x2 {
    type Output = Mat3x2;

    fn mul(self, rhs: Mat3x2) -> Mat3x2 {
        Mat3x2::new(
            self.m11 * rhs.m11 + self.m12 * rhs.m21,
            self.m11 * rhs.m12 + self.m12 * rhs.m22,
            self.m21 * rhs.m11 + self.m22 * rhs.m21,
            self.m21 * rhs.m12 + self.m22 * rhs.m22,
            self.m31 * rhs.m11 + self.m32 * rhs.m21 + rhs.m31,
            self.m31 * rhs.m12 + self.m32 * rhs.m22 + rhs.m32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn identity_keeps_points() {
        let p = Vec2::new(3.0, -7.0);
        assert_eq!(Mat3x2::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn product_applies_left_first() {
        let m = Mat3x2::scale(2.0, 2.0) * Mat3x2::translate(Vec2::new(10.0, 0.0));
        assert_eq!(m.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));

        let n = Mat3x2::translate(Vec2::new(10.0, 0.0)) * Mat3x2::scale(2.0, 2.0);
        assert_eq!(n.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(22.0, 2.0));
    }

    #[test]
    fn rotate_at_keeps_center_fixed() {
        let c = Vec2::new(50.0, 50.0);
        let m = Mat3x2::rotate_at(1.3, c);
        assert!(approx(m.transform_point(c), c));
    }

    #[test]
    fn quarter_turn_is_clockwise_on_screen() {
        let p = Mat3x2::rotate(core::f32::consts::FRAC_PI_2).transform_point(Vec2::new(1.0, 0.0));
        assert!(approx(p, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn max_scaling_picks_larger_axis() {
        assert_eq!(Mat3x2::scale(2.0, 5.0).max_scaling(), 5.0);
        assert!((Mat3x2::rotate(0.7).max_scaling() - 1.0).abs() < 1e-5);
    }
}
