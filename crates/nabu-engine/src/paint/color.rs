/// Linear RGBA color, written into vertices as `float4`.
///
/// Channels are straight alpha unless the caller pairs them with
/// [`BlendState::PREMULTIPLIED`](crate::render::BlendState::PREMULTIPLIED),
/// in which case [`premultiplied`](Self::premultiplied) produces the expected form.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from straight RGBA bytes (`0`–`255`).
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Returns the premultiplied form (`rgb * a`).
    #[inline]
    pub fn premultiplied(self) -> Self {
        Self::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_maps_full_range() {
        assert_eq!(Color::from_u8(255, 0, 255, 255), Color::new(1.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn premultiplied_scales_rgb_only() {
        let c = Color::new(1.0, 0.5, 0.25, 0.5).premultiplied();
        assert_eq!(c, Color::new(0.5, 0.25, 0.125, 0.5));
    }
}
