use crate::coords::{IRect, Mat3x2};
use crate::device::{ShaderHandle, TextureHandle};
use crate::paint::Color;

use super::{BlendState, RasterizerState, SamplerState, MAX_SAMPLER_SLOTS};

/// Aggregate render state a batch is recorded under.
///
/// Compared by structural equality; equal states may share a draw call.
/// Float fields compare with IEEE semantics, so a NaN transform or color never
/// equals anything and always forces a new batch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderState2D {
    pub blend: BlendState,
    pub rasterizer: RasterizerState,
    pub samplers: [SamplerState; MAX_SAMPLER_SLOTS],
    /// Texture bound to slot 0. `None` binds the backend's white texture.
    pub texture: Option<TextureHandle>,
    pub local_transform: Mat3x2,
    pub camera_transform: Mat3x2,
    pub color_mul: Color,
    pub color_add: Color,
    /// Honored only while `rasterizer.scissor_enable` is set.
    pub scissor_rect: Option<IRect>,
    /// `None` draws into the device's default target.
    pub render_target: Option<TextureHandle>,
    /// `None` covers the whole current render target.
    pub viewport: Option<IRect>,
    /// `None` selects the backend's standard 2D program.
    pub shader_program: Option<ShaderHandle>,
}

impl Default for RenderState2D {
    fn default() -> Self {
        Self {
            blend: BlendState::DEFAULT,
            rasterizer: RasterizerState::DEFAULT_2D,
            samplers: [SamplerState::DEFAULT_2D; MAX_SAMPLER_SLOTS],
            texture: None,
            local_transform: Mat3x2::IDENTITY,
            camera_transform: Mat3x2::IDENTITY,
            color_mul: Color::WHITE,
            color_add: Color::TRANSPARENT,
            scissor_rect: None,
            render_target: None,
            viewport: None,
            shader_program: None,
        }
    }
}

impl RenderState2D {
    /// Combined vertex transform (local first, then camera).
    #[inline]
    pub fn combined_transform(&self) -> Mat3x2 {
        self.local_transform * self.camera_transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_white_mul_zero_add() {
        let s = RenderState2D::default();
        assert_eq!(s.color_mul, Color::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(s.color_add, Color::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(s.blend, BlendState::DEFAULT);
        assert_eq!(s.rasterizer, RasterizerState::DEFAULT_2D);
    }

    #[test]
    fn nan_state_never_equals_itself() {
        let mut s = RenderState2D::default();
        s.color_mul.r = f32::NAN;
        assert_ne!(s, s);
    }
}
