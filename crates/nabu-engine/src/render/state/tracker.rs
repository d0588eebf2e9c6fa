use crate::coords::{IRect, Mat3x2};
use crate::device::{ShaderHandle, TextureHandle};
use crate::paint::Color;

use super::{BlendState, RasterizerState, RenderState2D, SamplerState};

/// Current vs. pending render state.
///
/// `current` is the state recorded into the most recently opened draw command.
/// `pending` is what the application has requested since. Setters only touch
/// `pending`; [`commit`](Self::commit) publishes it when a command is opened.
///
/// Batch continuation is decided by full structural equality, so setting a
/// field and then restoring it before drawing does not break the batch.
#[derive(Debug, Default, Clone)]
pub struct StateTracker {
    current: RenderState2D,
    pending: RenderState2D,
}

macro_rules! pending_setter {
    ($(#[$doc:meta])* $name:ident, $field:ident: $ty:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, value: $ty) -> $ty {
            core::mem::replace(&mut self.pending.$field, value)
        }
    };
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> &RenderState2D {
        &self.current
    }

    #[inline]
    pub fn pending(&self) -> &RenderState2D {
        &self.pending
    }

    pending_setter!(
        /// Sets the pending blend state; returns the previous pending value.
        set_blend_state, blend: BlendState
    );
    pending_setter!(set_rasterizer_state, rasterizer: RasterizerState);
    pending_setter!(set_texture, texture: Option<TextureHandle>);
    pending_setter!(set_local_transform, local_transform: Mat3x2);
    pending_setter!(set_camera_transform, camera_transform: Mat3x2);
    pending_setter!(set_color_mul, color_mul: Color);
    pending_setter!(set_color_add, color_add: Color);
    pending_setter!(set_scissor_rect, scissor_rect: Option<IRect>);
    pending_setter!(set_render_target, render_target: Option<TextureHandle>);
    pending_setter!(set_viewport, viewport: Option<IRect>);
    pending_setter!(set_shader_program, shader_program: Option<ShaderHandle>);

    /// Sets the sampler for `slot`; returns the previous pending value.
    ///
    /// # Panics
    /// Panics if `slot >= MAX_SAMPLER_SLOTS`.
    #[inline]
    pub fn set_sampler_state(&mut self, slot: usize, value: SamplerState) -> SamplerState {
        core::mem::replace(&mut self.pending.samplers[slot], value)
    }

    /// Returns every pending field to its default; returns the previous pending state.
    #[inline]
    pub fn reset_pending(&mut self) -> RenderState2D {
        core::mem::take(&mut self.pending)
    }

    /// True iff the pending state differs from the current state.
    #[inline]
    pub fn needs_break(&self) -> bool {
        self.pending != self.current
    }

    /// Publishes the pending state and returns the committed snapshot.
    #[inline]
    pub fn commit(&mut self) -> RenderState2D {
        self.current = self.pending;
        self.current
    }
}
