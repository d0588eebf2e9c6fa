use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use crate::render::RenderState2D;

bitflags! {
    /// Parts of the render state that differ from what the device has bound.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct StateChanges: u16 {
        const BLEND         = 1 << 0;
        const RASTERIZER    = 1 << 1;
        const SAMPLERS      = 1 << 2;
        const TEXTURE       = 1 << 3;
        const SCISSOR       = 1 << 4;
        const RENDER_TARGET = 1 << 5;
        const VIEWPORT      = 1 << 6;
        const SHADER        = 1 << 7;
        const VS_CONSTANTS  = 1 << 8;
        const PS_CONSTANTS  = 1 << 9;
    }
}

impl StateChanges {
    /// Computes the change set needed to go from `from` to `to`.
    ///
    /// `from == None` (nothing bound yet) yields every flag.
    pub fn between(from: Option<&RenderState2D>, to: &RenderState2D) -> Self {
        let Some(from) = from else {
            return Self::all();
        };

        let mut changes = Self::empty();
        changes.set(Self::BLEND, from.blend != to.blend);
        changes.set(Self::RASTERIZER, from.rasterizer != to.rasterizer);
        changes.set(Self::SAMPLERS, from.samplers != to.samplers);
        changes.set(Self::TEXTURE, from.texture != to.texture);
        changes.set(Self::SCISSOR, from.scissor_rect != to.scissor_rect);
        changes.set(Self::RENDER_TARGET, from.render_target != to.render_target);
        changes.set(Self::VIEWPORT, from.viewport != to.viewport);
        changes.set(Self::SHADER, from.shader_program != to.shader_program);
        changes.set(
            Self::VS_CONSTANTS,
            VsConstants2D::from_state(from) != VsConstants2D::from_state(to),
        );
        changes.set(
            Self::PS_CONSTANTS,
            PsConstants2D::from_state(from) != PsConstants2D::from_state(to),
        );
        changes
    }
}

/// Vertex-stage constants derived from the transform and color multiply.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VsConstants2D {
    /// `local · camera`, packed by [`Mat3x2::to_rows`](crate::coords::Mat3x2::to_rows).
    pub transform: [[f32; 4]; 2],
    pub color_mul: [f32; 4],
}

impl VsConstants2D {
    pub fn from_state(state: &RenderState2D) -> Self {
        Self {
            transform: state.combined_transform().to_rows(),
            color_mul: state.color_mul.to_array(),
        }
    }
}

/// Fragment-stage constants.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PsConstants2D {
    pub color_add: [f32; 4],
}

impl PsConstants2D {
    pub fn from_state(state: &RenderState2D) -> Self {
        Self {
            color_add: state.color_add.to_array(),
        }
    }
}

/// Everything a backend needs to bind the state of one draw command.
///
/// `state` is always complete; `changes` tells the backend which parts differ
/// from the previous bind so it can skip redundant native calls.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NativeStateDescriptor {
    pub state: RenderState2D,
    pub changes: StateChanges,
    pub vs_constants: VsConstants2D,
    pub ps_constants: PsConstants2D,
}

impl NativeStateDescriptor {
    pub fn new(state: RenderState2D, changes: StateChanges) -> Self {
        Self {
            vs_constants: VsConstants2D::from_state(&state),
            ps_constants: PsConstants2D::from_state(&state),
            state,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Mat3x2, Vec2};
    use crate::paint::Color;
    use crate::render::BlendState;

    #[test]
    fn nothing_bound_means_everything_changes() {
        assert_eq!(StateChanges::between(None, &RenderState2D::default()), StateChanges::all());
    }

    #[test]
    fn single_field_change_is_isolated() {
        let a = RenderState2D::default();
        let mut b = a;
        b.blend = BlendState::ADDITIVE;
        assert_eq!(StateChanges::between(Some(&a), &b), StateChanges::BLEND);
    }

    #[test]
    fn transform_change_touches_vs_constants_only() {
        let a = RenderState2D::default();
        let mut b = a;
        b.local_transform = Mat3x2::translate(Vec2::new(5.0, 0.0));
        assert_eq!(StateChanges::between(Some(&a), &b), StateChanges::VS_CONSTANTS);
    }

    #[test]
    fn color_add_change_touches_ps_constants_only() {
        let a = RenderState2D::default();
        let mut b = a;
        b.color_add = Color::new(0.1, 0.0, 0.0, 0.0);
        assert_eq!(StateChanges::between(Some(&a), &b), StateChanges::PS_CONSTANTS);
    }

    #[test]
    fn vs_constants_pack_combined_transform() {
        let mut s = RenderState2D::default();
        s.local_transform = Mat3x2::scale(2.0, 3.0);
        s.camera_transform = Mat3x2::translate(Vec2::new(10.0, 20.0));
        let c = VsConstants2D::from_state(&s);
        assert_eq!(c.transform, [[2.0, 0.0, 10.0, 20.0], [0.0, 3.0, 0.0, 1.0]]);
    }
}
