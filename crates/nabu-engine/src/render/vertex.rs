use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

/// Standard 2D vertex: position, texture coordinate, color.
///
/// Layout is fixed (`8 + 8 + 16 = 32` bytes) and uploaded to the backend as-is.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex2D {
    pub pos: [f32; 2],
    pub tex: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2D {
    #[inline]
    pub fn new(pos: Vec2, tex: Vec2, color: Color) -> Self {
        Self {
            pos: pos.to_array(),
            tex: tex.to_array(),
            color: color.to_array(),
        }
    }

    /// Untextured vertex; UV is left at the origin.
    #[inline]
    pub fn shape(pos: Vec2, color: Color) -> Self {
        Self::new(pos, Vec2::zero(), color)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.pos[0], self.pos[1])
    }
}

/// Index type used by the batch buffers.
pub type Index = u32;
