//! Opaque handles for resources owned by a [`GraphicsDevice`](super::GraphicsDevice).
//!
//! The batch renderer only stores and compares these; it never dereferences them.

/// Texture produced by an external collaborator (asset loader, render target creation).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Shader program produced by an external collaborator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u32);

/// GPU completion signal for the work submitted from one buffer slot.
///
/// Values are monotonically increasing per device; a larger fence completes later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FenceHandle(pub u64);

impl core::fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

impl core::fmt::Display for ShaderHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "shader#{}", self.0)
    }
}

impl core::fmt::Display for FenceHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "fence#{}", self.0)
    }
}
