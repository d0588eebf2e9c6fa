//! 2D batch renderer.
//!
//! Draw calls are encoded into per-frame staging buffers and grouped into draw
//! commands, one per maximal run of identical [`RenderState2D`]. At the end of
//! the frame the [`Flusher`] uploads the buffers once and issues one native
//! draw per command through a [`GraphicsDevice`](crate::device::GraphicsDevice).
//!
//! Convention:
//! - Geometry is in pixels (top-left origin, +Y down).
//! - The backend maps viewport pixels to clip space.

pub mod batch;
mod config;
mod ctx;
pub mod encode;
mod flush;
mod guard;
pub mod state;
mod vertex;

pub use config::Renderer2DConfig;
pub use ctx::RenderContext2D;
pub use encode::{GeometryEncoder, Glyph, LineCap};
pub use flush::{FrameStats, FrameStatus, Flusher};
pub use guard::ScopedState;
pub use state::{
    AddressMode, BlendFactor, BlendOp, BlendState, CullMode, FillMode, FilterMode, RasterizerState,
    RenderState2D, SamplerState, StateTracker, MAX_SAMPLER_SLOTS,
};
pub use vertex::{Index, Vertex2D};
