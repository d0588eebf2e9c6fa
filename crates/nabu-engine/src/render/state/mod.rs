//! Render state value types and the current/pending state tracker.

mod blend;
mod rasterizer;
mod render_state;
mod sampler;
mod tracker;

pub use blend::{BlendFactor, BlendOp, BlendState};
pub use rasterizer::{CullMode, FillMode, RasterizerState};
pub use render_state::RenderState2D;
pub use sampler::{AddressMode, FilterMode, SamplerState, MAX_SAMPLER_SLOTS};
pub use tracker::StateTracker;
