//! Coordinate and geometry types shared across the batch renderer.
//!
//! Canonical CPU space:
//! - Pixels of the active viewport
//! - Origin top-left
//! - +X right, +Y down
//!
//! The backend converts to clip space in its vertex stage using the viewport size.

mod irect;
mod mat3x2;
mod rect;
mod vec2;

pub use irect::IRect;
pub use mat3x2::Mat3x2;
pub use rect::Rect;
pub use vec2::Vec2;
