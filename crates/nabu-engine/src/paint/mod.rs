//! Color model shared between the application surface and the renderer.

pub mod color;

pub use color::Color;
