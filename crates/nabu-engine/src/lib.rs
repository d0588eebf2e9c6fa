//! Nabu engine crate.
//!
//! A 2D batch renderer: geometry encoding, render-state tracking, per-frame
//! command batching and flushing through a pluggable graphics device.

pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
