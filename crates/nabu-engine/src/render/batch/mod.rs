//! Per-frame staging buffers and the draw command queue.

mod buffer;
mod queue;
mod slots;

pub use buffer::{BatchBuffer, Reservation};
pub use queue::{CommandQueue, DrawCommand};
pub use slots::{FrameSlot, FrameSlots};
