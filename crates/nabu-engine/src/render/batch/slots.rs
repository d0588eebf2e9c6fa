use std::time::{Duration, Instant};

use crate::device::{DeviceError, FenceHandle, GraphicsDevice};

use super::BatchBuffer;

/// One in-flight frame's staging buffers plus the fence guarding their reuse.
#[derive(Debug)]
pub struct FrameSlot {
    pub buffer: BatchBuffer,
    /// Signalled when the GPU has finished reading this slot's last upload.
    pub fence: Option<FenceHandle>,
}

/// Ring of `N` buffer slots indexed by `frame_index % N`.
///
/// The CPU writes slot `k` for frame `n` only after the fence recorded for the
/// frame that last used slot `k` has signalled.
#[derive(Debug)]
pub struct FrameSlots {
    slots: Vec<FrameSlot>,
}

impl FrameSlots {
    pub fn new(count: usize, vertex_capacity: usize, index_capacity: usize) -> Self {
        let slots = (0..count.max(1))
            .map(|_| FrameSlot {
                buffer: BatchBuffer::with_capacity(vertex_capacity, index_capacity),
                fence: None,
            })
            .collect();
        Self { slots }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn index_for(&self, frame_index: u64) -> usize {
        (frame_index % self.slots.len() as u64) as usize
    }

    #[inline]
    pub fn get(&self, slot: usize) -> &FrameSlot {
        &self.slots[slot]
    }

    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> &mut FrameSlot {
        &mut self.slots[slot]
    }

    /// Waits for `slot`'s fence and resets its buffer for writing.
    ///
    /// This is the only blocking point of the batch renderer. A wait that does
    /// not complete within `timeout` is reported as [`DeviceError::FenceTimeout`].
    pub fn acquire<D: GraphicsDevice + ?Sized>(
        &mut self,
        slot: usize,
        device: &mut D,
        timeout: Duration,
    ) -> Result<&mut BatchBuffer, DeviceError> {
        let entry = &mut self.slots[slot];
        if let Some(fence) = entry.fence.take() {
            let started = Instant::now();
            device.wait_fence(fence, timeout)?;
            log::trace!("slot {slot}: {fence} signalled after {:?}", started.elapsed());
        }
        entry.buffer.reset();
        Ok(&mut entry.buffer)
    }
}
