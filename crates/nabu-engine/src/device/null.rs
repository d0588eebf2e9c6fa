use std::time::Duration;

use crate::render::{Index, Vertex2D};

use super::{DeviceError, FenceHandle, GraphicsDevice, NativeStateDescriptor};

/// Backend that accepts every call and renders nothing.
///
/// Fences are signalled as soon as they are handed out.
#[derive(Debug, Default)]
pub struct NullDevice {
    next_fence: u64,
}

impl NullDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphicsDevice for NullDevice {
    fn upload_buffer(&mut self, _slot: usize, _vertices: &[Vertex2D], _indices: &[Index]) -> Result<(), DeviceError> {
        Ok(())
    }

    fn bind_state(&mut self, _desc: &NativeStateDescriptor) -> Result<(), DeviceError> {
        Ok(())
    }

    fn draw_indexed(&mut self, _index_offset: u32, _index_count: u32, _base_vertex: u32) -> Result<(), DeviceError> {
        Ok(())
    }

    fn get_frame_fence(&mut self, _slot: usize) -> Result<FenceHandle, DeviceError> {
        self.next_fence += 1;
        Ok(FenceHandle(self.next_fence))
    }

    fn wait_fence(&mut self, _fence: FenceHandle, _timeout: Duration) -> Result<(), DeviceError> {
        Ok(())
    }
}
