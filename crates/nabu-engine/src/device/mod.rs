//! Graphics device interface consumed by the batch renderer.
//!
//! The renderer never talks to a native graphics API. It uploads one frame's
//! staging buffers, binds state, issues indexed draws and manages buffer-slot
//! fences through [`GraphicsDevice`]. A backend is selected once at startup
//! ([`Backend`]) and held as a single polymorphic instance.

mod descriptor;
mod error;
mod handle;
mod null;
mod recording;
pub mod gpu;

use std::time::Duration;

use anyhow::Result;

use crate::render::{Index, Vertex2D};

pub use descriptor::{NativeStateDescriptor, PsConstants2D, StateChanges, VsConstants2D};
pub use error::DeviceError;
pub use handle::{FenceHandle, ShaderHandle, TextureHandle};
pub use null::NullDevice;
pub use recording::{DeviceCall, RecordingDevice};

/// Capability set the batch renderer needs from a backend.
pub trait GraphicsDevice {
    /// Uploads the complete vertex/index contents of buffer slot `slot` for this frame.
    ///
    /// Subsequent draws read from this slot until the next upload.
    fn upload_buffer(
        &mut self,
        slot: usize,
        vertices: &[Vertex2D],
        indices: &[Index],
    ) -> Result<(), DeviceError>;

    /// Binds the state for the following draws.
    fn bind_state(&mut self, desc: &NativeStateDescriptor) -> Result<(), DeviceError>;

    /// Draws `index_count` indices starting at `index_offset`; index values are
    /// relative to `base_vertex`.
    fn draw_indexed(
        &mut self,
        index_offset: u32,
        index_count: u32,
        base_vertex: u32,
    ) -> Result<(), DeviceError>;

    /// Returns the fence that signals once the GPU has consumed everything
    /// issued from `slot` so far. Deferred backends submit their recorded work here.
    fn get_frame_fence(&mut self, slot: usize) -> Result<FenceHandle, DeviceError>;

    /// Blocks until `fence` has signalled, or fails with
    /// [`DeviceError::FenceTimeout`] after `timeout`.
    fn wait_fence(&mut self, fence: FenceHandle, timeout: Duration) -> Result<(), DeviceError>;
}

impl<D: GraphicsDevice + ?Sized> GraphicsDevice for Box<D> {
    fn upload_buffer(&mut self, slot: usize, vertices: &[Vertex2D], indices: &[Index]) -> Result<(), DeviceError> {
        (**self).upload_buffer(slot, vertices, indices)
    }

    fn bind_state(&mut self, desc: &NativeStateDescriptor) -> Result<(), DeviceError> {
        (**self).bind_state(desc)
    }

    fn draw_indexed(&mut self, index_offset: u32, index_count: u32, base_vertex: u32) -> Result<(), DeviceError> {
        (**self).draw_indexed(index_offset, index_count, base_vertex)
    }

    fn get_frame_fence(&mut self, slot: usize) -> Result<FenceHandle, DeviceError> {
        (**self).get_frame_fence(slot)
    }

    fn wait_fence(&mut self, fence: FenceHandle, timeout: Duration) -> Result<(), DeviceError> {
        (**self).wait_fence(fence, timeout)
    }
}

/// Backend chosen at startup. There is no switching mid-session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Backend {
    /// wgpu (Vulkan / Metal / D3D12 / GL / WebGPU, picked by wgpu).
    Wgpu,
    /// Accepts every call and renders nothing.
    Null,
}

/// Creates the device for `backend`.
///
/// wgpu adapter/device acquisition is asynchronous; callers without an executor
/// can drive this with `pollster::block_on`.
pub async fn create_device(
    backend: Backend,
    init: gpu::WgpuInit,
) -> Result<Box<dyn GraphicsDevice>> {
    let device: Box<dyn GraphicsDevice> = match backend {
        Backend::Wgpu => Box::new(gpu::WgpuDevice::new_headless(init).await?),
        Backend::Null => Box::new(NullDevice::new()),
    };
    log::info!("graphics backend: {backend:?}");
    Ok(device)
}
