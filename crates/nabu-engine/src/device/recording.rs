use std::time::Duration;

use crate::render::{Index, Vertex2D};

use super::{DeviceError, FenceHandle, GraphicsDevice, NativeStateDescriptor};

/// One recorded [`GraphicsDevice`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Upload { slot: usize, vertices: usize, indices: usize },
    Bind(NativeStateDescriptor),
    Draw { index_offset: u32, index_count: u32, base_vertex: u32 },
    Fence { slot: usize, fence: FenceHandle },
    Wait { fence: FenceHandle },
}

/// Device that records every call and can inject failures.
///
/// Intended for tests of code driving the batch renderer without a GPU.
/// Fences signal immediately unless [`stall_fences`](Self::stall_fences) is set.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,

    last_vertices: Vec<Vertex2D>,
    last_indices: Vec<Index>,

    next_fence: u64,
    draws: usize,

    fail_next_upload: bool,
    lose_after_draws: Option<usize>,
    stall_fences: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls since creation.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// `(index_offset, index_count, base_vertex)` of each recorded draw, in order.
    pub fn draws(&self) -> Vec<(u32, u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                DeviceCall::Draw { index_offset, index_count, base_vertex } => {
                    Some((index_offset, index_count, base_vertex))
                }
                _ => None,
            })
            .collect()
    }

    pub fn binds(&self) -> Vec<&NativeStateDescriptor> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Bind(desc) => Some(desc),
                _ => None,
            })
            .collect()
    }

    /// Vertex and index data of the most recent upload.
    pub fn last_upload(&self) -> (&[Vertex2D], &[Index]) {
        (&self.last_vertices, &self.last_indices)
    }

    /// The next upload fails with [`DeviceError::UploadFailed`].
    pub fn fail_next_upload(&mut self) {
        self.fail_next_upload = true;
    }

    /// After `n` more successful draws, every call fails with [`DeviceError::DeviceLost`].
    pub fn lose_device_after_draws(&mut self, n: usize) {
        self.lose_after_draws = Some(self.draws + n);
    }

    /// While set, every fence wait times out.
    pub fn stall_fences(&mut self, stall: bool) {
        self.stall_fences = stall;
    }

    fn check_lost(&self) -> Result<(), DeviceError> {
        match self.lose_after_draws {
            Some(limit) if self.draws >= limit => {
                Err(DeviceError::DeviceLost("injected device loss".into()))
            }
            _ => Ok(()),
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn upload_buffer(&mut self, slot: usize, vertices: &[Vertex2D], indices: &[Index]) -> Result<(), DeviceError> {
        self.check_lost()?;
        if std::mem::take(&mut self.fail_next_upload) {
            return Err(DeviceError::UploadFailed("injected upload failure".into()));
        }

        self.last_vertices.clear();
        self.last_vertices.extend_from_slice(vertices);
        self.last_indices.clear();
        self.last_indices.extend_from_slice(indices);

        self.calls.push(DeviceCall::Upload {
            slot,
            vertices: vertices.len(),
            indices: indices.len(),
        });
        Ok(())
    }

    fn bind_state(&mut self, desc: &NativeStateDescriptor) -> Result<(), DeviceError> {
        self.check_lost()?;
        self.calls.push(DeviceCall::Bind(*desc));
        Ok(())
    }

    fn draw_indexed(&mut self, index_offset: u32, index_count: u32, base_vertex: u32) -> Result<(), DeviceError> {
        self.check_lost()?;
        self.draws += 1;
        self.calls.push(DeviceCall::Draw {
            index_offset,
            index_count,
            base_vertex,
        });
        Ok(())
    }

    fn get_frame_fence(&mut self, slot: usize) -> Result<FenceHandle, DeviceError> {
        self.check_lost()?;
        self.next_fence += 1;
        let fence = FenceHandle(self.next_fence);
        self.calls.push(DeviceCall::Fence { slot, fence });
        Ok(fence)
    }

    fn wait_fence(&mut self, fence: FenceHandle, timeout: Duration) -> Result<(), DeviceError> {
        self.calls.push(DeviceCall::Wait { fence });
        if self.stall_fences {
            return Err(DeviceError::FenceTimeout { fence, waited: timeout });
        }
        Ok(())
    }
}
