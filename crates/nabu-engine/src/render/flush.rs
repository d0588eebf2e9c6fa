use crate::device::{DeviceError, FenceHandle, GraphicsDevice, NativeStateDescriptor, StateChanges};

use super::batch::{CommandQueue, DrawCommand, FrameSlot};
use super::state::RenderState2D;

/// Counters for one flushed frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw commands drained from the queue.
    pub commands: usize,
    /// Native draw calls actually issued.
    pub draw_calls: usize,
    /// `bind_state` calls issued.
    pub state_binds: usize,
    pub vertices: u32,
    pub indices: u32,
    /// Staging buffer reallocations during the frame.
    pub buffer_grows: u32,
}

/// Outcome of a frame, returned to the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameStatus {
    Completed(FrameStats),
    /// The device failed mid-frame. Commands not yet drawn were dropped; the
    /// caller should recreate the device before the next frame.
    Failed {
        error: DeviceError,
        stats: FrameStats,
        dropped_commands: usize,
    },
}

impl FrameStatus {
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, FrameStatus::Completed(_))
    }

    #[inline]
    pub fn stats(&self) -> &FrameStats {
        match self {
            FrameStatus::Completed(stats) | FrameStatus::Failed { stats, .. } => stats,
        }
    }

    #[inline]
    pub fn error(&self) -> Option<&DeviceError> {
        match self {
            FrameStatus::Completed(_) => None,
            FrameStatus::Failed { error, .. } => Some(error),
        }
    }
}

/// Turns a frame's drained commands into device calls.
///
/// One bulk upload per frame, then for each command a bind of whatever state
/// differs from the previous command followed by exactly one indexed draw.
/// Finally the slot's fence is requested so the next writer of the slot can
/// wait on it.
#[derive(Debug, Default)]
pub struct Flusher {
    frames: u64,
}

impl Flusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flushes `queue` from `slot`, then resets both for reuse.
    ///
    /// On success the slot's fence is replaced by the one guarding this upload;
    /// on failure it is cleared, since a failed device has nothing left to wait on.
    pub fn flush<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        slot_index: usize,
        slot: &mut FrameSlot,
        queue: &mut CommandQueue,
    ) -> FrameStatus {
        self.frames += 1;

        let mut stats = FrameStats {
            vertices: slot.buffer.vertex_len(),
            indices: slot.buffer.index_len(),
            buffer_grows: slot.buffer.grow_events(),
            ..FrameStats::default()
        };

        let result = {
            let mut commands = queue.drain();
            stats.commands = commands.len();
            Self::submit(device, slot_index, slot, &mut commands, &mut stats)
        };

        queue.reset();
        slot.buffer.reset();

        match result {
            Ok(fence) => {
                slot.fence = Some(fence);
                log::trace!(
                    "frame {}: {} commands, {} draws, {} binds, {} vertices, {} indices",
                    self.frames,
                    stats.commands,
                    stats.draw_calls,
                    stats.state_binds,
                    stats.vertices,
                    stats.indices
                );
                FrameStatus::Completed(stats)
            }
            Err(error) => {
                slot.fence = None;
                let dropped_commands = stats.commands - stats.draw_calls;
                log::error!(
                    "frame {} aborted: {error}; {dropped_commands} of {} commands dropped",
                    self.frames,
                    stats.commands
                );
                FrameStatus::Failed {
                    error,
                    stats,
                    dropped_commands,
                }
            }
        }
    }

    fn submit<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        slot_index: usize,
        slot: &FrameSlot,
        commands: impl Iterator<Item = DrawCommand>,
        stats: &mut FrameStats,
    ) -> Result<FenceHandle, DeviceError> {
        if stats.commands > 0 {
            device.upload_buffer(slot_index, slot.buffer.vertices(), slot.buffer.indices())?;
        }

        let mut bound: Option<RenderState2D> = None;
        for cmd in commands {
            let changes = StateChanges::between(bound.as_ref(), &cmd.state);
            if !changes.is_empty() {
                device.bind_state(&NativeStateDescriptor::new(cmd.state, changes))?;
                stats.state_binds += 1;
                bound = Some(cmd.state);
            }
            device.draw_indexed(cmd.index_offset, cmd.index_count, cmd.vertex_offset)?;
            stats.draw_calls += 1;
        }

        device.get_frame_fence(slot_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, RecordingDevice};
    use crate::render::batch::FrameSlots;
    use crate::render::state::{BlendState, StateTracker};

    struct Rig {
        slots: FrameSlots,
        queue: CommandQueue,
        tracker: StateTracker,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                slots: FrameSlots::new(2, 64, 64),
                queue: CommandQueue::new(),
                tracker: StateTracker::new(),
            }
        }

        fn quad(&mut self) {
            let buf = &mut self.slots.get_mut(0).buffer;
            let r = buf.reserve(4, 6);
            self.queue.append(&mut self.tracker, r);
        }

        fn flush(&mut self, device: &mut RecordingDevice) -> FrameStatus {
            Flusher::new().flush(device, 0, self.slots.get_mut(0), &mut self.queue)
        }
    }

    // ── happy path ────────────────────────────────────────────────────────

    #[test]
    fn one_upload_then_bind_draw_per_command() {
        let mut rig = Rig::new();
        rig.quad();
        rig.quad();
        rig.tracker.set_blend_state(BlendState::ADDITIVE);
        rig.quad();

        let mut dev = RecordingDevice::new();
        let status = rig.flush(&mut dev);

        let stats = *status.stats();
        assert!(status.is_completed());
        assert_eq!((stats.commands, stats.draw_calls, stats.state_binds), (2, 2, 2));
        assert_eq!((stats.vertices, stats.indices), (12, 18));

        assert!(matches!(dev.calls()[0], DeviceCall::Upload { slot: 0, vertices: 12, indices: 18 }));
        assert_eq!(dev.draws(), vec![(0, 12, 0), (12, 6, 8)]);
        assert!(matches!(dev.calls().last(), Some(DeviceCall::Fence { slot: 0, .. })));
    }

    #[test]
    fn first_bind_is_full_then_only_deltas() {
        let mut rig = Rig::new();
        rig.quad();
        rig.tracker.set_blend_state(BlendState::ADDITIVE);
        rig.quad();

        let mut dev = RecordingDevice::new();
        rig.flush(&mut dev);
        let binds = dev.binds();
        assert_eq!(binds[0].changes, StateChanges::all());
        assert_eq!(binds[1].changes, StateChanges::BLEND);
    }

    #[test]
    fn empty_frame_skips_upload_but_fences() {
        let mut rig = Rig::new();
        let mut dev = RecordingDevice::new();
        let status = rig.flush(&mut dev);
        assert!(status.is_completed());
        assert_eq!(dev.calls().len(), 1);
        assert!(rig.slots.get(0).fence.is_some());
    }

    #[test]
    fn flush_resets_queue_and_buffer() {
        let mut rig = Rig::new();
        rig.quad();
        let mut dev = RecordingDevice::new();
        rig.flush(&mut dev);
        assert!(rig.queue.is_empty());
        assert_eq!(rig.slots.get(0).buffer.vertex_len(), 0);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn device_loss_drops_remaining_commands() {
        let mut rig = Rig::new();
        for i in 0..3 {
            rig.tracker.set_color_add(crate::paint::Color::new(i as f32, 0.0, 0.0, 0.0));
            rig.quad();
        }

        let mut dev = RecordingDevice::new();
        dev.lose_device_after_draws(1);
        let status = rig.flush(&mut dev);

        match status {
            FrameStatus::Failed { error, stats, dropped_commands } => {
                assert!(matches!(error, DeviceError::DeviceLost(_)));
                assert_eq!(stats.draw_calls, 1);
                assert_eq!(dropped_commands, 2);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(dev.draws().len(), 1);
        assert!(rig.slots.get(0).fence.is_none());
        assert!(rig.queue.is_empty());
    }

    #[test]
    fn failed_upload_issues_no_draws() {
        let mut rig = Rig::new();
        rig.quad();
        let mut dev = RecordingDevice::new();
        dev.fail_next_upload();

        let status = rig.flush(&mut dev);
        assert!(matches!(status.error(), Some(DeviceError::UploadFailed(_))));
        assert!(dev.draws().is_empty());
        assert_eq!(rig.slots.get(0).buffer.index_len(), 0);
    }
}
