use crate::render::state::{RenderState2D, StateTracker};

use super::Reservation;

/// Unit of work: an index range plus the state it was recorded under.
///
/// Indices inside the range are relative to `vertex_offset`, which the flusher
/// passes as the base vertex of the native draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCommand {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
    pub state: RenderState2D,
}

/// Ordered, append-only list of draw commands for one frame.
///
/// Closed commands are immutable. At most one command is open and accepts
/// appended geometry; it is closed on a state change or by [`drain`](Self::drain).
/// Commands are never reordered: issuance order is draw order.
#[derive(Debug, Default)]
pub struct CommandQueue {
    closed: Vec<DrawCommand>,
    open: Option<DrawCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes a freshly reserved region to a command and returns the base
    /// vertex the region's indices must be written relative to.
    ///
    /// If no command is open, or `tracker` reports a state change, the open
    /// command is closed first and a new one is opened with the committed state.
    pub fn append(&mut self, tracker: &mut StateTracker, region: Reservation) -> u32 {
        if self.open.is_some() && tracker.needs_break() {
            self.close_open();
        }

        let open = self.open.get_or_insert_with(|| DrawCommand {
            vertex_offset: region.vertex_offset,
            vertex_count: 0,
            index_offset: region.index_offset,
            index_count: 0,
            state: tracker.commit(),
        });
        debug_assert_eq!(
            open.index_offset + open.index_count,
            region.index_offset,
            "reservations must be appended in order"
        );

        open.vertex_count += region.vertex_count;
        open.index_count += region.index_count;
        region.vertex_offset - open.vertex_offset
    }

    /// Closes the open command, if any. Zero-length commands are dropped.
    fn close_open(&mut self) {
        if let Some(cmd) = self.open.take() {
            if cmd.index_count > 0 {
                self.closed.push(cmd);
            }
        }
    }

    /// Finalizes the frame's commands and yields them in issuance order.
    ///
    /// The sequence is single-pass; the queue is empty afterwards.
    pub fn drain(&mut self) -> std::vec::Drain<'_, DrawCommand> {
        self.close_open();
        self.closed.drain(..)
    }

    /// Drops all commands, keeping allocated capacity.
    pub fn reset(&mut self) {
        self.closed.clear();
        self.open = None;
    }

    #[inline]
    pub fn open(&self) -> Option<&DrawCommand> {
        self.open.as_ref()
    }

    /// Closed commands so far (the open one excluded).
    #[inline]
    pub fn closed(&self) -> &[DrawCommand] {
        &self.closed
    }

    /// Number of commands including the open one.
    #[inline]
    pub fn len(&self) -> usize {
        self.closed.len() + usize::from(self.open.is_some())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
