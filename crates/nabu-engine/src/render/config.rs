use std::time::Duration;

/// Construction parameters for [`RenderContext2D`](super::RenderContext2D).
///
/// Capacities are starting points only; staging buffers grow on demand.
#[derive(Debug, Clone)]
pub struct Renderer2DConfig {
    /// Number of buffer slots rotated across frames (clamped to `1..=4`).
    ///
    /// Two lets the CPU record frame N+1 while the GPU still reads frame N.
    pub frames_in_flight: usize,

    /// Per-slot vertex capacity allocated up front.
    pub initial_vertex_capacity: usize,

    /// Per-slot index capacity allocated up front.
    pub initial_index_capacity: usize,

    /// Upper clamp for circle, ring, pie and corner segment counts.
    pub max_circle_quality: u32,

    /// Bound on the slot fence wait at the start of a frame.
    ///
    /// A wait that exceeds it is reported as a device failure.
    pub fence_timeout: Duration,
}

impl Default for Renderer2DConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            initial_vertex_capacity: 4096,
            initial_index_capacity: 12288,
            max_circle_quality: 255,
            fence_timeout: Duration::from_secs(2),
        }
    }
}

impl Renderer2DConfig {
    pub const MAX_FRAMES_IN_FLIGHT: usize = 4;

    /// `frames_in_flight` clamped to the supported range.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.frames_in_flight.clamp(1, Self::MAX_FRAMES_IN_FLIGHT)
    }
}
