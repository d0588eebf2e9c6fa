use crate::coords::{IRect, Mat3x2, Rect, Vec2};
use crate::device::{DeviceError, FenceHandle, GraphicsDevice, ShaderHandle, TextureHandle};
use crate::paint::Color;

use super::batch::{BatchBuffer, CommandQueue, FrameSlots};
use super::config::Renderer2DConfig;
use super::encode::{GeometryEncoder, Glyph, LineCap, VertexSink, WriteRegion, DEFAULT_CURVE_QUALITY};
use super::flush::{FrameStatus, Flusher};
use super::guard::ScopedState;
use super::state::{BlendState, RasterizerState, RenderState2D, SamplerState, StateTracker};
use super::vertex::{Index, Vertex2D};

/// Explicit 2D rendering context owned by the frame loop.
///
/// Holds the pending render state, the frame's command queue and the ring of
/// staging buffer slots. A frame is bracketed by [`begin_frame`](Self::begin_frame)
/// and [`flush`](Self::flush); every `draw_*` call in between encodes geometry
/// into the active slot under the state pending at the time of the call.
///
/// Pending state carries over from one frame to the next.
///
/// # Panics
/// Drawing or flushing outside a frame, and beginning a frame twice, are
/// contract violations and panic.
pub struct RenderContext2D {
    config: Renderer2DConfig,
    encoder: GeometryEncoder,
    tracker: StateTracker,
    queue: CommandQueue,
    slots: FrameSlots,
    flusher: Flusher,
    frame_index: u64,
    active_slot: Option<usize>,
}

/// Sink that attributes every reserved region to a draw command before
/// handing it to the encoder.
struct Batcher<'a> {
    tracker: &'a mut StateTracker,
    queue: &'a mut CommandQueue,
    buffer: &'a mut BatchBuffer,
}

impl VertexSink for Batcher<'_> {
    fn request(&mut self, vertex_count: u32, index_count: u32) -> WriteRegion<'_> {
        let reservation = self.buffer.reserve(vertex_count, index_count);
        let base: Index = self.queue.append(self.tracker, reservation);
        let (vertices, indices) = self.buffer.region_mut(reservation);
        WriteRegion { vertices, indices, base }
    }
}

macro_rules! state_setter {
    ($(#[$doc:meta])* $name:ident: $ty:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, value: $ty) -> $ty {
            self.tracker.$name(value)
        }
    };
}

macro_rules! scoped_setter {
    ($(#[$doc:meta])* $name:ident => $setter:ident: $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self, value: $ty) -> ScopedState<'_, $ty> {
            let saved = self.tracker.$setter(value);
            ScopedState::new(self, saved, |ctx, saved| {
                ctx.tracker.$setter(saved);
            })
        }
    };
}

impl RenderContext2D {
    pub fn new(config: Renderer2DConfig) -> Self {
        let slots = FrameSlots::new(
            config.slot_count(),
            config.initial_vertex_capacity,
            config.initial_index_capacity,
        );
        log::debug!(
            "2D renderer: {} frame slots, {} vertices / {} indices each",
            slots.len(),
            config.initial_vertex_capacity,
            config.initial_index_capacity
        );

        Self {
            encoder: GeometryEncoder::new(config.max_circle_quality),
            config,
            tracker: StateTracker::new(),
            queue: CommandQueue::new(),
            slots,
            flusher: Flusher::new(),
            frame_index: 0,
            active_slot: None,
        }
    }

    // ── frame lifecycle ───────────────────────────────────────────────────

    /// Acquires the buffer slot for the next frame.
    ///
    /// Waits (bounded by `fence_timeout`) for the GPU to release the slot. On
    /// error no frame is active; the device should be treated as lost.
    pub fn begin_frame<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<(), DeviceError> {
        assert!(self.active_slot.is_none(), "begin_frame called while a frame is active");

        let slot = self.slots.index_for(self.frame_index);
        if let Err(e) = self.slots.acquire(slot, device, self.config.fence_timeout) {
            log::error!("frame {}: slot {slot} unavailable: {e}", self.frame_index);
            return Err(e);
        }

        self.queue.reset();
        self.active_slot = Some(slot);
        Ok(())
    }

    /// Ends the frame: uploads the slot, issues the draws and records the slot fence.
    ///
    /// Always leaves the context ready for the next `begin_frame`, even when the
    /// frame failed.
    pub fn flush<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> FrameStatus {
        let Some(slot) = self.active_slot.take() else {
            panic!("flush called without begin_frame");
        };

        let status = self
            .flusher
            .flush(device, slot, self.slots.get_mut(slot), &mut self.queue);
        self.frame_index += 1;
        status
    }

    /// Forgets every recorded slot fence.
    ///
    /// Call after replacing a failed device; fences from the old device are
    /// meaningless to the new one.
    pub fn discard_fences(&mut self) {
        for i in 0..self.slots.len() {
            self.slots.get_mut(i).fence = None;
        }
    }

    #[inline]
    pub fn is_frame_active(&self) -> bool {
        self.active_slot.is_some()
    }

    /// Number of frames flushed so far.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    pub fn config(&self) -> &Renderer2DConfig {
        &self.config
    }

    #[inline]
    pub fn encoder(&self) -> &GeometryEncoder {
        &self.encoder
    }

    /// State the next draw will be recorded under.
    #[inline]
    pub fn state(&self) -> &RenderState2D {
        self.tracker.pending()
    }

    #[inline]
    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    /// Commands recorded so far this frame.
    #[inline]
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Staging buffer of the active frame.
    pub fn active_buffer(&self) -> Option<&BatchBuffer> {
        self.active_slot.map(|slot| &self.slots.get(slot).buffer)
    }

    pub fn slot_fence(&self, slot: usize) -> Option<FenceHandle> {
        self.slots.get(slot).fence
    }

    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    // ── state ─────────────────────────────────────────────────────────────

    state_setter!(
        /// Sets the blend state for subsequent draws; returns the previous one.
        set_blend_state: BlendState
    );
    state_setter!(set_rasterizer_state: RasterizerState);
    state_setter!(
        /// Texture sampled by [`draw_quad`](Self::draw_quad) and
        /// [`draw_sprite`](Self::draw_sprite). Other draws bind their own
        /// texture (or none) for their geometry only.
        set_texture: Option<TextureHandle>
    );
    state_setter!(set_local_transform: Mat3x2);
    state_setter!(set_camera_transform: Mat3x2);
    state_setter!(set_color_mul: Color);
    state_setter!(set_color_add: Color);
    state_setter!(
        /// Takes effect only while the rasterizer state has `scissor_enable`.
        set_scissor_rect: Option<IRect>
    );
    state_setter!(set_render_target: Option<TextureHandle>);
    state_setter!(set_viewport: Option<IRect>);
    state_setter!(set_shader_program: Option<ShaderHandle>);

    /// # Panics
    /// Panics if `slot >= MAX_SAMPLER_SLOTS`.
    #[inline]
    pub fn set_sampler_state(&mut self, slot: usize, value: SamplerState) -> SamplerState {
        self.tracker.set_sampler_state(slot, value)
    }

    /// Returns every state field to its default.
    pub fn reset_state(&mut self) -> RenderState2D {
        self.tracker.reset_pending()
    }

    scoped_setter!(scoped_blend_state => set_blend_state: BlendState);
    scoped_setter!(scoped_rasterizer_state => set_rasterizer_state: RasterizerState);
    scoped_setter!(scoped_texture => set_texture: Option<TextureHandle>);
    scoped_setter!(
        /// Replaces the local transform for the guard's lifetime.
        scoped_local_transform => set_local_transform: Mat3x2
    );
    scoped_setter!(scoped_camera_transform => set_camera_transform: Mat3x2);
    scoped_setter!(scoped_color_mul => set_color_mul: Color);
    scoped_setter!(scoped_color_add => set_color_add: Color);
    scoped_setter!(scoped_scissor_rect => set_scissor_rect: Option<IRect>);
    scoped_setter!(scoped_render_target => set_render_target: Option<TextureHandle>);
    scoped_setter!(scoped_viewport => set_viewport: Option<IRect>);
    scoped_setter!(scoped_shader_program => set_shader_program: Option<ShaderHandle>);

    /// Applies `transform` before the current local transform for the guard's lifetime.
    pub fn scoped_transform(&mut self, transform: Mat3x2) -> ScopedState<'_, Mat3x2> {
        let composed = transform * self.tracker.pending().local_transform;
        let saved = self.tracker.set_local_transform(composed);
        ScopedState::new(self, saved, |ctx, saved| {
            ctx.tracker.set_local_transform(saved);
        })
    }

    pub fn scoped_sampler_state(&mut self, slot: usize, value: SamplerState) -> ScopedState<'_, (usize, SamplerState)> {
        let saved = self.tracker.set_sampler_state(slot, value);
        ScopedState::new(self, (slot, saved), |ctx, (slot, saved)| {
            ctx.tracker.set_sampler_state(slot, saved);
        })
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Encodes one draw with `texture` bound for its geometry only.
    ///
    /// The pending texture is put back afterwards, so shape draws inside a
    /// `scoped_texture` do not clear it and no-op draws change nothing.
    fn encode_with<F>(&mut self, texture: Option<TextureHandle>, encode: F) -> u32
    where
        F: FnOnce(&GeometryEncoder, &mut dyn VertexSink) -> u32,
    {
        let Some(slot) = self.active_slot else {
            panic!("draw call outside begin_frame/flush");
        };

        let saved = self.tracker.set_texture(texture);
        let mut sink = Batcher {
            tracker: &mut self.tracker,
            queue: &mut self.queue,
            buffer: &mut self.slots.get_mut(slot).buffer,
        };
        let written = encode(&self.encoder, &mut sink);
        self.tracker.set_texture(saved);
        written
    }

    /// Untextured geometry.
    fn encode_shape<F>(&mut self, encode: F) -> u32
    where
        F: FnOnce(&GeometryEncoder, &mut dyn VertexSink) -> u32,
    {
        self.encode_with(None, encode)
    }

    /// Geometry sampling whatever texture is pending.
    fn encode_pending<F>(&mut self, encode: F) -> u32
    where
        F: FnOnce(&GeometryEncoder, &mut dyn VertexSink) -> u32,
    {
        let texture = self.tracker.pending().texture;
        self.encode_with(texture, encode)
    }

    /// Largest scale factor of the pending local·camera transform.
    fn draw_scale(&self) -> f32 {
        self.tracker.pending().combined_transform().max_scaling()
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.encode_shape(|enc, sink| enc.rect(sink, rect, color));
    }

    /// Frame of `thickness` drawn outside `rect`.
    pub fn draw_rect_frame(&mut self, rect: Rect, thickness: f32, color: Color) {
        self.encode_shape(|enc, sink| enc.rect_frame(sink, rect, thickness, color));
    }

    pub fn draw_triangle(&mut self, points: [Vec2; 3], color: Color) {
        self.encode_shape(|enc, sink| enc.triangle(sink, points, color));
    }

    /// Quad in perimeter order with explicit UVs, sampled from the pending texture.
    pub fn draw_quad(&mut self, corners: [Vec2; 4], uvs: [Vec2; 4], color: Color) {
        self.encode_pending(|enc, sink| enc.quad(sink, corners, uvs, color));
    }

    /// Filled circle; the segment count follows its on-screen size.
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let quality = self.encoder.circle_quality(radius, self.draw_scale());
        self.draw_circle_with_quality(center, radius, color, quality);
    }

    pub fn draw_circle_with_quality(&mut self, center: Vec2, radius: f32, color: Color, quality: u32) {
        self.encode_shape(|enc, sink| enc.circle(sink, center, radius, color, quality));
    }

    /// Ring from `inner_radius` out to `inner_radius + thickness`.
    pub fn draw_circle_frame(
        &mut self,
        center: Vec2,
        inner_radius: f32,
        thickness: f32,
        inner_color: Color,
        outer_color: Color,
    ) {
        let quality = self
            .encoder
            .ring_quality(inner_radius + thickness, self.draw_scale());
        self.encode_shape(|enc, sink| {
            enc.circle_frame(sink, center, inner_radius, thickness, inner_color, outer_color, quality)
        });
    }

    /// Sector; angles in radians, clockwise from 12 o'clock.
    pub fn draw_circle_pie(&mut self, center: Vec2, radius: f32, start_angle: f32, angle: f32, color: Color) {
        let quality = self.encoder.pie_quality(radius, angle, self.draw_scale());
        self.encode_shape(|enc, sink| enc.circle_pie(sink, center, radius, start_angle, angle, color, quality));
    }

    /// Thick arc from `inner_radius` out to `inner_radius + thickness`; angles as
    /// for [`draw_circle_pie`](Self::draw_circle_pie).
    pub fn draw_circle_arc(
        &mut self,
        center: Vec2,
        inner_radius: f32,
        thickness: f32,
        start_angle: f32,
        angle: f32,
        color: Color,
    ) {
        let quality = self
            .encoder
            .pie_quality(inner_radius + thickness, angle, self.draw_scale());
        self.encode_shape(|enc, sink| {
            enc.circle_arc(sink, center, inner_radius, thickness, start_angle, angle, color, color, quality)
        });
    }

    /// Axis-aligned ellipse; the segment count follows the larger radius.
    pub fn draw_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Color) {
        let quality = self
            .encoder
            .circle_quality(rx.abs().max(ry.abs()), self.draw_scale());
        self.encode_shape(|enc, sink| enc.ellipse(sink, center, rx, ry, color, quality));
    }

    pub fn draw_ellipse_frame(
        &mut self,
        center: Vec2,
        inner_rx: f32,
        inner_ry: f32,
        thickness: f32,
        inner_color: Color,
        outer_color: Color,
    ) {
        let outer = inner_rx.abs().max(inner_ry.abs()) + thickness;
        let quality = self.encoder.ring_quality(outer, self.draw_scale());
        self.encode_shape(|enc, sink| {
            enc.ellipse_frame(sink, center, inner_rx, inner_ry, thickness, inner_color, outer_color, quality)
        });
    }

    pub fn draw_round_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        let quality = self.encoder.corner_quality(radius, self.draw_scale());
        self.encode_shape(|enc, sink| enc.round_rect(sink, rect, radius, color, quality));
    }

    pub fn draw_line(&mut self, begin: Vec2, end: Vec2, thickness: f32, color: Color, cap: LineCap) {
        self.draw_line_gradient(begin, end, thickness, [color; 2], cap);
    }

    /// Line with `colors[0]` at `begin` fading to `colors[1]` at `end`.
    pub fn draw_line_gradient(&mut self, begin: Vec2, end: Vec2, thickness: f32, colors: [Color; 2], cap: LineCap) {
        let cap_quality = self.encoder.cap_quality(thickness * 0.5, self.draw_scale());
        self.encode_shape(|enc, sink| enc.line(sink, begin, end, thickness, colors, cap, cap_quality));
    }

    pub fn draw_polyline(&mut self, points: &[Vec2], thickness: f32, color: Color, closed: bool, cap: LineCap) {
        let cap_quality = self.encoder.cap_quality(thickness * 0.5, self.draw_scale());
        self.encode_shape(|enc, sink| enc.polyline(sink, points, thickness, color, closed, cap, cap_quality));
    }

    pub fn draw_quadratic_bezier(&mut self, control: [Vec2; 3], thickness: f32, color: Color) {
        self.encode_shape(|enc, sink| enc.quadratic_bezier(sink, control, thickness, color, DEFAULT_CURVE_QUALITY));
    }

    pub fn draw_cubic_bezier(&mut self, control: [Vec2; 4], thickness: f32, color: Color) {
        self.draw_cubic_bezier_with_quality(control, thickness, color, DEFAULT_CURVE_QUALITY);
    }

    /// Cubic bezier sampled at `quality + 2` points.
    pub fn draw_cubic_bezier_with_quality(&mut self, control: [Vec2; 4], thickness: f32, color: Color, quality: u32) {
        self.encode_shape(|enc, sink| enc.cubic_bezier(sink, control, thickness, color, quality));
    }

    /// `indices` are triangles over `points`; `offset` is added to every point.
    /// Out-of-range indices skip the draw.
    pub fn draw_shape(&mut self, points: &[Vec2], indices: &[Index], offset: Vec2, color: Color) {
        self.encode_shape(|enc, sink| enc.shape(sink, points, indices, offset, color));
    }

    /// Caller-built vertices sampled from the pending texture. Out-of-range
    /// indices skip the draw.
    pub fn draw_sprite(&mut self, vertices: &[Vertex2D], indices: &[Index]) {
        self.encode_pending(|enc, sink| enc.sprite(sink, vertices, indices));
    }

    pub fn draw_textured_sprite(&mut self, texture: TextureHandle, vertices: &[Vertex2D], indices: &[Index]) {
        self.encode_with(Some(texture), |enc, sink| enc.sprite(sink, vertices, indices));
    }

    /// `uv` is in normalized texture coordinates.
    pub fn draw_textured_rect(&mut self, texture: TextureHandle, rect: Rect, uv: Rect, color: Color) {
        self.encode_with(Some(texture), |enc, sink| enc.textured_rect(sink, rect, uv, color));
    }

    pub fn draw_textured_quad(&mut self, texture: TextureHandle, corners: [Vec2; 4], uv: Rect, color: Color) {
        self.encode_with(Some(texture), |enc, sink| enc.textured_quad(sink, corners, uv, color));
    }

    /// Circle sampling the `uv` region of `texture` stretched over its bounding square.
    pub fn draw_textured_circle(&mut self, texture: TextureHandle, center: Vec2, radius: f32, uv: Rect, color: Color) {
        let quality = self.encoder.circle_quality(radius, self.draw_scale());
        self.encode_with(Some(texture), |enc, sink| enc.textured_circle(sink, center, radius, uv, color, quality));
    }

    /// Glyph quads sampled from `atlas`, positioned relative to `origin`.
    pub fn draw_glyph_run(&mut self, atlas: TextureHandle, origin: Vec2, glyphs: &[Glyph], color: Color) {
        self.encode_with(Some(atlas), |enc, sink| enc.glyph_run(sink, origin, glyphs, color));
    }
}

impl Default for RenderContext2D {
    fn default() -> Self {
        Self::new(Renderer2DConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, RecordingDevice};
    use crate::render::flush::FrameStats;

    fn rect(x: f32) -> Rect {
        Rect::new(x, 0.0, 10.0, 10.0)
    }

    fn started(device: &mut RecordingDevice) -> RenderContext2D {
        let mut ctx = RenderContext2D::default();
        ctx.begin_frame(device).unwrap();
        ctx
    }

    // ── batching ──────────────────────────────────────────────────────────

    #[test]
    fn end_to_end_two_commands() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);

        ctx.draw_rect(rect(0.0), Color::WHITE);
        ctx.draw_rect(rect(5.0), Color::WHITE);
        ctx.set_blend_state(BlendState::ADDITIVE);
        ctx.draw_rect(rect(10.0), Color::WHITE);

        assert_eq!(ctx.queue().len(), 2);
        let status = ctx.flush(&mut dev);
        assert!(status.is_completed());

        assert_eq!(dev.draws(), vec![(0, 12, 0), (12, 6, 8)]);
        let binds = dev.binds();
        assert_eq!(binds[0].state.blend, BlendState::DEFAULT);
        assert_eq!(binds[1].state.blend, BlendState::ADDITIVE);
    }

    #[test]
    fn same_state_draws_share_one_call_in_order() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        for i in 0..16 {
            ctx.draw_rect(rect(i as f32 * 3.0), Color::WHITE);
        }
        ctx.flush(&mut dev);

        assert_eq!(dev.draws(), vec![(0, 96, 0)]);
        let (verts, indices) = dev.last_upload();
        for (q, chunk) in indices.chunks(6).enumerate() {
            let first = q as u32 * 4;
            assert!(chunk.iter().all(|&i| i >= first && i < first + 4));
            assert_eq!(verts[first as usize].pos[0], q as f32 * 3.0);
        }
    }

    #[test]
    fn set_and_restore_does_not_break() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        ctx.draw_rect(rect(0.0), Color::WHITE);

        let prev = ctx.set_blend_state(BlendState::ADDITIVE);
        ctx.set_blend_state(prev);
        ctx.set_color_mul(Color::WHITE);
        ctx.draw_rect(rect(10.0), Color::WHITE);

        assert_eq!(ctx.queue().len(), 1);
        assert_eq!(ctx.flush(&mut dev).stats().draw_calls, 1);
    }

    #[test]
    fn degenerate_circle_opens_no_command() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        ctx.draw_circle(Vec2::new(5.0, 5.0), 0.0, Color::WHITE);
        assert!(ctx.queue().is_empty());
        assert_eq!(ctx.active_buffer().map(|b| b.vertex_len()), Some(0));

        ctx.draw_rect(rect(0.0), Color::WHITE);
        ctx.set_color_add(Color::new(0.5, 0.0, 0.0, 0.0));
        ctx.draw_circle(Vec2::new(5.0, 5.0), -1.0, Color::WHITE);
        assert_eq!(ctx.queue().len(), 1);
    }

    #[test]
    fn textured_draws_bind_their_texture() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        let tex = TextureHandle(7);

        ctx.draw_rect(rect(0.0), Color::WHITE);
        ctx.draw_textured_rect(tex, rect(10.0), Rect::UNIT, Color::WHITE);
        ctx.draw_quad([Vec2::zero(); 4], [Vec2::zero(); 4], Color::WHITE);
        ctx.draw_rect(rect(20.0), Color::WHITE);
        ctx.flush(&mut dev);

        let textures: Vec<_> = dev.binds().iter().map(|b| b.state.texture).collect();
        assert_eq!(textures, vec![None, Some(tex), None]);
        assert_eq!(dev.draws().len(), 3);
    }

    #[test]
    fn shape_draws_keep_the_scoped_texture() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        let tex = TextureHandle(9);
        {
            let mut g = ctx.scoped_texture(Some(tex));
            g.draw_rect(rect(0.0), Color::WHITE);
            assert_eq!(g.state().texture, Some(tex));
            g.draw_quad([Vec2::zero(); 4], [Vec2::zero(); 4], Color::WHITE);
            g.draw_sprite(&[Vertex2D::default(); 3], &[0, 1, 2]);
        }
        assert_eq!(ctx.state().texture, None);
        ctx.flush(&mut dev);

        let textures: Vec<_> = dev.binds().iter().map(|b| b.state.texture).collect();
        assert_eq!(textures, vec![None, Some(tex)]);
        assert_eq!(dev.draws(), vec![(0, 6, 0), (6, 9, 4)]);
    }

    #[test]
    fn noop_draw_leaves_pending_texture() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        ctx.set_texture(Some(TextureHandle(3)));
        ctx.draw_circle(Vec2::new(5.0, 5.0), 0.0, Color::WHITE);
        ctx.draw_textured_circle(TextureHandle(4), Vec2::zero(), -2.0, Rect::UNIT, Color::WHITE);

        assert_eq!(ctx.state().texture, Some(TextureHandle(3)));
        assert!(ctx.queue().is_empty());
    }

    #[test]
    fn out_of_range_indices_skip_the_draw() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        let pts = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        ctx.draw_shape(&pts, &[0, 1, 7], Vec2::zero(), Color::WHITE);
        ctx.draw_sprite(&[Vertex2D::default(); 3], &[0, 3, 1]);
        assert!(ctx.queue().is_empty());

        ctx.flush(&mut dev);
        assert!(dev.draws().is_empty());
    }

    #[test]
    fn arcs_and_ellipses_batch_with_shapes() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        ctx.draw_rect(rect(0.0), Color::WHITE);
        ctx.draw_ellipse(Vec2::new(50.0, 50.0), 30.0, 10.0, Color::WHITE);
        ctx.draw_ellipse_frame(Vec2::new(50.0, 50.0), 30.0, 10.0, 2.0, Color::WHITE, Color::BLACK);
        ctx.draw_circle_arc(Vec2::new(50.0, 50.0), 20.0, 4.0, 0.0, std::f32::consts::PI, Color::WHITE);
        assert_eq!(ctx.queue().len(), 1);

        ctx.draw_textured_circle(TextureHandle(5), Vec2::new(50.0, 50.0), 10.0, Rect::UNIT, Color::WHITE);
        assert_eq!(ctx.queue().len(), 2);
        assert_eq!(ctx.queue().open().map(|c| c.state.texture), Some(Some(TextureHandle(5))));
        assert!(ctx.flush(&mut dev).is_completed());
    }

    #[test]
    fn round_caps_follow_scale() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        let (a, b) = (Vec2::zero(), Vec2::new(10.0, 0.0));
        ctx.draw_line(a, b, 4.0, Color::WHITE, LineCap::Round);
        let small = ctx.queue().open().map(|c| c.index_count).unwrap_or(0);

        ctx.set_camera_transform(Mat3x2::scale(20.0, 20.0));
        ctx.draw_line(a, b, 4.0, Color::WHITE, LineCap::Round);
        let total: u32 = ctx.queue().closed().iter().chain(ctx.queue().open()).map(|c| c.index_count).sum();
        assert!(total - small > small);
    }

    #[test]
    fn circle_quality_follows_scale() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        ctx.draw_circle(Vec2::zero(), 10.0, Color::WHITE);
        let small = ctx.queue().open().map(|c| c.index_count).unwrap_or(0);

        ctx.set_camera_transform(Mat3x2::scale(4.0, 4.0));
        ctx.draw_circle(Vec2::zero(), 10.0, Color::WHITE);
        let total: u32 = ctx.queue().closed().iter().chain(ctx.queue().open()).map(|c| c.index_count).sum();
        assert!(total - small > small);
    }

    // ── scoped guards ─────────────────────────────────────────────────────

    #[test]
    fn guards_restore_on_drop() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        let before = *ctx.state();

        {
            let mut g = ctx.scoped_blend_state(BlendState::ADDITIVE);
            assert_eq!(g.saved(), BlendState::DEFAULT);
            g.draw_rect(rect(0.0), Color::WHITE);
            {
                let mut g = g.scoped_color_mul(Color::new(1.0, 0.0, 0.0, 1.0));
                let mut g = g.scoped_sampler_state(1, SamplerState::REPEAT_NEAREST);
                g.draw_rect(rect(10.0), Color::WHITE);
                assert_eq!(g.state().samplers[1], SamplerState::REPEAT_NEAREST);
            }
            assert_eq!(g.state().color_mul, Color::WHITE);
            assert_eq!(g.state().blend, BlendState::ADDITIVE);
        }

        assert_eq!(*ctx.state(), before);
        assert_eq!(ctx.queue().len(), 2);
    }

    #[test]
    fn scoped_transform_composes() {
        let mut ctx = RenderContext2D::default();
        ctx.set_local_transform(Mat3x2::translate(Vec2::new(10.0, 0.0)));
        {
            let g = ctx.scoped_transform(Mat3x2::scale(2.0, 2.0));
            let p = g.state().local_transform.transform_point(Vec2::new(1.0, 1.0));
            assert_eq!(p, Vec2::new(12.0, 2.0));
        }
        assert_eq!(ctx.state().local_transform, Mat3x2::translate(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn pending_state_survives_flush() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        ctx.set_blend_state(BlendState::MULTIPLICATIVE);
        ctx.flush(&mut dev);

        ctx.begin_frame(&mut dev).unwrap();
        ctx.draw_rect(rect(0.0), Color::WHITE);
        assert_eq!(ctx.queue().open().map(|c| c.state.blend), Some(BlendState::MULTIPLICATIVE));
    }

    // ── frame lifecycle ───────────────────────────────────────────────────

    #[test]
    fn slots_rotate_and_wait_on_their_fence() {
        let mut dev = RecordingDevice::new();
        let mut ctx = RenderContext2D::default();

        for _ in 0..3 {
            ctx.begin_frame(&mut dev).unwrap();
            ctx.draw_rect(rect(0.0), Color::WHITE);
            ctx.flush(&mut dev);
        }

        let slots: Vec<usize> = dev
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Upload { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(slots, vec![0, 1, 0]);
        assert_eq!(
            dev.calls().iter().filter(|c| matches!(c, DeviceCall::Wait { .. })).count(),
            1,
            "only the third frame reuses a fenced slot"
        );
        assert_eq!(ctx.frame_index(), 3);
    }

    #[test]
    fn fence_timeout_fails_begin_frame() {
        let mut dev = RecordingDevice::new();
        let mut ctx = RenderContext2D::new(Renderer2DConfig {
            frames_in_flight: 1,
            ..Renderer2DConfig::default()
        });
        ctx.begin_frame(&mut dev).unwrap();
        ctx.flush(&mut dev);

        dev.stall_fences(true);
        let err = ctx.begin_frame(&mut dev).unwrap_err();
        assert!(matches!(err, DeviceError::FenceTimeout { .. }));
        assert!(!ctx.is_frame_active());
    }

    #[test]
    fn device_loss_fails_frame_and_recovers() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        ctx.draw_rect(rect(0.0), Color::WHITE);
        ctx.set_blend_state(BlendState::ADDITIVE);
        ctx.draw_rect(rect(10.0), Color::WHITE);

        dev.lose_device_after_draws(1);
        let status = ctx.flush(&mut dev);
        assert!(matches!(
            status,
            FrameStatus::Failed { dropped_commands: 1, stats: FrameStats { draw_calls: 1, .. }, .. }
        ));

        let mut fresh = RecordingDevice::new();
        ctx.discard_fences();
        ctx.begin_frame(&mut fresh).unwrap();
        assert!(ctx.queue().is_empty());
        ctx.draw_rect(rect(0.0), Color::WHITE);
        assert!(ctx.flush(&mut fresh).is_completed());
        assert_eq!(fresh.draws(), vec![(0, 6, 0)]);
    }

    #[test]
    #[should_panic(expected = "outside begin_frame")]
    fn drawing_outside_frame_panics() {
        RenderContext2D::default().draw_rect(rect(0.0), Color::WHITE);
    }

    #[test]
    #[should_panic(expected = "while a frame is active")]
    fn double_begin_panics() {
        let mut dev = RecordingDevice::new();
        let mut ctx = started(&mut dev);
        let _ = ctx.begin_frame(&mut dev);
    }
}
