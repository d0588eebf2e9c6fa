//! wgpu backend.
//!
//! Renders into an offscreen default target. Binds and draws are recorded as
//! they arrive and replayed into render passes when the slot fence is
//! requested, which is also when the frame is submitted.

mod init;
mod pipeline;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::render::{Index, SamplerState, Vertex2D};

use super::{DeviceError, FenceHandle, GraphicsDevice, NativeStateDescriptor, ShaderHandle, TextureHandle};

pub use init::WgpuInit;
use pipeline::{PipelineKey, Pipelines, Uniforms2D};

/// Pixel rect as `(x, y, w, h)`.
type PxRect = (u32, u32, u32, u32);

type BindKey = (Option<TextureHandle>, SamplerState);

struct SlotBuffers {
    vertex: Option<wgpu::Buffer>,
    vertex_capacity: u64,
    index: Option<wgpu::Buffer>,
    index_capacity: u64,
}

struct TextureEntry {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    render_target: bool,
}

/// State captured by the last `bind_state`; copied into every following draw.
#[derive(Debug, Copy, Clone)]
struct Bound {
    target: Option<TextureHandle>,
    pipeline: PipelineKey,
    bind: BindKey,
    uniform_offset: u32,
    viewport: PxRect,
    scissor: PxRect,
    /// Viewport or scissor clipped to nothing; draws are skipped.
    culled: bool,
}

#[derive(Debug, Copy, Clone)]
struct RecordedDraw {
    state: Bound,
    slot: usize,
    first_index: u32,
    index_count: u32,
    base_vertex: u32,
}

/// [`GraphicsDevice`] over wgpu.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,

    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
    default_view: wgpu::TextureView,
    _default_target: wgpu::Texture,

    pipelines: Pipelines,
    slots: Vec<SlotBuffers>,

    textures: HashMap<TextureHandle, TextureEntry>,
    shaders: HashMap<ShaderHandle, wgpu::ShaderModule>,
    next_texture: u32,
    next_shader: u32,
    white: wgpu::TextureView,
    samplers: HashMap<SamplerState, wgpu::Sampler>,
    texture_binds: HashMap<BindKey, wgpu::BindGroup>,

    uniform_stride: u64,
    uniform_staging: Vec<u8>,
    uniform_buffer: Option<wgpu::Buffer>,
    uniform_capacity: u64,
    uniform_bind: Option<wgpu::BindGroup>,

    bound: Option<Bound>,
    upload_slot: Option<usize>,
    draws: Vec<RecordedDraw>,

    submitted: u64,
    completed: Arc<AtomicU64>,
}

impl WgpuDevice {
    /// Creates a device rendering into an offscreen `init.width × init.height` target.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new_headless(init: WgpuInit) -> Result<Self> {
        anyhow::ensure!(init.width > 0 && init.height > 0, "render target has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nabu-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        log::info!("wgpu adapter: {:?}", adapter.get_info());

        let default_target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("nabu default target"),
            size: wgpu::Extent3d {
                width: init.width,
                height: init.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: init.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let default_view = default_target.create_view(&wgpu::TextureViewDescriptor::default());

        let white = create_rgba_texture(&device, &queue, "nabu white texture", 1, 1, &[255; 4]);
        let white_view = white.create_view(&wgpu::TextureViewDescriptor::default());

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = Uniforms2D::SIZE.div_ceil(alignment) * alignment;
        let pipelines = Pipelines::new(&device);

        let c = init.clear_color;
        Ok(Self {
            device,
            queue,
            width: init.width,
            height: init.height,
            format: init.format,
            clear_color: wgpu::Color {
                r: f64::from(c.r),
                g: f64::from(c.g),
                b: f64::from(c.b),
                a: f64::from(c.a),
            },
            default_view,
            _default_target: default_target,
            pipelines,
            slots: Vec::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            next_texture: 1,
            next_shader: 1,
            white: white_view,
            samplers: HashMap::new(),
            texture_binds: HashMap::new(),
            uniform_stride,
            uniform_staging: Vec::new(),
            uniform_buffer: None,
            uniform_capacity: 0,
            uniform_bind: None,
            bound: None,
            upload_slot: None,
            draws: Vec::new(),
            submitted: 0,
            completed: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Size of the default target in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    // ── registry ──────────────────────────────────────────────────────────

    /// Registers an sRGB RGBA8 texture. `rgba` holds `width * height * 4` bytes, rows top to bottom.
    pub fn insert_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureHandle, DeviceError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(DeviceError::UploadFailed(format!(
                "texture {width}x{height} needs {expected} bytes, got {}",
                rgba.len()
            )));
        }

        let texture = create_rgba_texture(&self.device, &self.queue, "nabu texture", width, height, rgba);
        Ok(self.register_texture(texture, width, height, false))
    }

    /// Creates a render target usable both as `render_target` and as `texture`
    /// (not both in the same draw). Render targets are not cleared per frame.
    pub fn create_render_target(&mut self, width: u32, height: u32) -> Result<TextureHandle, DeviceError> {
        if width == 0 || height == 0 {
            return Err(DeviceError::UploadFailed(format!("render target {width}x{height} is empty")));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("nabu render target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Ok(self.register_texture(texture, width, height, true))
    }

    fn register_texture(&mut self, texture: wgpu::Texture, width: u32, height: u32, render_target: bool) -> TextureHandle {
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.textures.insert(
            handle,
            TextureEntry {
                _texture: texture,
                view,
                width,
                height,
                render_target,
            },
        );
        handle
    }

    /// Drops a texture and every bind group referencing it. Returns false if unknown.
    pub fn remove_texture(&mut self, handle: TextureHandle) -> bool {
        self.texture_binds.retain(|(tex, _), _| *tex != Some(handle));
        self.textures.remove(&handle).is_some()
    }

    /// Registers a WGSL module providing `fs_main`.
    ///
    /// The module must declare the same bind groups as the standard 2D shader;
    /// the standard vertex stage is kept.
    pub fn insert_shader(&mut self, wgsl: &str) -> ShaderHandle {
        let handle = ShaderHandle(self.next_shader);
        self.next_shader += 1;

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nabu custom shader"),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });
        self.shaders.insert(handle, module);
        handle
    }

    // ── binding helpers ───────────────────────────────────────────────────

    fn target_size(&self, target: Option<TextureHandle>) -> Result<(u32, u32), DeviceError> {
        match target {
            None => Ok((self.width, self.height)),
            Some(h) => self
                .textures
                .get(&h)
                .filter(|t| t.render_target)
                .map(|t| (t.width, t.height))
                .ok_or(DeviceError::UnknownTexture(h)),
        }
    }

    fn ensure_texture_bind(&mut self, key: BindKey) -> Result<(), DeviceError> {
        if self.texture_binds.contains_key(&key) {
            return Ok(());
        }

        let (texture, sampler_state) = key;
        let view = match texture {
            None => &self.white,
            Some(h) => &self.textures.get(&h).ok_or(DeviceError::UnknownTexture(h))?.view,
        };
        let sampler = self
            .samplers
            .entry(sampler_state)
            .or_insert_with(|| self.device.create_sampler(&pipeline::sampler_descriptor(sampler_state)));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu texture bind group"),
            layout: &self.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.texture_binds.insert(key, bind_group);
        Ok(())
    }

    /// Appends one uniform block; returns its dynamic offset.
    fn push_uniforms(&mut self, uniforms: &Uniforms2D) -> u32 {
        let offset = self.uniform_staging.len();
        self.uniform_staging.extend_from_slice(bytemuck::bytes_of(uniforms));
        self.uniform_staging.resize(offset + self.uniform_stride as usize, 0);
        offset as u32
    }

    fn ensure_uniform_capacity(&mut self) {
        let needed = self.uniform_staging.len() as u64;
        if needed <= self.uniform_capacity && self.uniform_buffer.is_some() {
            return;
        }

        let capacity = needed.next_power_of_two().max(self.uniform_stride * 64);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nabu uniforms"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.uniform_bind = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu uniforms bind group"),
            layout: &self.pipelines.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(Uniforms2D::SIZE),
                }),
            }],
        }));
        self.uniform_buffer = Some(buffer);
        self.uniform_capacity = capacity;
    }

    // ── replay ────────────────────────────────────────────────────────────

    /// Encodes every recorded draw. Consecutive draws into the same target share a pass.
    fn encode_frame(&self, draws: &[RecordedDraw]) -> wgpu::CommandEncoder {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("nabu frame encoder"),
        });

        let default_drawn = draws.iter().any(|d| d.state.target.is_none());
        if !default_drawn {
            // Nothing drawn to the default target: clear it anyway.
            drop(self.begin_pass(&mut encoder, None, true));
        }

        let mut cleared_default = false;
        let mut start = 0;
        while start < draws.len() {
            let target = draws[start].state.target;
            let end = draws[start..]
                .iter()
                .position(|d| d.state.target != target)
                .map_or(draws.len(), |n| start + n);

            let clear = target.is_none() && !cleared_default;
            cleared_default |= target.is_none();

            let Some(mut pass) = self.begin_pass(&mut encoder, target, clear) else {
                start = end;
                continue;
            };
            for d in &draws[start..end] {
                self.replay(&mut pass, d);
            }
            drop(pass);
            start = end;
        }
        encoder
    }

    fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        target: Option<TextureHandle>,
        clear: bool,
    ) -> Option<wgpu::RenderPass<'e>> {
        let view = match target {
            None => &self.default_view,
            Some(h) => &self.textures.get(&h)?.view,
        };
        let load = if clear {
            wgpu::LoadOp::Clear(self.clear_color)
        } else {
            wgpu::LoadOp::Load
        };

        Some(encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("nabu 2d pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        }))
    }

    fn replay(&self, pass: &mut wgpu::RenderPass<'_>, d: &RecordedDraw) {
        let s = &d.state;
        let Some(pipeline) = self.pipelines.get(&s.pipeline) else { return };
        let Some(textures) = self.texture_binds.get(&s.bind) else { return };
        let Some(uniforms) = self.uniform_bind.as_ref() else { return };
        let Some(buffers) = self.slots.get(d.slot) else { return };
        let (Some(vbo), Some(ibo)) = (buffers.vertex.as_ref(), buffers.index.as_ref()) else { return };

        let (vx, vy, vw, vh) = s.viewport;
        let (sx, sy, sw, sh) = s.scissor;

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, uniforms, &[s.uniform_offset]);
        pass.set_bind_group(1, textures, &[]);
        pass.set_vertex_buffer(0, vbo.slice(..));
        pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
        pass.set_viewport(vx as f32, vy as f32, vw as f32, vh as f32, 0.0, 1.0);
        pass.set_scissor_rect(sx, sy, sw, sh);
        pass.draw_indexed(d.first_index..d.first_index + d.index_count, d.base_vertex as i32, 0..1);
    }
}

impl GraphicsDevice for WgpuDevice {
    fn upload_buffer(&mut self, slot: usize, vertices: &[Vertex2D], indices: &[Index]) -> Result<(), DeviceError> {
        while self.slots.len() <= slot {
            self.slots.push(SlotBuffers {
                vertex: None,
                vertex_capacity: 0,
                index: None,
                index_capacity: 0,
            });
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        let entry = &mut self.slots[slot];

        ensure_buffer(
            &self.device,
            &mut entry.vertex,
            &mut entry.vertex_capacity,
            vertex_bytes.len() as u64,
            wgpu::BufferUsages::VERTEX,
            "nabu vertex buffer",
        );
        ensure_buffer(
            &self.device,
            &mut entry.index,
            &mut entry.index_capacity,
            index_bytes.len() as u64,
            wgpu::BufferUsages::INDEX,
            "nabu index buffer",
        );

        if let (Some(vbo), false) = (entry.vertex.as_ref(), vertex_bytes.is_empty()) {
            self.queue.write_buffer(vbo, 0, vertex_bytes);
        }
        if let (Some(ibo), false) = (entry.index.as_ref(), index_bytes.is_empty()) {
            self.queue.write_buffer(ibo, 0, index_bytes);
        }

        self.upload_slot = Some(slot);
        Ok(())
    }

    fn bind_state(&mut self, desc: &NativeStateDescriptor) -> Result<(), DeviceError> {
        let state = &desc.state;
        let (tw, th) = self.target_size(state.render_target)?;
        let full = (0, 0, tw, th);

        let viewport = match state.viewport {
            None => Some(full),
            Some(r) => r.clamp_to(tw, th),
        };
        let scissor = match (state.rasterizer.scissor_enable, state.scissor_rect) {
            (true, Some(r)) => r.clamp_to(tw, th),
            _ => Some(full),
        };

        let shader = match state.shader_program {
            None => None,
            Some(h) => Some(self.shaders.get(&h).ok_or(DeviceError::UnknownShader(h))?),
        };
        let key = PipelineKey {
            blend: state.blend,
            rasterizer: state.rasterizer,
            shader: state.shader_program,
            format: self.format,
        };
        self.pipelines.ensure(&self.device, key, shader);

        let bind = (state.texture, state.samplers[0]);
        self.ensure_texture_bind(bind)?;

        let (_, _, vw, vh) = viewport.unwrap_or(full);
        let uniform_offset = self.push_uniforms(&Uniforms2D::new(desc, vw, vh));

        self.bound = Some(Bound {
            target: state.render_target,
            pipeline: key,
            bind,
            uniform_offset,
            viewport: viewport.unwrap_or(full),
            scissor: scissor.unwrap_or(full),
            culled: viewport.is_none() || scissor.is_none(),
        });
        Ok(())
    }

    fn draw_indexed(&mut self, index_offset: u32, index_count: u32, base_vertex: u32) -> Result<(), DeviceError> {
        let Some(slot) = self.upload_slot else {
            return Err(DeviceError::UploadFailed("draw issued before any upload this frame".into()));
        };
        let Some(state) = self.bound else {
            log::warn!("draw issued with no bound state; skipped");
            return Ok(());
        };
        if state.culled || index_count == 0 {
            return Ok(());
        }

        self.draws.push(RecordedDraw {
            state,
            slot,
            first_index: index_offset,
            index_count,
            base_vertex,
        });
        Ok(())
    }

    fn get_frame_fence(&mut self, _slot: usize) -> Result<FenceHandle, DeviceError> {
        let mut draws = std::mem::take(&mut self.draws);

        self.ensure_uniform_capacity();
        if let (Some(ubo), false) = (self.uniform_buffer.as_ref(), self.uniform_staging.is_empty()) {
            self.queue.write_buffer(ubo, 0, &self.uniform_staging);
        }

        let encoder = self.encode_frame(&draws);
        self.queue.submit(std::iter::once(encoder.finish()));

        self.submitted += 1;
        let serial = self.submitted;
        let completed = Arc::clone(&self.completed);
        self.queue.on_submitted_work_done(move || {
            completed.fetch_max(serial, Ordering::AcqRel);
        });

        self.uniform_staging.clear();
        self.bound = None;
        self.upload_slot = None;
        draws.clear();
        self.draws = draws;

        Ok(FenceHandle(serial))
    }

    fn wait_fence(&mut self, fence: FenceHandle, timeout: Duration) -> Result<(), DeviceError> {
        let started = Instant::now();
        loop {
            if self.completed.load(Ordering::Acquire) >= fence.0 {
                return Ok(());
            }
            let waited = started.elapsed();
            if waited >= timeout {
                log::error!("{fence} still pending after {waited:?}");
                return Err(DeviceError::FenceTimeout { fence, waited });
            }
            self.device
                .poll(wgpu::PollType::Poll)
                .map_err(|e| DeviceError::DeviceLost(e.to_string()))?;
            std::thread::sleep(Duration::from_micros(100));
        }
    }
}

/// (Re)creates `buffer` when it cannot hold `needed` bytes. Grows to the next power of two.
fn ensure_buffer(
    device: &wgpu::Device,
    buffer: &mut Option<wgpu::Buffer>,
    capacity: &mut u64,
    needed: u64,
    usage: wgpu::BufferUsages,
    label: &'static str,
) {
    if needed <= *capacity && buffer.is_some() {
        return;
    }

    let size = needed.next_power_of_two().max(4096);
    *buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    }));
    log::debug!("{label}: {} -> {size} bytes", *capacity);
    *capacity = size;
}

fn create_rgba_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &'static str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );
    texture
}
