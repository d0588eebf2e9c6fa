//! Render state → wgpu object conversion and the pipeline cache.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::device::{NativeStateDescriptor, ShaderHandle};
use crate::render::{
    AddressMode, BlendFactor, BlendOp, BlendState, CullMode, FillMode, FilterMode, RasterizerState,
    SamplerState, Vertex2D,
};

// ── blend ─────────────────────────────────────────────────────────────────

fn blend_factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

fn blend_op(op: BlendOp) -> wgpu::BlendOperation {
    match op {
        BlendOp::Add => wgpu::BlendOperation::Add,
        BlendOp::Subtract => wgpu::BlendOperation::Subtract,
        BlendOp::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        BlendOp::Min => wgpu::BlendOperation::Min,
        BlendOp::Max => wgpu::BlendOperation::Max,
    }
}

/// wgpu requires `One` factors for `Min`/`Max`.
fn blend_component(src: BlendFactor, dst: BlendFactor, op: BlendOp) -> wgpu::BlendComponent {
    let (src, dst) = match op {
        BlendOp::Min | BlendOp::Max => (BlendFactor::One, BlendFactor::One),
        _ => (src, dst),
    };
    wgpu::BlendComponent {
        src_factor: blend_factor(src),
        dst_factor: blend_factor(dst),
        operation: blend_op(op),
    }
}

pub(super) fn blend_state(b: BlendState) -> Option<wgpu::BlendState> {
    b.enabled.then(|| wgpu::BlendState {
        color: blend_component(b.src, b.dst, b.op),
        alpha: blend_component(b.src_alpha, b.dst_alpha, b.op_alpha),
    })
}

// ── rasterizer / sampler ──────────────────────────────────────────────────

pub(super) fn cull_mode(c: CullMode) -> Option<wgpu::Face> {
    match c {
        CullMode::None => None,
        CullMode::Front => Some(wgpu::Face::Front),
        CullMode::Back => Some(wgpu::Face::Back),
    }
}

fn address_mode(a: AddressMode) -> wgpu::AddressMode {
    match a {
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
        AddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
    }
}

fn filter_mode(f: FilterMode) -> wgpu::FilterMode {
    match f {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

pub(super) fn sampler_descriptor(s: SamplerState) -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("nabu sampler"),
        address_mode_u: address_mode(s.address_u),
        address_mode_v: address_mode(s.address_v),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter_mode(s.mag_filter),
        min_filter: filter_mode(s.min_filter),
        ..Default::default()
    }
}

// ── uniforms / vertex layout ──────────────────────────────────────────────

/// Per-draw constants; mirrors `Uniforms` in `shader.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct Uniforms2D {
    pub transform: [[f32; 4]; 2],
    pub color_mul: [f32; 4],
    pub color_add: [f32; 4],
    pub viewport: [f32; 4],
}

impl Uniforms2D {
    pub(super) const SIZE: u64 = std::mem::size_of::<Uniforms2D>() as u64;

    pub(super) fn new(desc: &NativeStateDescriptor, viewport_w: u32, viewport_h: u32) -> Self {
        Self {
            transform: desc.vs_constants.transform,
            color_mul: desc.vs_constants.color_mul,
            color_add: desc.ps_constants.color_add,
            viewport: [viewport_w as f32, viewport_h as f32, 0.0, 0.0],
        }
    }
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x2, // tex
    2 => Float32x4  // color
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2D>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

// ── pipeline cache ────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub blend: BlendState,
    pub rasterizer: RasterizerState,
    pub shader: Option<ShaderHandle>,
    pub format: wgpu::TextureFormat,
}

/// Bind group layouts shared by every pipeline plus the pipelines built so far.
///
/// Group 0 holds the dynamic-offset uniform block, group 1 the texture and sampler.
pub(super) struct Pipelines {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    layout: wgpu::PipelineLayout,
    standard: wgpu::ShaderModule,
    cache: HashMap<PipelineKey, wgpu::RenderPipeline>,
    polygon_line: bool,
    warned_wireframe: bool,
}

impl Pipelines {
    pub(super) fn new(device: &wgpu::Device) -> Self {
        let standard = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nabu 2d shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu uniforms bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(Uniforms2D::SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nabu pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        Self {
            uniform_layout,
            texture_layout,
            layout,
            standard,
            cache: HashMap::new(),
            polygon_line: device.features().contains(wgpu::Features::POLYGON_MODE_LINE),
            warned_wireframe: false,
        }
    }

    /// Builds the pipeline for `key` unless it is cached.
    ///
    /// `fragment` is the module providing `fs_main`; `None` uses the standard one.
    pub(super) fn ensure(&mut self, device: &wgpu::Device, key: PipelineKey, fragment: Option<&wgpu::ShaderModule>) {
        if self.cache.contains_key(&key) {
            return;
        }

        let polygon_mode = match key.rasterizer.fill_mode {
            FillMode::Solid => wgpu::PolygonMode::Fill,
            FillMode::Wireframe if self.polygon_line => wgpu::PolygonMode::Line,
            FillMode::Wireframe => {
                if !self.warned_wireframe {
                    log::warn!("wireframe fill needs POLYGON_MODE_LINE; drawing solid instead");
                    self.warned_wireframe = true;
                }
                wgpu::PolygonMode::Fill
            }
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("nabu 2d pipeline"),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &self.standard,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment.unwrap_or(&self.standard),
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend: blend_state(key.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: cull_mode(key.rasterizer.cull_mode),
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("pipeline created ({} cached)", self.cache.len() + 1);
        self.cache.insert(key, pipeline);
    }

    #[inline]
    pub(super) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.cache.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_disables_blending() {
        assert!(blend_state(BlendState::OPAQUE).is_none());
    }

    #[test]
    fn default_blend_is_straight_alpha() {
        let b = blend_state(BlendState::DEFAULT).unwrap_or(wgpu::BlendState::REPLACE);
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(b.alpha.src_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn min_max_force_unit_factors() {
        let c = blend_component(BlendFactor::SrcAlpha, BlendFactor::Zero, BlendOp::Max);
        assert_eq!((c.src_factor, c.dst_factor), (wgpu::BlendFactor::One, wgpu::BlendFactor::One));
    }

    #[test]
    fn uniforms_fit_dynamic_stride() {
        assert_eq!(Uniforms2D::SIZE, 80);
        assert!(Uniforms2D::SIZE <= 256);
    }

    #[test]
    fn sampler_modes_map() {
        let d = sampler_descriptor(SamplerState::REPEAT_NEAREST);
        assert_eq!(d.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(d.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(cull_mode(CullMode::Back), Some(wgpu::Face::Back));
    }
}
