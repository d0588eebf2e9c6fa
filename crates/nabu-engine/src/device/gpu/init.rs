use crate::paint::Color;

/// Initialization parameters for the wgpu backend.
///
/// The backend renders into an offscreen default target of `width × height`
/// texels; nothing is presented. Add configuration only when a concrete
/// backend requirement exists.
#[derive(Debug, Clone)]
pub struct WgpuInit {
    pub width: u32,
    pub height: u32,

    /// Format of the default target and of render targets created later.
    pub format: wgpu::TextureFormat,

    /// Color the default target is cleared to at the start of each frame.
    pub clear_color: Color,

    pub power_preference: wgpu::PowerPreference,

    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    /// Required wgpu features.
    ///
    /// Wireframe fill needs `POLYGON_MODE_LINE`; without it wireframe draws
    /// fall back to solid fill.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for WgpuInit {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            clear_color: Color::new(0.8, 0.9, 1.0, 1.0),
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: wgpu::Backends::all(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
