#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillMode {
    Solid,
    Wireframe,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Backend-neutral rasterizer configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    /// The scissor rect of the render state is honored only when this is set.
    pub scissor_enable: bool,
}

impl RasterizerState {
    pub const DEFAULT_2D: RasterizerState = RasterizerState {
        fill_mode: FillMode::Solid,
        cull_mode: CullMode::None,
        scissor_enable: false,
    };

    pub const SCISSOR_2D: RasterizerState = RasterizerState {
        scissor_enable: true,
        ..RasterizerState::DEFAULT_2D
    };

    pub const WIREFRAME_2D: RasterizerState = RasterizerState {
        fill_mode: FillMode::Wireframe,
        ..RasterizerState::DEFAULT_2D
    };

    pub const SOLID_CULL_BACK: RasterizerState = RasterizerState {
        cull_mode: CullMode::Back,
        ..RasterizerState::DEFAULT_2D
    };
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self::DEFAULT_2D
    }
}
