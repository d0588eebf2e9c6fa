/// Number of sampler slots tracked in [`RenderState2D`](super::RenderState2D).
pub const MAX_SAMPLER_SLOTS: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Clamp,
    Repeat,
    Mirror,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Backend-neutral texture sampling configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SamplerState {
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl SamplerState {
    const fn uniform(address: AddressMode, filter: FilterMode) -> Self {
        Self {
            address_u: address,
            address_v: address,
            min_filter: filter,
            mag_filter: filter,
        }
    }

    pub const CLAMP_LINEAR: SamplerState = SamplerState::uniform(AddressMode::Clamp, FilterMode::Linear);
    pub const CLAMP_NEAREST: SamplerState = SamplerState::uniform(AddressMode::Clamp, FilterMode::Nearest);
    pub const REPEAT_LINEAR: SamplerState = SamplerState::uniform(AddressMode::Repeat, FilterMode::Linear);
    pub const REPEAT_NEAREST: SamplerState = SamplerState::uniform(AddressMode::Repeat, FilterMode::Nearest);
    pub const MIRROR_LINEAR: SamplerState = SamplerState::uniform(AddressMode::Mirror, FilterMode::Linear);

    pub const DEFAULT_2D: SamplerState = SamplerState::CLAMP_LINEAR;
}

impl Default for SamplerState {
    fn default() -> Self {
        Self::DEFAULT_2D
    }
}
