/// Source/destination factor for a blend equation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Combining operation for a blend equation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Backend-neutral blend configuration.
///
/// `enabled == false` writes the source color unmodified; the factor fields are
/// then ignored by backends but still take part in equality.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub enabled: bool,
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub op: BlendOp,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub op_alpha: BlendOp,
}

impl BlendState {
    /// Straight-alpha "over" compositing.
    pub const DEFAULT: BlendState = BlendState::new(
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendOp::Add,
    );

    pub const OPAQUE: BlendState = BlendState {
        enabled: false,
        ..BlendState::DEFAULT
    };

    pub const ADDITIVE: BlendState =
        BlendState::new(BlendFactor::SrcAlpha, BlendFactor::One, BlendOp::Add);

    pub const SUBTRACTIVE: BlendState =
        BlendState::new(BlendFactor::SrcAlpha, BlendFactor::One, BlendOp::ReverseSubtract);

    pub const MULTIPLICATIVE: BlendState =
        BlendState::new(BlendFactor::Zero, BlendFactor::SrcColor, BlendOp::Add);

    /// Compositing for colors that already carry `rgb * a`.
    pub const PREMULTIPLIED: BlendState =
        BlendState::new(BlendFactor::One, BlendFactor::OneMinusSrcAlpha, BlendOp::Add);

    /// Color equation as given; alpha accumulates with `One, OneMinusSrcAlpha`.
    pub const fn new(src: BlendFactor, dst: BlendFactor, op: BlendOp) -> Self {
        Self {
            enabled: true,
            src,
            dst,
            op,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
            op_alpha: BlendOp::Add,
        }
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::DEFAULT
    }
}
