use std::time::Duration;

use super::{FenceHandle, ShaderHandle, TextureHandle};

/// Failure reported by a [`GraphicsDevice`](super::GraphicsDevice).
///
/// Every variant is fatal for the frame in which it occurs. The caller is expected
/// to recreate GPU resources before the next frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    #[error("graphics device lost: {0}")]
    DeviceLost(String),

    #[error("{fence} did not signal within {waited:?}")]
    FenceTimeout { fence: FenceHandle, waited: Duration },

    #[error("buffer upload failed: {0}")]
    UploadFailed(String),

    #[error("{0} is not registered with the device")]
    UnknownTexture(TextureHandle),

    #[error("{0} is not registered with the device")]
    UnknownShader(ShaderHandle),
}
