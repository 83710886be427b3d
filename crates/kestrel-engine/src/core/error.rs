use thiserror::Error;

/// Errors surfaced by the render-system layer.
///
/// Configuration and invariant errors are raised before any native resource is
/// touched. Device errors are transient and handled by the recovery walk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Duplicate target name, priority out of range, second primary target.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller supplied a combination of parameters the layer cannot honour.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The backend does not implement an optional capability.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The device has been lost; resources must be recovered before rendering resumes.
    #[error("device lost")]
    DeviceLost,

    /// One resource stayed lost after a device reset. The device itself is live.
    #[error("resource `{0}` failed to recover from device loss")]
    ResourceLost(String),

    /// The backend could not reset the device after a loss.
    #[error("device reset failed: {0}")]
    DeviceResetFailed(String),

    /// Invariant violation. Not recoverable at this layer.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RenderError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns `true` for errors the device-recovery path can clear.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceLost | Self::DeviceResetFailed(_))
    }
}

/// Result alias used throughout the engine.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
