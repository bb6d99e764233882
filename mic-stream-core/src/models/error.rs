use thiserror::Error;

/// Errors that can occur during capture operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("device not available: {0}")]
    DeviceUnavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("session is already recording")]
    AlreadyRecording,

    #[error("read anomaly: {got} of {requested} samples")]
    ReadAnomaly { requested: usize, got: usize },

    #[error("device fault: {0}")]
    DeviceFault(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Whether the read loop may log this error and keep pulling buffers.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ReadAnomaly { .. })
    }
}
