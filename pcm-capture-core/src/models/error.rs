use thiserror::Error;

/// Device error codes returned by [`InputDevice::read`](crate::traits::input_device::InputDevice::read).
pub mod codes {
    pub const ERROR: i32 = -1;
    pub const ERROR_INVALID_OPERATION: i32 = -2;
    pub const ERROR_BAD_VALUE: i32 = -3;
    pub const ERROR_DEAD_OBJECT: i32 = -6;
}

/// Errors computing the transfer buffer size.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SizingError {
    #[error("platform has no buffer size for {sample_rate_hz} Hz {channels}-channel {encoding}")]
    UnsupportedConfig {
        sample_rate_hz: u32,
        channels: u16,
        encoding: &'static str,
    },

    #[error("invalid capture config: {0}")]
    InvalidConfig(String),

    #[error("buffer size overflows: {minimum} bytes x {factor}")]
    Overflow { minimum: usize, factor: u32 },
}

/// Errors returned synchronously by `CaptureEngine::start`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("already recording")]
    AlreadyRecording,

    #[error(transparent)]
    Sizing(#[from] SizingError),

    #[error("device not available: {0}")]
    DeviceUnavailable(String),

    #[error("failed to spawn capture thread: {0}")]
    ThreadSpawn(String),

    #[error("start called from the capture thread")]
    CalledFromCaptureThread,
}

/// Why a device read failed, decoded from its negative status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadFailureReason {
    InvalidOperation,
    BadValue,
    DeadObject,
    Generic,
    Unknown(i32),
}

impl ReadFailureReason {
    /// Map a device status code to a reason. Total over `i32`.
    pub fn from_code(code: i32) -> Self {
        match code {
            codes::ERROR_INVALID_OPERATION => Self::InvalidOperation,
            codes::ERROR_BAD_VALUE => Self::BadValue,
            codes::ERROR_DEAD_OBJECT => Self::DeadObject,
            codes::ERROR => Self::Generic,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for ReadFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOperation => f.write_str("ERROR_INVALID_OPERATION"),
            Self::BadValue => f.write_str("ERROR_BAD_VALUE"),
            Self::DeadObject => f.write_str("ERROR_DEAD_OBJECT"),
            Self::Generic => f.write_str("ERROR"),
            Self::Unknown(code) => write!(f, "Unknown ({})", code),
        }
    }
}

/// Errors raised on the capture thread and delivered through the delegate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("reading of audio buffer failed: {0}")]
    DeviceReadFailed(ReadFailureReason),

    #[error("writing of recorded audio failed: {0}")]
    SinkWriteFailed(String),

    #[error("closing the output sink failed: {0}")]
    SinkCloseFailed(String),
}

/// Errors reported by a platform when opening or driving an input device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("no input device available")]
    NotFound,

    #[error("device busy: {0}")]
    Busy(String),

    #[error("unsupported stream config: {0}")]
    UnsupportedConfig(String),

    #[error("device backend error: {0}")]
    Backend(String),
}

/// Errors reading or writing recording metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("failed to serialize metadata: {0}")]
    Serialize(String),

    #[error("metadata I/O failed: {0}")]
    Io(String),
}
