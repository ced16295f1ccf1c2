use crate::models::config::{CaptureConfig, ChannelMask, SampleFormat};
use crate::models::error::DeviceError;
use crate::traits::input_device::InputDevice;

/// Interface to the platform audio subsystem.
///
/// Implemented by:
/// - `CpalPlatform` (pcm-capture-cpal)
/// - test doubles that script device behaviour
pub trait AudioPlatform: Send + Sync {
    /// Minimum transfer buffer size in bytes for the given stream parameters.
    ///
    /// Returns `None` when the platform cannot capture with these parameters
    /// at all (for example an unsupported sample rate).
    fn min_buffer_size(
        &self,
        sample_rate_hz: u32,
        channel_mask: ChannelMask,
        sample_format: SampleFormat,
    ) -> Option<usize>;

    /// Open an input device for `config`, staging reads of `buffer_size` bytes.
    ///
    /// The returned device is opened but not yet capturing.
    fn open(
        &self,
        config: &CaptureConfig,
        buffer_size: usize,
    ) -> Result<Box<dyn InputDevice>, DeviceError>;
}
