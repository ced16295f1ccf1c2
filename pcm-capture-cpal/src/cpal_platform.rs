//! `AudioPlatform` implementation on top of cpal's default host.

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{SampleRate, SupportedBufferSize, SupportedStreamConfigRange};

use pcm_capture_core::models::config::{CaptureConfig, ChannelMask, SampleFormat};
use pcm_capture_core::models::error::DeviceError;
use pcm_capture_core::traits::audio_platform::AudioPlatform;
use pcm_capture_core::traits::input_device::InputDevice;

use crate::cpal_device::{CpalInputDevice, StreamParams};

/// Shortest buffer handed out, in milliseconds of audio, whatever the host reports.
const MIN_BUFFER_MS: u32 = 20;

/// Options for the cpal platform.
#[derive(Debug, Clone)]
pub struct CpalPlatformOptions {
    /// Input device to use by name, or None for the host default.
    pub device_name: Option<String>,

    /// How long a read waits for callback data before reporting a dead device
    /// (default: 2 s). Bounds how long `stop` can block on a stalled device.
    pub read_timeout: Duration,

    /// Callback buffers queued between the audio thread and the reader
    /// (default: 64). Overflowing buffers are dropped and counted.
    pub channel_capacity: usize,
}

impl Default for CpalPlatformOptions {
    fn default() -> Self {
        Self {
            device_name: None,
            read_timeout: Duration::from_secs(2),
            channel_capacity: 64,
        }
    }
}

/// Audio platform backed by cpal input devices.
///
/// Devices that cannot capture mono natively are opened with their narrowest
/// layout and downmixed; non-i16 sample formats are converted on the fly.
pub struct CpalPlatform {
    options: CpalPlatformOptions,
}

impl CpalPlatform {
    pub fn new(options: CpalPlatformOptions) -> Self {
        Self { options }
    }

    /// Platform using the host's default input device.
    pub fn default_device() -> Self {
        Self::new(CpalPlatformOptions::default())
    }

    /// Platform using the input device named `name`.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self::new(CpalPlatformOptions {
            device_name: Some(name.into()),
            ..Default::default()
        })
    }

    pub fn options(&self) -> &CpalPlatformOptions {
        &self.options
    }

    fn find_device(&self) -> Result<cpal::Device, DeviceError> {
        let host = cpal::default_host();
        match self.options.device_name {
            Some(ref name) => host
                .input_devices()
                .map_err(|e| DeviceError::Backend(e.to_string()))?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or(DeviceError::NotFound),
            None => host.default_input_device().ok_or(DeviceError::NotFound),
        }
    }

    fn supported_range(&self, device: &cpal::Device, sample_rate_hz: u32) -> Option<SupportedStreamConfigRange> {
        let ranges: Vec<_> = match device.supported_input_configs() {
            Ok(ranges) => ranges.collect(),
            Err(e) => {
                log::warn!("Could not query input configs: {}", e);
                return None;
            }
        };
        pick_config_range(ranges, sample_rate_hz)
    }
}

impl AudioPlatform for CpalPlatform {
    fn min_buffer_size(
        &self,
        sample_rate_hz: u32,
        channel_mask: ChannelMask,
        sample_format: SampleFormat,
    ) -> Option<usize> {
        let device = match self.find_device() {
            Ok(device) => device,
            Err(e) => {
                log::warn!("No input device for buffer sizing: {}", e);
                return None;
            }
        };
        let range = self.supported_range(&device, sample_rate_hz)?;
        let bytes_per_frame = channel_mask.channel_count() as usize * sample_format.bytes_per_sample();
        Some(min_buffer_bytes(range.buffer_size(), sample_rate_hz, bytes_per_frame))
    }

    fn open(&self, config: &CaptureConfig, buffer_size: usize) -> Result<Box<dyn InputDevice>, DeviceError> {
        let device = self.find_device()?;
        let name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());
        let range = self.supported_range(&device, config.sample_rate_hz).ok_or_else(|| {
            DeviceError::UnsupportedConfig(format!("{} Hz not supported by '{}'", config.sample_rate_hz, name))
        })?;

        let supported = range.with_sample_rate(SampleRate(config.sample_rate_hz));
        let sample_format = supported.sample_format();
        let stream_config = supported.config();

        log::info!(
            "Opening '{}': format={:?} sample_rate={}Hz channels={} buffer={} bytes",
            name,
            sample_format,
            config.sample_rate_hz,
            stream_config.channels,
            buffer_size
        );

        let device = CpalInputDevice::open(StreamParams {
            device,
            config: stream_config,
            sample_format,
            channel_capacity: self.options.channel_capacity,
            read_timeout: self.options.read_timeout,
        })?;
        Ok(Box::new(device))
    }
}

/// Choose a config range covering `sample_rate_hz`.
///
/// Prefers fewer channels, then i16 over f32 over u16. Other sample formats
/// are not converted and never chosen.
pub(crate) fn pick_config_range(
    ranges: Vec<SupportedStreamConfigRange>,
    sample_rate_hz: u32,
) -> Option<SupportedStreamConfigRange> {
    ranges
        .into_iter()
        .filter(|r| r.min_sample_rate().0 <= sample_rate_hz && sample_rate_hz <= r.max_sample_rate().0)
        .filter_map(|r| format_rank(r.sample_format()).map(|rank| (r.channels(), rank, r)))
        .min_by_key(|(channels, rank, _)| (*channels, *rank))
        .map(|(_, _, r)| r)
}

fn format_rank(format: cpal::SampleFormat) -> Option<u8> {
    match format {
        cpal::SampleFormat::I16 => Some(0),
        cpal::SampleFormat::F32 => Some(1),
        cpal::SampleFormat::U16 => Some(2),
        _ => None,
    }
}

/// Minimum transfer buffer in bytes: the host's minimum period, but never
/// less than `MIN_BUFFER_MS` of audio.
pub(crate) fn min_buffer_bytes(buffer_size: &SupportedBufferSize, sample_rate_hz: u32, bytes_per_frame: usize) -> usize {
    let floor_frames = (sample_rate_hz as u64 * MIN_BUFFER_MS as u64 / 1000).max(1) as usize;
    let host_frames = match buffer_size {
        SupportedBufferSize::Range { min, .. } => *min as usize,
        SupportedBufferSize::Unknown => 0,
    };
    host_frames.max(floor_frames) * bytes_per_frame
}
