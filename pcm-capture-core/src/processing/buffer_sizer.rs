use crate::models::config::CaptureConfig;
use crate::models::error::SizingError;
use crate::traits::audio_platform::AudioPlatform;

/// Compute the transfer buffer size in bytes for `config`.
///
/// Asks the platform for its minimum buffer size and multiplies it by
/// `buffer_scale_factor`. A reported minimum of zero is treated as one byte.
pub fn compute_buffer_size<P: AudioPlatform + ?Sized>(
    platform: &P,
    config: &CaptureConfig,
) -> Result<usize, SizingError> {
    config.validate().map_err(SizingError::InvalidConfig)?;

    let minimum = platform
        .min_buffer_size(config.sample_rate_hz, config.channel_mask, config.sample_format)
        .ok_or(SizingError::UnsupportedConfig {
            sample_rate_hz: config.sample_rate_hz,
            channels: config.channel_mask.channel_count(),
            encoding: config.sample_format.encoding_name(),
        })?
        .max(1);

    minimum
        .checked_mul(config.buffer_scale_factor as usize)
        .ok_or(SizingError::Overflow {
            minimum,
            factor: config.buffer_scale_factor,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{ChannelMask, SampleFormat};
    use crate::models::error::DeviceError;
    use crate::traits::input_device::InputDevice;

    /// Platform that reports a fixed minimum for one sample rate only.
    struct FixedPlatform {
        rate: u32,
        minimum: usize,
    }

    impl AudioPlatform for FixedPlatform {
        fn min_buffer_size(&self, rate: u32, _: ChannelMask, _: SampleFormat) -> Option<usize> {
            (rate == self.rate).then_some(self.minimum)
        }

        fn open(&self, _: &CaptureConfig, _: usize) -> Result<Box<dyn InputDevice>, DeviceError> {
            Err(DeviceError::NotFound)
        }
    }

    fn config(rate: u32, factor: u32) -> CaptureConfig {
        CaptureConfig {
            sample_rate_hz: rate,
            buffer_scale_factor: factor,
            ..Default::default()
        }
    }

    #[test]
    fn scales_platform_minimum() {
        let platform = FixedPlatform { rate: 44100, minimum: 3584 };
        for factor in [1, 2, 3, 8] {
            let size = compute_buffer_size(&platform, &config(44100, factor)).unwrap();
            assert_eq!(size, 3584 * factor as usize);
            assert!(size >= 3584);
        }
    }

    #[test]
    fn unsupported_rate() {
        let platform = FixedPlatform { rate: 44100, minimum: 3584 };
        let err = compute_buffer_size(&platform, &config(12345, 2)).unwrap_err();
        assert_eq!(
            err,
            SizingError::UnsupportedConfig {
                sample_rate_hz: 12345,
                channels: 1,
                encoding: "pcm_s16le",
            }
        );
    }

    #[test]
    fn zero_minimum_is_clamped_to_one() {
        let platform = FixedPlatform { rate: 8000, minimum: 0 };
        assert_eq!(compute_buffer_size(&platform, &config(8000, 4)).unwrap(), 4);
    }

    #[test]
    fn invalid_config_is_rejected_before_querying() {
        let platform = FixedPlatform { rate: 8000, minimum: 640 };
        let err = compute_buffer_size(&platform, &config(8000, 0)).unwrap_err();
        assert!(matches!(err, SizingError::InvalidConfig(_)));
    }

    #[test]
    fn overflow_is_reported() {
        let platform = FixedPlatform { rate: 8000, minimum: usize::MAX / 2 };
        let err = compute_buffer_size(&platform, &config(8000, 3)).unwrap_err();
        assert!(matches!(err, SizingError::Overflow { factor: 3, .. }));
    }
}
