//! Input device enumeration via the cpal default host.

use cpal::traits::{DeviceTrait, HostTrait};

use pcm_capture_core::models::error::DeviceError;

/// An input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceInfo {
    pub name: String,
    pub is_default: bool,
    /// Sample rates the device accepts, as the overall min and max across its configs.
    pub sample_rate_range: Option<(u32, u32)>,
    pub max_channels: u16,
}

impl InputDeviceInfo {
    pub fn supports_rate(&self, sample_rate_hz: u32) -> bool {
        self.sample_rate_range
            .map(|(min, max)| min <= sample_rate_hz && sample_rate_hz <= max)
            .unwrap_or(false)
    }
}

/// List input devices so a caller can offer a device selector.
pub fn list_input_devices() -> Result<Vec<InputDeviceInfo>, DeviceError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());
    let devices = host
        .input_devices()
        .map_err(|e| DeviceError::Backend(format!("failed to enumerate input devices: {}", e)))?;

    let mut infos = Vec::new();
    for device in devices {
        let Ok(name) = device.name() else {
            continue;
        };

        let mut sample_rate_range: Option<(u32, u32)> = None;
        let mut max_channels = 0;
        match device.supported_input_configs() {
            Ok(ranges) => {
                for range in ranges {
                    let (lo, hi) = (range.min_sample_rate().0, range.max_sample_rate().0);
                    sample_rate_range = Some(match sample_rate_range {
                        Some((min, max)) => (min.min(lo), max.max(hi)),
                        None => (lo, hi),
                    });
                    max_channels = max_channels.max(range.channels());
                }
            }
            Err(e) => log::debug!("Skipping configs for '{}': {}", name, e),
        }

        infos.push(InputDeviceInfo {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
            sample_rate_range,
            max_channels,
        });
    }
    Ok(infos)
}
