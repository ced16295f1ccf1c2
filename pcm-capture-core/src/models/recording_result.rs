use serde::{Deserialize, Serialize};

use super::config::CaptureConfig;

/// Totals for a finished capture session, reported to the delegate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSummary {
    pub bytes_written: u64,
    pub cycles: u64,
    pub buffer_size: usize,
    /// Seconds of audio represented by `bytes_written`.
    pub duration_secs: f64,
}

impl CaptureSummary {
    pub fn new(config: &CaptureConfig, buffer_size: usize, cycles: u64, bytes_written: u64) -> Self {
        Self {
            bytes_written,
            cycles,
            buffer_size,
            duration_secs: config.duration_secs(bytes_written),
        }
    }
}

/// Out-of-band description of a raw PCM recording.
///
/// Raw PCM carries no header, so players need this to interpret the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: String,
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub encoding: String,
    pub bytes_written: u64,
    pub duration_secs: f64,
    pub checksum: String,
}

impl RecordingMetadata {
    pub fn new(
        config: &CaptureConfig,
        file_path: &str,
        bytes_written: u64,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path: file_path.to_string(),
            sample_rate_hz: config.sample_rate_hz,
            channels: config.channel_mask.channel_count(),
            bits_per_sample: config.sample_format.bits_per_sample(),
            encoding: config.sample_format.encoding_name().to_string(),
            bytes_written,
            duration_secs: config.duration_secs(bytes_written),
            checksum: checksum.to_string(),
        }
    }
}
