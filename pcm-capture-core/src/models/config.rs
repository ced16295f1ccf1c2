use serde::{Deserialize, Serialize};

/// Input channel layout. Only mono capture is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMask {
    Mono,
}

impl ChannelMask {
    pub fn channel_count(&self) -> u16 {
        match self {
            Self::Mono => 1,
        }
    }
}

/// Sample encoding delivered by the device and persisted to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Signed 16-bit little-endian PCM.
    #[serde(rename = "pcm16")]
    Pcm16,
}

impl SampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Pcm16 => 2,
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        (self.bytes_per_sample() * 8) as u16
    }

    /// Short codec-style name, as written to metadata sidecars.
    pub fn encoding_name(&self) -> &'static str {
        match self {
            Self::Pcm16 => "pcm_s16le",
        }
    }
}

/// How many bytes of the transfer buffer each capture cycle appends to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Always append the full buffer capacity, whatever the read returned.
    ///
    /// Matches recordings made by earlier versions byte for byte. When a read
    /// comes back short, the tail of the chunk holds bytes from a previous cycle.
    #[default]
    FullBuffer,

    /// Append only the bytes the device actually produced.
    BytesRead,
}

/// Configuration for a capture engine.
///
/// Created once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Sample rate in Hz (default: 44100). Must be non-zero.
    pub sample_rate_hz: u32,

    /// Channel layout (default: mono).
    pub channel_mask: ChannelMask,

    /// Sample encoding (default: 16-bit PCM).
    pub sample_format: SampleFormat,

    /// Multiplier applied to the platform's minimum buffer size (default: 2).
    ///
    /// Larger factors make dropped samples less likely at the cost of memory
    /// and stop latency. Must be at least 1; there is no upper bound.
    pub buffer_scale_factor: u32,

    /// Bytes appended per cycle (default: full buffer).
    pub write_policy: WritePolicy,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.buffer_scale_factor == 0 {
            return Err("buffer scale factor must be at least 1".into());
        }
        Ok(())
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid capture config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.channel_mask.channel_count() as usize * self.sample_format.bytes_per_sample()
    }

    /// Bytes of audio produced per second of capture.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate_hz as u64 * self.bytes_per_frame() as u64
    }

    /// Seconds of audio in `bytes` of captured PCM.
    pub fn duration_secs(&self, bytes: u64) -> f64 {
        match self.byte_rate() {
            0 => 0.0,
            rate => bytes as f64 / rate as f64,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            channel_mask: ChannelMask::Mono,
            sample_format: SampleFormat::Pcm16,
            buffer_scale_factor: 2,
            write_policy: WritePolicy::FullBuffer,
        }
    }
}
