//! # pcm-capture-core
//!
//! Platform-agnostic PCM capture core library.
//!
//! Sizes a hardware transfer buffer, runs a read → write capture loop on a
//! dedicated thread, and persists raw 16-bit mono PCM to an output sink.
//! Platform backends (cpal, test doubles) implement the `AudioPlatform` and
//! `InputDevice` traits and plug into the generic `CaptureEngine`.
//!
//! ## Architecture
//!
//! ```text
//! pcm-capture-core (this crate)
//! ├── traits/       ← AudioPlatform, InputDevice, OutputSink, CaptureDelegate
//! ├── models/       ← CaptureConfig, CaptureState, error types, CaptureSummary
//! ├── processing/   ← buffer sizing, TransferBuffer
//! ├── session/      ← CaptureEngine, CaptureLoop, ChannelDelegate
//! └── storage/      ← FileSink, MemorySink, metadata sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{CaptureConfig, ChannelMask, SampleFormat, WritePolicy};
pub use models::error::{
    codes, CaptureError, DeviceError, ReadFailureReason, SizingError, StartError, StorageError,
};
pub use models::recording_result::{CaptureSummary, RecordingMetadata};
pub use models::state::CaptureState;
pub use processing::buffer_sizer::compute_buffer_size;
pub use processing::transfer_buffer::TransferBuffer;
pub use session::engine::CaptureEngine;
pub use session::events::{CaptureEvent, ChannelDelegate};
pub use storage::file_sink::FileSink;
pub use storage::memory_sink::MemorySink;
pub use traits::audio_platform::AudioPlatform;
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::input_device::InputDevice;
pub use traits::output_sink::OutputSink;
