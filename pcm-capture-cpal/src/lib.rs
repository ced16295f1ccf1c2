//! # pcm-capture-cpal
//!
//! cpal input-device backend for pcm-capture-kit.
//!
//! Provides:
//! - `CpalPlatform`: `AudioPlatform` over the default cpal host
//! - `CpalInputDevice`: blocking reads of mono 16-bit PCM from a cpal stream
//! - `list_input_devices`: input device enumeration
//!
//! ## Usage
//! ```ignore
//! use pcm_capture_core::{CaptureConfig, CaptureEngine, FileSink};
//! use pcm_capture_cpal::CpalPlatform;
//!
//! let engine = CaptureEngine::new(CpalPlatform::default_device(), CaptureConfig::default());
//! engine.start(Box::new(FileSink::create("recording.pcm")?))?;
//! // ...
//! engine.stop();
//! ```

mod convert;
pub mod cpal_device;
pub mod cpal_platform;
pub mod device_enumerator;

pub use cpal_device::CpalInputDevice;
pub use cpal_platform::{CpalPlatform, CpalPlatformOptions};
pub use device_enumerator::{list_input_devices, InputDeviceInfo};
