pub mod audio_platform;
pub mod capture_delegate;
pub mod input_device;
pub mod output_sink;
