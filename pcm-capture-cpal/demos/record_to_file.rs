//! Record the default input device to a raw PCM file.
//!
//! ```text
//! cargo run -p pcm-capture-cpal --example record_to_file -- [path] [seconds]
//! ```
//!
//! Writes `path` (default `recording.pcm`) plus `path.metadata.json`. Play it
//! back with e.g. `ffplay -f s16le -ar 44100 -ac 1 recording.pcm`.

use std::error::Error;
use std::time::{Duration, Instant};

use pcm_capture_core::{CaptureConfig, CaptureEngine, CaptureEvent, ChannelDelegate, FileSink};
use pcm_capture_cpal::{list_input_devices, CpalPlatform};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "recording.pcm".to_string());
    let seconds: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(5);

    for device in list_input_devices()? {
        log::info!(
            "Input device: {}{} rates={:?} channels={}",
            device.name,
            if device.is_default { " (default)" } else { "" },
            device.sample_rate_range,
            device.max_channels
        );
    }

    let config = CaptureConfig::default();
    let mut engine = CaptureEngine::new(CpalPlatform::default_device(), config.clone());
    let (delegate, events) = ChannelDelegate::new();
    engine.set_delegate(delegate);

    let sink = FileSink::create(&path)?.with_metadata(&config);
    engine.start(Box::new(sink))?;
    log::info!("Recording {} s to {}", seconds, path);

    let deadline = Instant::now() + Duration::from_secs(seconds);
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match events.recv_timeout(remaining) {
            Ok(CaptureEvent::Error(e)) => {
                log::error!("Capture failed: {}", e);
                break;
            }
            Ok(_) => continue,
            Err(_) => break,
        }
    }

    engine.stop();
    for event in events.try_iter() {
        if let CaptureEvent::Finished(summary) = event {
            log::info!(
                "Captured {:.2} s ({} bytes in {} chunks of {} bytes)",
                summary.duration_secs,
                summary.bytes_written,
                summary.cycles,
                summary.buffer_size
            );
        }
    }
    Ok(())
}
