use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::config::WritePolicy;
use crate::models::error::{CaptureError, ReadFailureReason};
use crate::processing::transfer_buffer::TransferBuffer;
use crate::traits::input_device::InputDevice;
use crate::traits::output_sink::OutputSink;

/// Counters accumulated by a capture loop run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub bytes_written: u64,
}

/// The read → write cycle for one session.
///
/// Owns the device, the sink and the transfer buffer. Shares only the
/// running flag with the controller.
pub struct CaptureLoop {
    device: Box<dyn InputDevice>,
    sink: Box<dyn OutputSink>,
    buffer: TransferBuffer,
    running: Arc<AtomicBool>,
    write_policy: WritePolicy,
    stats: LoopStats,
}

impl CaptureLoop {
    pub fn new(
        device: Box<dyn InputDevice>,
        sink: Box<dyn OutputSink>,
        buffer_size: usize,
        running: Arc<AtomicBool>,
        write_policy: WritePolicy,
    ) -> Self {
        Self {
            device,
            sink,
            buffer: TransferBuffer::new(buffer_size),
            running,
            write_policy,
            stats: LoopStats::default(),
        }
    }

    /// Run until the running flag is cleared or a read or write fails.
    ///
    /// The flag is checked once per cycle, so a stop request takes effect
    /// after at most one in-flight read and one write.
    pub fn run(&mut self) -> Result<(), CaptureError> {
        while self.running.load(Ordering::SeqCst) {
            self.cycle()?;
        }
        Ok(())
    }

    fn cycle(&mut self) -> Result<(), CaptureError> {
        let read = self
            .device
            .read(self.buffer.as_mut_slice())
            .map_err(|code| CaptureError::DeviceReadFailed(ReadFailureReason::from_code(code)))?;
        self.buffer.set_filled(read);

        let chunk = match self.write_policy {
            WritePolicy::FullBuffer => self.buffer.full(),
            WritePolicy::BytesRead => self.buffer.filled(),
        };
        if !chunk.is_empty() {
            self.sink
                .write(chunk)
                .map_err(|e| CaptureError::SinkWriteFailed(e.to_string()))?;
            self.stats.bytes_written += chunk.len() as u64;
        }

        self.buffer.clear();
        self.stats.cycles += 1;
        Ok(())
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Stop and release the device, then close the sink.
    ///
    /// Device stop failures are logged; the device is released regardless.
    pub fn teardown(self) -> Result<LoopStats, CaptureError> {
        let Self {
            mut device,
            sink,
            stats,
            ..
        } = self;

        if let Err(e) = device.stop_capture() {
            log::warn!("Failed to stop input device: {}", e);
        }
        device.release();

        sink.close()
            .map_err(|e| CaptureError::SinkCloseFailed(e.to_string()))?;
        Ok(stats)
    }
}
