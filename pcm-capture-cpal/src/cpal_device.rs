//! cpal-backed input device.
//!
//! cpal delivers audio through callbacks on its own thread, and a
//! `cpal::Stream` may not be sent between threads on every host. The stream
//! therefore lives on a small owner thread that builds it and plays or pauses
//! it on command. Callbacks convert each buffer to mono i16 LE bytes and hand
//! it over a bounded channel, and `read` drains that channel into the
//! caller's buffer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use pcm_capture_core::models::error::{codes, DeviceError};
use pcm_capture_core::traits::input_device::InputDevice;

use crate::convert::{append_mono_pcm16, f32_to_i16, u16_to_i16};

/// Commands for the stream owner thread. Each carries a reply channel.
pub(crate) enum StreamCommand {
    Play(Sender<Result<(), DeviceError>>),
    Pause(Sender<Result<(), DeviceError>>),
}

/// Parameters for opening a stream on the owner thread.
pub(crate) struct StreamParams {
    pub device: cpal::Device,
    pub config: StreamConfig,
    pub sample_format: SampleFormat,
    pub channel_capacity: usize,
    pub read_timeout: Duration,
}

/// An opened cpal input stream delivering mono 16-bit PCM.
pub struct CpalInputDevice {
    chunks: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    pending_offset: usize,
    control: Option<Sender<StreamCommand>>,
    stream_thread: Option<thread::JoinHandle<()>>,
    stream_failed: Arc<AtomicBool>,
    dropped_chunks: Arc<AtomicUsize>,
    read_timeout: Duration,
    capturing: bool,
}

impl CpalInputDevice {
    /// Build the stream on a dedicated owner thread and wait until it is ready.
    pub(crate) fn open(params: StreamParams) -> Result<Self, DeviceError> {
        let (chunk_tx, chunk_rx) = bounded::<Vec<u8>>(params.channel_capacity.max(1));
        let (control_tx, control_rx) = bounded::<StreamCommand>(1);
        let (ready_tx, ready_rx) = bounded::<Result<(), DeviceError>>(1);
        let stream_failed = Arc::new(AtomicBool::new(false));
        let dropped_chunks = Arc::new(AtomicUsize::new(0));
        let read_timeout = params.read_timeout;

        let owner = StreamOwner {
            params,
            chunk_tx,
            stream_failed: Arc::clone(&stream_failed),
            dropped_chunks: Arc::clone(&dropped_chunks),
        };
        let handle = thread::Builder::new()
            .name("cpal-stream-owner".into())
            .spawn(move || owner.run(ready_tx, control_rx))
            .map_err(|e| DeviceError::Backend(format!("failed to spawn stream thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                join_stream_thread(handle);
                return Err(e);
            }
            Err(_) => {
                join_stream_thread(handle);
                return Err(DeviceError::Backend("stream thread exited during setup".into()));
            }
        }

        let mut device = Self::from_parts(chunk_rx, control_tx, stream_failed, read_timeout);
        device.dropped_chunks = dropped_chunks;
        device.stream_thread = Some(handle);
        Ok(device)
    }

    pub(crate) fn from_parts(
        chunks: Receiver<Vec<u8>>,
        control: Sender<StreamCommand>,
        stream_failed: Arc<AtomicBool>,
        read_timeout: Duration,
    ) -> Self {
        Self {
            chunks,
            pending: Vec::new(),
            pending_offset: 0,
            control: Some(control),
            stream_thread: None,
            stream_failed,
            dropped_chunks: Arc::new(AtomicUsize::new(0)),
            read_timeout,
            capturing: false,
        }
    }

    /// Callback buffers discarded because the reader fell behind.
    pub fn dropped_chunks(&self) -> usize {
        self.dropped_chunks.load(Ordering::Relaxed)
    }

    fn command(&self, make: fn(Sender<Result<(), DeviceError>>) -> StreamCommand) -> Result<(), DeviceError> {
        let control = self
            .control
            .as_ref()
            .ok_or_else(|| DeviceError::Backend("device released".into()))?;
        let (reply_tx, reply_rx) = bounded(1);
        control
            .send(make(reply_tx))
            .map_err(|_| DeviceError::Backend("stream thread gone".into()))?;
        reply_rx
            .recv()
            .map_err(|_| DeviceError::Backend("stream thread gone".into()))?
    }
}

impl InputDevice for CpalInputDevice {
    fn start_capture(&mut self) -> Result<(), DeviceError> {
        self.command(StreamCommand::Play)?;
        self.capturing = true;
        Ok(())
    }

    /// Fill `buf` completely, waiting for callback data as needed.
    ///
    /// Returns `ERROR_DEAD_OBJECT` if the stream reported an error, went away,
    /// or produced nothing for the read timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32> {
        if !self.capturing {
            return Err(codes::ERROR_INVALID_OPERATION);
        }
        if self.stream_failed.load(Ordering::SeqCst) {
            return Err(codes::ERROR_DEAD_OBJECT);
        }

        let mut filled = 0;
        while filled < buf.len() {
            let available = &self.pending[self.pending_offset..];
            if !available.is_empty() {
                let n = available.len().min(buf.len() - filled);
                buf[filled..filled + n].copy_from_slice(&available[..n]);
                self.pending_offset += n;
                filled += n;
                continue;
            }

            match self.chunks.recv_timeout(self.read_timeout) {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.pending_offset = 0;
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("No audio from input device for {:?}", self.read_timeout);
                    return Err(codes::ERROR_DEAD_OBJECT);
                }
                Err(RecvTimeoutError::Disconnected) => return Err(codes::ERROR_DEAD_OBJECT),
            }
        }
        Ok(filled)
    }

    fn stop_capture(&mut self) -> Result<(), DeviceError> {
        self.capturing = false;
        self.command(StreamCommand::Pause)
    }

    fn release(mut self: Box<Self>) {
        // Closing the control channel ends the owner thread, which drops the stream.
        self.control = None;
        if let Some(handle) = self.stream_thread.take() {
            join_stream_thread(handle);
        }
        let dropped = self.dropped_chunks();
        if dropped > 0 {
            log::warn!("Input device released; {} callback buffers were dropped", dropped);
        }
    }
}

/// Join the stream owner thread, logging a panic. Returns false if it panicked.
fn join_stream_thread(handle: thread::JoinHandle<()>) -> bool {
    let joined = handle.join().is_ok();
    if !joined {
        log::error!("cpal stream thread panicked");
    }
    joined
}

/// State moved onto the stream owner thread.
struct StreamOwner {
    params: StreamParams,
    chunk_tx: Sender<Vec<u8>>,
    stream_failed: Arc<AtomicBool>,
    dropped_chunks: Arc<AtomicUsize>,
}

impl StreamOwner {
    fn run(self, ready: Sender<Result<(), DeviceError>>, control: Receiver<StreamCommand>) {
        let stream = match self.build_stream() {
            Ok(stream) => {
                let _ = ready.send(Ok(()));
                stream
            }
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        for command in control.iter() {
            match command {
                StreamCommand::Play(reply) => {
                    let _ = reply.send(stream.play().map_err(|e| DeviceError::Backend(e.to_string())));
                }
                StreamCommand::Pause(reply) => {
                    let _ = reply.send(stream.pause().map_err(|e| DeviceError::Backend(e.to_string())));
                }
            }
        }
        drop(stream);
        log::debug!("cpal input stream closed");
    }

    fn build_stream(&self) -> Result<cpal::Stream, DeviceError> {
        let device = &self.params.device;
        let config = &self.params.config;
        let channels = usize::from(config.channels.max(1));

        let failed = Arc::clone(&self.stream_failed);
        let err_fn = move |err: cpal::StreamError| {
            log::error!("Audio input stream error: {}", err);
            failed.store(true, Ordering::SeqCst);
        };

        let stream = match self.params.sample_format {
            SampleFormat::F32 => {
                let pump = ChunkPump::new(self.chunk_tx.clone(), Arc::clone(&self.dropped_chunks));
                device.build_input_stream(
                    config,
                    move |data: &[f32], _| pump.push(data, channels, f32_to_i16),
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let pump = ChunkPump::new(self.chunk_tx.clone(), Arc::clone(&self.dropped_chunks));
                device.build_input_stream(
                    config,
                    move |data: &[i16], _| pump.push(data, channels, |s| s),
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let pump = ChunkPump::new(self.chunk_tx.clone(), Arc::clone(&self.dropped_chunks));
                device.build_input_stream(
                    config,
                    move |data: &[u16], _| pump.push(data, channels, u16_to_i16),
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(DeviceError::UnsupportedConfig(format!(
                    "unsupported sample format: {:?}",
                    other
                )))
            }
        };

        stream.map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => DeviceError::NotFound,
            cpal::BuildStreamError::StreamConfigNotSupported => {
                DeviceError::UnsupportedConfig(format!("{:?}", config))
            }
            other => DeviceError::Backend(other.to_string()),
        })
    }
}

/// Converts callback buffers and forwards them without blocking the audio thread.
struct ChunkPump {
    tx: Sender<Vec<u8>>,
    dropped: Arc<AtomicUsize>,
}

impl ChunkPump {
    fn new(tx: Sender<Vec<u8>>, dropped: Arc<AtomicUsize>) -> Self {
        Self { tx, dropped }
    }

    fn push<T: Copy>(&self, data: &[T], channels: usize, to_i16: impl FnMut(T) -> i16) {
        let mut bytes = Vec::new();
        append_mono_pcm16(&mut bytes, data, channels, to_i16);
        if let Err(TrySendError::Full(_)) = self.tx.try_send(bytes) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
