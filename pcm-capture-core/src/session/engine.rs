use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::{CaptureError, StartError};
use crate::models::recording_result::CaptureSummary;
use crate::models::state::CaptureState;
use crate::processing::buffer_sizer::compute_buffer_size;
use crate::session::capture_loop::CaptureLoop;
use crate::traits::audio_platform::AudioPlatform;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::output_sink::OutputSink;

/// The current session's capture thread and stop flag.
///
/// Guarded separately from the join handle so callbacks on the capture thread
/// can reach it while another thread is blocked in `stop`.
struct ActiveSession {
    thread: ThreadId,
    running: Arc<AtomicBool>,
}

/// Captures audio from a platform input device into an output sink.
///
/// One engine runs at most one recording session at a time:
/// ```text
/// [InputDevice] → read → [TransferBuffer] → write → [OutputSink]
///        ↑                                              │
///        └──────────── capture thread (one per session) ┘
/// ```
/// `start` opens the device and returns once the capture thread is running.
/// `stop` clears the running flag and joins the thread; the device is stopped
/// and released, and the sink closed, before `stop` returns.
///
/// Cancellation is cooperative. A device read that never returns keeps `stop`
/// blocked for as long.
///
/// Delegate callbacks run on the capture thread. From there `stop` only
/// clears the running flag, and `start` is rejected.
pub struct CaptureEngine<P: AudioPlatform> {
    platform: P,
    config: CaptureConfig,
    state: Arc<Mutex<CaptureState>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    active: Mutex<Option<ActiveSession>>,
    buffer_size: Mutex<Option<usize>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl<P: AudioPlatform> CaptureEngine<P> {
    pub fn new(platform: P, config: CaptureConfig) -> Self {
        Self {
            platform,
            config,
            state: Arc::new(Mutex::new(CaptureState::Idle)),
            worker: Mutex::new(None),
            active: Mutex::new(None),
            buffer_size: Mutex::new(None),
            delegate: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Stop flag of this engine's session, if the caller is its capture thread.
    fn own_capture_thread(&self) -> Option<Arc<AtomicBool>> {
        let current = thread::current().id();
        self.active
            .lock()
            .as_ref()
            .filter(|active| active.thread == current)
            .map(|active| Arc::clone(&active.running))
    }

    /// Transfer buffer size negotiated by the most recent successful `start`.
    pub fn buffer_size(&self) -> Option<usize> {
        *self.buffer_size.lock()
    }

    /// Start recording into `sink`. Transitions: idle → recording.
    ///
    /// Returns as soon as the capture thread is spawned. If sizing or opening
    /// the device fails, the sink is dropped without being written or closed.
    pub fn start(&self, sink: Box<dyn OutputSink>) -> Result<(), StartError> {
        if self.own_capture_thread().is_some() {
            return Err(StartError::CalledFromCaptureThread);
        }

        let mut worker = self.worker.lock();
        if self.state.lock().is_recording() {
            return Err(StartError::AlreadyRecording);
        }

        // Reap a session that already ended on a capture error.
        if let Some(finished) = worker.take() {
            if finished.join().is_err() {
                log::error!("Previous capture thread panicked");
            }
            *self.active.lock() = None;
        }

        let buffer_size = compute_buffer_size(&self.platform, &self.config)?;

        let mut device = self
            .platform
            .open(&self.config, buffer_size)
            .map_err(|e| StartError::DeviceUnavailable(e.to_string()))?;
        if let Err(e) = device.start_capture() {
            device.release();
            return Err(StartError::DeviceUnavailable(e.to_string()));
        }

        let running = Arc::new(AtomicBool::new(true));
        let capture_loop = CaptureLoop::new(
            device,
            sink,
            buffer_size,
            Arc::clone(&running),
            self.config.write_policy,
        );

        // The thread waits for the loop so it can be torn down here if spawning fails.
        let (loop_tx, loop_rx) = bounded::<CaptureLoop>(1);
        let session_worker = SessionWorker {
            loop_rx,
            running: Arc::clone(&running),
            state: Arc::clone(&self.state),
            delegate: self.delegate.clone(),
            config: self.config.clone(),
            buffer_size,
        };
        let handle = match thread::Builder::new()
            .name("pcm-capture".into())
            .spawn(move || session_worker.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                running.store(false, Ordering::SeqCst);
                if let Err(close_err) = capture_loop.teardown() {
                    log::warn!("Teardown after failed spawn: {}", close_err);
                }
                return Err(StartError::ThreadSpawn(e.to_string()));
            }
        };

        *self.active.lock() = Some(ActiveSession {
            thread: handle.thread().id(),
            running,
        });
        *self.buffer_size.lock() = Some(buffer_size);
        // The capture thread announces Recording before its first read.
        *self.state.lock() = CaptureState::Recording;

        // Capacity 1 and the receiver is alive until it takes this, so this never blocks.
        if loop_tx.send(capture_loop).is_err() {
            log::error!("Capture thread exited before receiving its loop");
        }
        *worker = Some(handle);

        log::info!(
            "Recording started: {} Hz, {} byte buffer",
            self.config.sample_rate_hz,
            buffer_size
        );
        Ok(())
    }

    /// Stop recording and wait for the capture thread. Transitions: recording → idle.
    ///
    /// No-op when idle. Racing callers perform one teardown between them; the
    /// others wait for it and return. Called from a delegate callback on this
    /// engine's capture thread, it clears the running flag and returns; the
    /// session tears down once the callback returns.
    pub fn stop(&self) {
        if let Some(running) = self.own_capture_thread() {
            running.store(false, Ordering::SeqCst);
            log::debug!("stop() called from capture thread; session ends after this callback");
            return;
        }

        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return;
        };

        if let Some(active) = self.active.lock().as_ref() {
            active.running.store(false, Ordering::SeqCst);
        }
        let joined = handle.join();
        *self.active.lock() = None;
        if joined.is_err() {
            log::error!("Capture thread panicked");
            if self.state.lock().is_recording() {
                set_state(&self.state, self.delegate.as_ref(), CaptureState::Idle);
            }
        }
        log::info!("Recording stopped");
    }
}

fn set_state(
    state: &Mutex<CaptureState>,
    delegate: Option<&Arc<dyn CaptureDelegate>>,
    new_state: CaptureState,
) {
    *state.lock() = new_state;
    if let Some(delegate) = delegate {
        delegate.on_state_changed(new_state);
    }
}

impl<P: AudioPlatform> Drop for CaptureEngine<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the capture thread needs, moved onto it at spawn.
struct SessionWorker {
    loop_rx: Receiver<CaptureLoop>,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<CaptureState>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
    config: CaptureConfig,
    buffer_size: usize,
}

impl SessionWorker {
    fn run(self) {
        let Ok(mut capture_loop) = self.loop_rx.recv() else {
            return;
        };

        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(CaptureState::Recording);
        }

        let outcome = capture_loop.run();
        self.running.store(false, Ordering::SeqCst);

        let stats = capture_loop.stats();
        let teardown = capture_loop.teardown();

        let errors: Vec<CaptureError> = [outcome.err(), teardown.err()].into_iter().flatten().collect();
        for error in &errors {
            log::error!("Capture session failed: {}", error);
            if let Some(ref delegate) = self.delegate {
                delegate.on_error(error);
            }
        }

        set_state(&self.state, self.delegate.as_ref(), CaptureState::Idle);

        let summary = CaptureSummary::new(&self.config, self.buffer_size, stats.cycles, stats.bytes_written);
        log::debug!(
            "Capture session ended after {} cycles, {} bytes",
            summary.cycles,
            summary.bytes_written
        );
        if let Some(ref delegate) = self.delegate {
            delegate.on_capture_finished(&summary);
        }
    }
}
