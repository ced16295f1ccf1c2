use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::models::error::CaptureError;
use crate::models::recording_result::CaptureSummary;
use crate::models::state::CaptureState;
use crate::traits::capture_delegate::CaptureDelegate;

/// A delegate notification as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    StateChanged(CaptureState),
    Error(CaptureError),
    Finished(CaptureSummary),
}

/// `CaptureDelegate` that forwards every notification over a channel.
///
/// Lets a caller consume capture events on its own thread instead of
/// handling callbacks on the capture thread.
pub struct ChannelDelegate {
    tx: Sender<CaptureEvent>,
}

impl ChannelDelegate {
    pub fn new() -> (Arc<Self>, Receiver<CaptureEvent>) {
        let (tx, rx) = unbounded();
        (Arc::new(Self { tx }), rx)
    }

    fn forward(&self, event: CaptureEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Capture event dropped: receiver gone");
        }
    }
}

impl CaptureDelegate for ChannelDelegate {
    fn on_state_changed(&self, state: CaptureState) {
        self.forward(CaptureEvent::StateChanged(state));
    }

    fn on_error(&self, error: &CaptureError) {
        self.forward(CaptureEvent::Error(error.clone()));
    }

    fn on_capture_finished(&self, summary: &CaptureSummary) {
        self.forward(CaptureEvent::Finished(*summary));
    }
}
