use crate::models::error::CaptureError;
use crate::models::recording_result::CaptureSummary;
use crate::models::state::CaptureState;

/// Event delegate for capture engine notifications.
///
/// Every notification is called from the session's capture thread, not the UI
/// thread. Implementations should marshal to the UI thread if needed. Calling
/// the engine's `stop` from a callback ends the session without waiting;
/// `start` from a callback is rejected.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the engine state changes.
    fn on_state_changed(&self, state: CaptureState);

    /// Called when the capture loop ends with an error.
    fn on_error(&self, error: &CaptureError);

    /// Called after the device is released and the sink closed.
    fn on_capture_finished(&self, _summary: &CaptureSummary) {}
}
