use crate::models::error::DeviceError;

/// An opened hardware input handle.
///
/// The handle is opened on the controller thread and then moved to the
/// capture thread, which is its only user until it is released.
pub trait InputDevice: Send {
    /// Begin delivering audio.
    fn start_capture(&mut self) -> Result<(), DeviceError>;

    /// Read captured 16-bit little-endian PCM into `buf`.
    ///
    /// Blocks until data is available. Returns the number of bytes read, or a
    /// negative status code (see [`codes`](crate::models::error::codes)).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32>;

    /// Stop delivering audio. The handle stays open.
    fn stop_capture(&mut self) -> Result<(), DeviceError>;

    /// Release the handle. Consumes it, so a device is released at most once.
    fn release(self: Box<Self>);
}
