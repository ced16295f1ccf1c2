use std::io;

/// Sequential byte destination for one recording session.
///
/// Supplied by the caller; the capture thread owns it until the session ends.
pub trait OutputSink: Send {
    /// Append `bytes` in order.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flush and close. Consumes the sink, so it is closed at most once.
    fn close(self: Box<Self>) -> io::Result<()>;
}
