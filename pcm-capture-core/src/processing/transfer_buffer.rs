/// Fixed-capacity staging buffer for one read/write cycle.
///
/// Allocated once per session and reused in place: `clear` only rewinds the
/// write cursor, so bytes from earlier cycles remain until overwritten.
#[derive(Debug)]
pub struct TransferBuffer {
    data: Box<[u8]>,
    filled: usize,
}

impl TransferBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            filled: 0,
        }
    }

    /// The whole buffer, for the device to read into.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Record how many bytes the last read produced, clamped to capacity.
    pub fn set_filled(&mut self, len: usize) {
        self.filled = len.min(self.data.len());
    }

    /// The full declared capacity, regardless of how much was filled.
    pub fn full(&self) -> &[u8] {
        &self.data
    }

    /// Only the bytes filled by the last read.
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    pub fn filled_len(&self) -> usize {
        self.filled
    }

    /// Rewind the write cursor without touching the contents.
    pub fn clear(&mut self) {
        self.filled = 0;
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}
