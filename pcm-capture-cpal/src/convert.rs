//! Conversion of cpal callback buffers to mono 16-bit little-endian PCM.

/// Downmix interleaved `data` to mono and append it to `out` as i16 LE bytes.
///
/// `to_i16` maps a native sample to i16. Mono input is copied sample by
/// sample, so native i16 audio passes through unchanged. Wider layouts are
/// averaged per frame in the integer domain; a trailing partial frame is
/// averaged over what is present.
pub(crate) fn append_mono_pcm16<T, F>(out: &mut Vec<u8>, data: &[T], channels: usize, mut to_i16: F)
where
    T: Copy,
    F: FnMut(T) -> i16,
{
    let channels = channels.max(1);
    out.reserve(data.len() / channels * 2 + 2);

    if channels == 1 {
        for &sample in data {
            out.extend_from_slice(&to_i16(sample).to_le_bytes());
        }
        return;
    }

    for frame in data.chunks(channels) {
        let sum: i32 = frame.iter().map(|&s| i32::from(to_i16(s))).sum();
        out.extend_from_slice(&average(sum, frame.len()).to_le_bytes());
    }
}

/// Mean of `count` i16 samples summing to `sum`, rounded half away from zero.
fn average(sum: i32, count: usize) -> i16 {
    let count = count as i32;
    let half = count / 2;
    let rounded = if sum >= 0 { (sum + half) / count } else { (sum - half) / count };
    rounded as i16
}

pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

pub(crate) fn u16_to_i16(sample: u16) -> i16 {
    (i32::from(sample) - 32_768) as i16
}
