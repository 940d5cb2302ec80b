//! Slice and reverse.

/// Extract `[start_ms, end_ms)` from every channel.
///
/// A missing `end_ms` means end-of-track; out-of-range positions clamp to
/// the buffer bounds, so an inverted or fully out-of-range request yields
/// empty channels rather than an error.
pub fn slice(
    channels: &[Vec<f32>],
    sample_rate: u32,
    start_ms: f64,
    end_ms: Option<f64>,
) -> Vec<Vec<f32>> {
    let len = channels.first().map_or(0, Vec::len);
    let to_index = |ms: f64| ((ms * sample_rate as f64 / 1000.0) as usize).min(len);

    let start = to_index(start_ms);
    let end = end_ms.map_or(len, to_index).max(start);

    channels
        .iter()
        .map(|channel| channel[start..end].to_vec())
        .collect()
}

/// Mirror every channel.
pub fn reverse(channels: &[Vec<f32>]) -> Vec<Vec<f32>> {
    channels
        .iter()
        .map(|channel| channel.iter().rev().copied().collect())
        .collect()
}
