//! Leading/trailing silence removal.
//!
//! Detection scans 10 ms windows and compares each window's RMS (the
//! loudest channel wins) against the threshold. Window-level RMS is robust
//! against isolated clicks that a single-sample comparison would latch
//! onto.

use mixdown_dsp::db_to_linear;

/// Detection window length.
const WINDOW_MS: f64 = 10.0;

fn window_rms(samples: &[f32]) -> f64 {
    let sum: f64 = samples.iter().map(|&x| x as f64 * x as f64).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Trim silence below `threshold_db` from both ends.
///
/// The kept region is expanded by `head_ms` before the first loud window
/// and `tail_ms` after the last, clamped to the buffer. A track with no
/// window above the threshold is returned unchanged (as a copy).
pub fn trim_silence(
    channels: &[Vec<f32>],
    sample_rate: u32,
    threshold_db: f64,
    head_ms: f64,
    tail_ms: f64,
) -> Vec<Vec<f32>> {
    let len = channels.first().map_or(0, Vec::len);
    if len == 0 {
        return channels.to_vec();
    }

    let threshold = db_to_linear(threshold_db);
    let window = ((WINDOW_MS * sample_rate as f64 / 1000.0) as usize).max(1);

    let mut first_loud: Option<usize> = None;
    let mut last_loud_end = 0;
    let mut start = 0;
    while start < len {
        let end = (start + window).min(len);
        let loud = channels
            .iter()
            .any(|channel| window_rms(&channel[start..end]) > threshold);
        if loud {
            first_loud.get_or_insert(start);
            last_loud_end = end;
        }
        start = end;
    }

    let Some(first) = first_loud else {
        return channels.to_vec();
    };

    let head = (head_ms * sample_rate as f64 / 1000.0) as usize;
    let tail = (tail_ms * sample_rate as f64 / 1000.0) as usize;
    let begin = first.saturating_sub(head);
    let stop = (last_loud_end + tail).min(len);

    channels
        .iter()
        .map(|channel| channel[begin..stop].to_vec())
        .collect()
}
