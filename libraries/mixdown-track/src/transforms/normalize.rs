//! Loudness normalization with a true-peak ceiling.

use mixdown_dsp::{db_to_linear, integrated_loudness, true_peak_channels};
use tracing::debug;

use crate::error::Result;

/// Scale the program to `target_lufs`, capped so the true peak never
/// exceeds `peak_limit_dbtp`.
///
/// One scalar is applied to every channel (stereo-matched), so the stereo
/// image is preserved even when the ceiling takes over. Silent or too-short
/// input (measured loudness of negative infinity) is returned unchanged.
///
/// # Errors
/// [`crate::TrackError::Dsp`] for sample rates the loudness kernel does not
/// support.
pub fn normalize_loudness(
    channels: &[Vec<f32>],
    sample_rate: u32,
    target_lufs: f64,
    peak_limit_dbtp: f64,
) -> Result<Vec<Vec<f32>>> {
    let measured = integrated_loudness(channels, sample_rate)?;
    if measured == f64::NEG_INFINITY {
        return Ok(channels.to_vec());
    }

    let mut linear_gain = db_to_linear(target_lufs - measured);

    let peak = true_peak_channels(channels, sample_rate);
    let ceiling = db_to_linear(peak_limit_dbtp);
    if peak > 0.0 && peak * linear_gain > ceiling {
        linear_gain = ceiling / peak;
    }

    debug!(
        measured_lufs = measured,
        target_lufs,
        linear_gain,
        "normalizing loudness"
    );

    let factor = linear_gain as f32;
    Ok(channels
        .iter()
        .map(|channel| channel.iter().map(|&x| x * factor).collect())
        .collect())
}
