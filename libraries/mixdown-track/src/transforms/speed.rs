//! Playback-speed resampling by linear interpolation.
//!
//! The sample rate is left untouched, so pitch shifts together with speed.
//! This is deliberate; pitch-preserving time stretch is a different
//! algorithm entirely and not offered here.

use crate::error::{Result, TrackError};

/// Resample every channel by `rate_factor` (2.0 = twice as fast).
///
/// Output index `i` reads source position `i * rate_factor` with linear
/// interpolation between the two neighboring samples; the final sample is
/// clamped rather than read past the buffer.
///
/// # Errors
/// [`TrackError::InvalidSpeedRate`] when the factor is zero, negative, or
/// NaN.
pub fn speed(channels: &[Vec<f32>], rate_factor: f64) -> Result<Vec<Vec<f32>>> {
    if !(rate_factor > 0.0) {
        return Err(TrackError::InvalidSpeedRate(rate_factor));
    }

    Ok(channels
        .iter()
        .map(|channel| {
            let len = channel.len();
            if len == 0 {
                return Vec::new();
            }
            let out_len = (len as f64 / rate_factor).round() as usize;
            (0..out_len)
                .map(|i| {
                    let position = i as f64 * rate_factor;
                    let base = position.floor();
                    let index = (base as usize).min(len - 1);
                    let next = (index + 1).min(len - 1);
                    let frac = (position - base) as f32;
                    channel[index] * (1.0 - frac) + channel[next] * frac
                })
                .collect()
        })
        .collect())
}
