//! Integrated loudness and loudness range (EBU R128 / ITU-R BS.1770-4).
//!
//! Measurement pipeline:
//! 1. K-weight every channel.
//! 2. Slice into 400 ms blocks advancing by 100 ms (75 % overlap) and sum
//!    the channel-weighted mean squares per block.
//! 3. Gate twice: absolute at -70 LUFS, then relative at 10 LU below the
//!    mean of the surviving blocks.
//! 4. `-0.691 + 10*log10(mean)` of the final survivors.
//!
//! Loudness range uses the same machinery over 3 s windows with a 1 s hop
//! and reports the p95 - p10 spread of the gated short-term values.

use tracing::debug;

use crate::error::Result;
use crate::kweight::{apply_k_weighting, channel_weight};

/// Blocks at or below this loudness never contribute to the integrated
/// measurement.
pub const ABSOLUTE_GATE_LUFS: f64 = -70.0;

/// Relative gate offset below the first-pass mean, in LU.
const RELATIVE_GATE_LU: f64 = 10.0;

/// Gating block length and overlap per BS.1770-4.
const BLOCK_SECONDS: f64 = 0.4;
const BLOCK_HOP_FRACTION: f64 = 0.25;

/// Short-term window parameters for the loudness-range estimate.
const SHORT_TERM_SECONDS: f64 = 3.0;
const SHORT_TERM_HOP_SECONDS: f64 = 1.0;
const RANGE_RELATIVE_GATE_LU: f64 = 20.0;

fn power_to_lufs(power: f64) -> f64 {
    if power <= 0.0 {
        return f64::NEG_INFINITY;
    }
    -0.691 + 10.0 * power.log10()
}

fn lufs_to_power(lufs: f64) -> f64 {
    10.0_f64.powf((lufs + 0.691) / 10.0)
}

fn k_weight_channels(channels: &[Vec<f32>], sample_rate: u32) -> Result<Vec<Vec<f32>>> {
    channels
        .iter()
        .map(|ch| apply_k_weighting(ch, sample_rate))
        .collect()
}

/// Channel-weighted mean-square power for every complete window.
///
/// Windows shorter than `window` at the tail are dropped, so an input
/// shorter than one window yields no powers at all.
fn windowed_powers(weighted: &[Vec<f32>], window: usize, hop: usize) -> Vec<f64> {
    let channel_count = weighted.len();
    let len = weighted.first().map_or(0, Vec::len);
    if window == 0 || hop == 0 || len < window {
        return Vec::new();
    }

    let mut powers = Vec::with_capacity((len - window) / hop + 1);
    let mut start = 0;
    while start + window <= len {
        let mut block_power = 0.0_f64;
        for (index, channel) in weighted.iter().enumerate() {
            let weight = channel_weight(channel_count, index);
            if weight == 0.0 {
                continue;
            }
            let sum_sq: f64 = channel[start..start + window]
                .iter()
                .map(|&x| x as f64 * x as f64)
                .sum();
            block_power += weight * (sum_sq / window as f64);
        }
        powers.push(block_power);
        start += hop;
    }
    powers
}

/// Dual-gated mean square of the block powers; 0.0 when every block is
/// gated away.
fn gated_mean_square(blocks: &[f64]) -> f64 {
    let absolute_floor = lufs_to_power(ABSOLUTE_GATE_LUFS);
    let loud: Vec<f64> = blocks
        .iter()
        .copied()
        .filter(|&p| p > absolute_floor)
        .collect();
    if loud.is_empty() {
        return 0.0;
    }

    let first_pass_mean = loud.iter().sum::<f64>() / loud.len() as f64;
    let relative_floor = lufs_to_power(power_to_lufs(first_pass_mean) - RELATIVE_GATE_LU);

    let survivors: Vec<f64> = loud.into_iter().filter(|&p| p >= relative_floor).collect();
    if survivors.is_empty() {
        return 0.0;
    }
    survivors.iter().sum::<f64>() / survivors.len() as f64
}

/// Integrated loudness of a whole program, in LUFS.
///
/// Returns negative infinity for silence and for inputs shorter than one
/// 400 ms gating block; that value is a sentinel, not an error.
///
/// # Errors
/// [`crate::DspError::UnsupportedSampleRate`] for rates other than
/// 44.1/48 kHz.
pub fn integrated_loudness(channels: &[Vec<f32>], sample_rate: u32) -> Result<f64> {
    if channels.is_empty() {
        return Ok(f64::NEG_INFINITY);
    }

    let weighted = k_weight_channels(channels, sample_rate)?;

    let block = (BLOCK_SECONDS * sample_rate as f64) as usize;
    let hop = (block as f64 * BLOCK_HOP_FRACTION) as usize;
    let blocks = windowed_powers(&weighted, block, hop);
    if blocks.is_empty() {
        return Ok(f64::NEG_INFINITY);
    }

    let mean_square = gated_mean_square(&blocks);
    let lufs = power_to_lufs(mean_square);
    debug!(
        blocks = blocks.len(),
        sample_rate,
        lufs,
        "measured integrated loudness"
    );
    Ok(lufs)
}

/// Loudness range (LRA) in LU: the p95 - p10 spread of gated short-term
/// loudness values.
///
/// Programs shorter than 3 s, or with fewer than two surviving short-term
/// windows, report 0.0.
///
/// # Errors
/// [`crate::DspError::UnsupportedSampleRate`] for rates other than
/// 44.1/48 kHz.
pub fn loudness_range(channels: &[Vec<f32>], sample_rate: u32) -> Result<f64> {
    if channels.is_empty() {
        return Ok(0.0);
    }

    let weighted = k_weight_channels(channels, sample_rate)?;

    let window = (SHORT_TERM_SECONDS * sample_rate as f64) as usize;
    let hop = (SHORT_TERM_HOP_SECONDS * sample_rate as f64) as usize;
    let powers = windowed_powers(&weighted, window, hop);

    let absolute_floor = lufs_to_power(ABSOLUTE_GATE_LUFS);
    let loud: Vec<f64> = powers.into_iter().filter(|&p| p > absolute_floor).collect();
    if loud.len() < 2 {
        return Ok(0.0);
    }

    let mean = loud.iter().sum::<f64>() / loud.len() as f64;
    let relative_floor = lufs_to_power(power_to_lufs(mean) - RANGE_RELATIVE_GATE_LU);
    let mut short_term: Vec<f64> = loud
        .into_iter()
        .filter(|&p| p >= relative_floor)
        .map(power_to_lufs)
        .collect();
    if short_term.len() < 2 {
        return Ok(0.0);
    }

    short_term.sort_by(f64::total_cmp);
    let low = short_term.len() / 10;
    let high = short_term.len() * 95 / 100;
    if high <= low {
        return Ok(0.0);
    }
    Ok(short_term[high] - short_term[low])
}
