//! Scalar gain.

use mixdown_dsp::db_to_linear;

/// Multiply every sample by the linear equivalent of `db`.
///
/// No clipping is applied; headroom past full scale survives until
/// fixed-point export.
pub fn gain(channels: &[Vec<f32>], db: f64) -> Vec<Vec<f32>> {
    let factor = db_to_linear(db) as f32;
    channels
        .iter()
        .map(|channel| channel.iter().map(|&x| x * factor).collect())
        .collect()
}
