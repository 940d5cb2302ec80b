//! K-weighting filter cascade (ITU-R BS.1770-4).
//!
//! Two biquads in series model perceived loudness before power integration:
//! a high shelf approximating head acoustics (about +4 dB above 1.5 kHz)
//! followed by the RLB high-pass (about -3 dB at 60 Hz). Coefficients are
//! the full-precision tables for 48 kHz (BS.1770-4 Table 1/2) and 44.1 kHz
//! (bilinear-transform derivation, cf. pyloudnorm / libebur128).

use crate::biquad::{Biquad, BiquadCoeffs};
use crate::error::{DspError, Result};

/// Sample rates the loudness kernel has coefficient tables for.
pub const SUPPORTED_SAMPLE_RATES: [u32; 2] = [44_100, 48_000];

/// Surround-channel weight from BS.1770-4 (about +1.5 dB).
const SURROUND_WEIGHT: f64 = 1.412_537_544_622_75;

fn pre_filter(sample_rate: u32) -> Result<Biquad> {
    let coeffs = match sample_rate {
        48_000 => BiquadCoeffs {
            b0: 1.53512485958697,
            b1: -2.69169618940638,
            b2: 1.19839281085285,
            a0: 1.0,
            a1: -1.69065929318241,
            a2: 0.73248077421585,
        },
        44_100 => BiquadCoeffs {
            b0: 1.5308412300498355,
            b1: -2.6509799951536985,
            b2: 1.1690790799210682,
            a0: 1.0,
            a1: -1.6636551132560204,
            a2: 0.7125954280732254,
        },
        other => return Err(DspError::UnsupportedSampleRate(other)),
    };
    Ok(Biquad::new(coeffs))
}

fn rlb_filter(sample_rate: u32) -> Result<Biquad> {
    let coeffs = match sample_rate {
        48_000 => BiquadCoeffs {
            b0: 1.0,
            b1: -2.0,
            b2: 1.0,
            a0: 1.0,
            a1: -1.99004745483398,
            a2: 0.99007225036621,
        },
        44_100 => BiquadCoeffs {
            b0: 1.0,
            b1: -2.0,
            b2: 1.0,
            a0: 1.0,
            a1: -1.9891696736297957,
            a2: 0.9891990357870394,
        },
        other => return Err(DspError::UnsupportedSampleRate(other)),
    };
    Ok(Biquad::new(coeffs))
}

/// Run one channel through the K-weighting cascade.
///
/// Returns a fresh buffer of identical length; both filters start from zero
/// state on every call.
///
/// # Errors
/// [`DspError::UnsupportedSampleRate`] for rates other than 44.1/48 kHz.
pub fn apply_k_weighting(samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
    let mut pre = pre_filter(sample_rate)?;
    let mut rlb = rlb_filter(sample_rate)?;

    let shelved = pre.process_buffer(samples);
    Ok(rlb.process_buffer(&shelved))
}

/// Channel weight for the loudness power sum.
///
/// Mono and stereo channels all weigh 1.0. For a 6-channel 5.1 layout
/// (L, R, C, LFE, Ls, Rs) the LFE is excluded and the surrounds get the
/// BS.1770-4 surround weight. Unknown layouts fall back to 1.0.
pub fn channel_weight(channel_count: usize, channel_index: usize) -> f64 {
    if channel_count == 6 {
        match channel_index {
            3 => 0.0,
            4 | 5 => SURROUND_WEIGHT,
            _ => 1.0,
        }
    } else {
        1.0
    }
}
