//! Loudness and true-peak measurement kernel for mixdown
//!
//! This crate is the DSP core behind the track facade:
//! - Integrated loudness per ITU-R BS.1770-4 / EBU R128 (K-weighting,
//!   400 ms gated blocks, dual absolute/relative gating)
//! - Loudness range (LRA) from gated short-term windows
//! - True peak via a 4x polyphase Kaiser-sinc interpolator
//! - The Direct-Form-I biquad and dB/linear helpers the above are built on
//!
//! # Example
//!
//! ```
//! use mixdown_dsp::{integrated_loudness, true_peak_channels};
//!
//! let tone: Vec<f32> = (0..48_000)
//!     .map(|i| {
//!         let t = i as f64 / 48_000.0;
//!         (0.5 * (2.0 * std::f64::consts::PI * 997.0 * t).sin()) as f32
//!     })
//!     .collect();
//! let channels = vec![tone];
//!
//! let lufs = integrated_loudness(&channels, 48_000)?;
//! let peak = true_peak_channels(&channels, 48_000);
//! assert!(lufs < 0.0 && peak > 0.0);
//! # Ok::<(), mixdown_dsp::DspError>(())
//! ```

#![deny(unsafe_code)]

mod biquad;
mod error;
mod kweight;
mod level;
mod loudness;
mod true_peak;

pub use biquad::{Biquad, BiquadCoeffs};
pub use error::{DspError, Result};
pub use kweight::{apply_k_weighting, channel_weight, SUPPORTED_SAMPLE_RATES};
pub use level::{db_to_linear, linear_to_db};
pub use loudness::{integrated_loudness, loudness_range, ABSOLUTE_GATE_LUFS};
pub use true_peak::{sample_peak, true_peak, true_peak_channels};
