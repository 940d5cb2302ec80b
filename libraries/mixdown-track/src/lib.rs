//! Track processing for mixdown
//!
//! This crate is the consumer of the measurement kernel:
//! - An immutable [`Track`] facade: construct, measure, transform, export
//! - Loudness-preserving transforms (normalize, trim, gain, fades, slice,
//!   concat, mix, reverse, speed)
//! - A canonical 16-bit PCM WAV codec
//! - Codec adapters: Symphonia decode, an MP3-encoder trait seam
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐     ┌─────────────┐     ┌────────────┐
//! │   bytes   │ ──► │ WAV parse / │ ──► │   Track    │
//! └───────────┘     │  Symphonia  │     └────────────┘
//!                   └─────────────┘           │
//!                                             ▼
//!                   ┌─────────────┐     ┌────────────┐
//!                   │  WAV / MP3  │ ◄── │ transforms │
//!                   └─────────────┘     └────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use mixdown_track::Track;
//!
//! # fn example() -> mixdown_track::Result<()> {
//! let track = Track::silence(1_000.0, 48_000, 2)?;
//! let mastered = track
//!     .trim_silence_default()
//!     .normalize()?
//!     .fade_out(250.0);
//! let wav = mastered.to_wav();
//! # let _ = wav;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod codec;
mod error;
mod track;
mod transforms;
mod wav;

pub use codec::Mp3Encoder;
pub use error::{Result, TrackError};
pub use track::{LoudnessReport, PcmData, Track};

/// Streaming-platform loudness target in LUFS.
pub const STREAMING_TARGET_LUFS: f64 = -14.0;

/// True-peak ceiling applied during normalization, in dBTP (EBU R128).
pub const DEFAULT_PEAK_CEILING_DBTP: f64 = -1.5;

/// Silence-detection threshold for trimming, in dB.
pub const DEFAULT_SILENCE_THRESHOLD_DB: f64 = -30.0;

/// Lead-in kept before the first detected signal, in milliseconds.
pub const DEFAULT_TRIM_HEAD_MS: f64 = 10.0;

/// Tail kept after the last detected signal, in milliseconds.
pub const DEFAULT_TRIM_TAIL_MS: f64 = 50.0;

/// Default MP3 bitrate in kbit/s.
pub const DEFAULT_MP3_BITRATE_KBPS: u32 = 128;
