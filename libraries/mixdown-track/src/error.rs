//! Error types for the track facade

use thiserror::Error;

/// Result type for track operations
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors surfaced by construction, transforms and codecs.
///
/// Loudness returning negative infinity is a sentinel for silent or
/// too-short audio, not an error.
#[derive(Error, Debug)]
pub enum TrackError {
    /// Measurement kernel error (unsupported sample rate)
    #[error(transparent)]
    Dsp(#[from] mixdown_dsp::DspError),

    /// concat/mix across tracks with different channel counts
    #[error("Channel count mismatch: {left} vs {right}")]
    ChannelCountMismatch { left: usize, right: usize },

    /// concat/mix across tracks with different sample rates
    #[error("Sample rate mismatch: {left} Hz vs {right} Hz")]
    SampleRateMismatch { left: u32, right: u32 },

    /// get_channel past the end of the channel list
    #[error("Channel index {index} out of range for {channels}-channel track")]
    ChannelIndexOutOfRange { index: usize, channels: usize },

    /// speed() with a non-positive rate factor
    #[error("Invalid speed rate: {0} (must be > 0)")]
    InvalidSpeedRate(f64),

    /// Malformed RIFF/WAVE input
    #[error("Invalid WAV data: {0}")]
    InvalidWav(String),

    /// The external compressed decoder rejected the input
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// The external MP3 encoder rejected the input
    #[error("MP3 encode failed: {0}")]
    EncodeFailed(String),

    /// Construction with no channels at all
    #[error("Track requires at least one channel")]
    EmptyTrack,

    /// Construction with channel buffers of different lengths
    #[error("Channel buffers must share one length (found {first} and {other})")]
    ChannelLengthMismatch { first: usize, other: usize },

    /// Construction with more channels than the facade models
    #[error("Unsupported channel layout: {0} channels (only mono and stereo)")]
    UnsupportedChannelLayout(usize),

    /// Construction with a zero sample rate
    #[error("Invalid sample rate: {0} Hz (must be positive)")]
    InvalidSampleRate(u32),
}
