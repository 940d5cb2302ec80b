//! Error types for the DSP kernel

use thiserror::Error;

/// Result type for DSP operations
pub type Result<T> = std::result::Result<T, DspError>;

/// Errors that can occur inside the measurement kernel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DspError {
    /// K-weighting coefficients exist only for the two broadcast rates
    #[error("Unsupported sample rate: {0} Hz (loudness is defined at 44100 and 48000 Hz)")]
    UnsupportedSampleRate(u32),
}
