//! External MP3 encoder seam.

use crate::error::Result;

/// An external MP3 encoder.
///
/// The core never links an encoder itself; deployments implement this trait
/// over their encoder of choice and pass it to
/// [`crate::Track::to_mp3`]. Implementations receive planar float channels
/// exactly as the track holds them.
pub trait Mp3Encoder: Send + Sync {
    /// Encode planar channels into an MP3 bitstream.
    ///
    /// # Errors
    /// Implementations surface encoder failures as
    /// [`crate::TrackError::EncodeFailed`].
    fn encode(
        &self,
        channels: &[Vec<f32>],
        sample_rate: u32,
        bitrate_kbps: u32,
    ) -> Result<Vec<u8>>;
}
