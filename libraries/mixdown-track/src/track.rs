//! The immutable track facade.
//!
//! A [`Track`] bundles planar f32 channels with their sample rate and never
//! mutates: every transform allocates a fresh track and leaves the receiver
//! observationally unchanged, so tracks can be shared freely across
//! threads.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, Mp3Encoder};
use crate::error::{Result, TrackError};
use crate::transforms;
use crate::wav;
use crate::{
    DEFAULT_MP3_BITRATE_KBPS, DEFAULT_PEAK_CEILING_DBTP, DEFAULT_SILENCE_THRESHOLD_DB,
    DEFAULT_TRIM_HEAD_MS, DEFAULT_TRIM_TAIL_MS, STREAMING_TARGET_LUFS,
};

/// Full measurement summary of one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoudnessReport {
    /// Integrated loudness in LUFS (negative infinity for silence)
    pub integrated_lufs: f64,
    /// Loudness range in LU
    pub loudness_range_lu: f64,
    /// True peak, linear
    pub true_peak: f64,
    /// True peak in dBTP
    pub true_peak_dbtp: f64,
    /// Largest raw sample value, linear
    pub sample_peak: f64,
    /// Program length in seconds
    pub duration_seconds: f64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count (1 or 2)
    pub channels: usize,
}

impl fmt::Display for LoudnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: {:.1} LUFS, Range: {:.1} LU, True Peak: {:.1} dBTP",
            self.integrated_lufs, self.loudness_range_lu, self.true_peak_dbtp
        )
    }
}

/// Raw PCM exported from a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcmData {
    /// Planar channels, each the full program length
    pub channels: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// An immutable piece of mono or stereo PCM audio.
///
/// # Example
///
/// ```
/// use mixdown_track::Track;
///
/// let track = Track::silence(500.0, 44_100, 2)?;
/// let processed = track.gain(-6.0).fade_in(100.0);
///
/// assert_eq!(processed.len(), track.len());
/// assert_eq!(processed.channel_count(), 2);
/// # Ok::<(), mixdown_track::TrackError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Track {
    /// Internal constructor for outputs whose invariants the transform
    /// layer already guarantees.
    fn from_parts(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// Build a track from encoded bytes.
    ///
    /// Buffers starting with `RIFF` are parsed as WAV in-process; anything
    /// else is handed to the external compressed decoder on a blocking
    /// thread, which is why this constructor is async.
    ///
    /// # Errors
    /// [`TrackError::InvalidWav`] for malformed WAV input,
    /// [`TrackError::DecodeFailed`] when the external decoder rejects the
    /// buffer, plus the usual construction validation.
    pub async fn from_buffer(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() >= 4 && &bytes[..4] == b"RIFF" {
            let (channels, sample_rate) = wav::decode(&bytes)?;
            return Self::from_channels(channels, sample_rate);
        }

        let decoded = tokio::task::spawn_blocking(move || codec::decode_bytes(bytes))
            .await
            .map_err(|e| TrackError::DecodeFailed(e.to_string()))??;
        Self::from_channels(decoded.channels, decoded.sample_rate)
    }

    /// Build a track from planar channels, taking ownership of the buffers.
    ///
    /// # Errors
    /// [`TrackError::EmptyTrack`] with no channels,
    /// [`TrackError::UnsupportedChannelLayout`] past stereo,
    /// [`TrackError::ChannelLengthMismatch`] for ragged buffers and
    /// [`TrackError::InvalidSampleRate`] for a zero rate.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(TrackError::EmptyTrack);
        }
        if channels.len() > 2 {
            return Err(TrackError::UnsupportedChannelLayout(channels.len()));
        }
        if sample_rate == 0 {
            return Err(TrackError::InvalidSampleRate(sample_rate));
        }
        let first = channels[0].len();
        if let Some(other) = channels.iter().map(Vec::len).find(|&len| len != first) {
            return Err(TrackError::ChannelLengthMismatch { first, other });
        }
        Ok(Self::from_parts(channels, sample_rate))
    }

    /// A zero-filled track of `duration_ms` milliseconds.
    pub fn silence(duration_ms: f64, sample_rate: u32, channels: usize) -> Result<Self> {
        let frames = (duration_ms.max(0.0) * sample_rate as f64 / 1000.0) as usize;
        Self::from_channels(vec![vec![0.0; frames]; channels], sample_rate)
    }

    // === Accessors ===

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (1 or 2).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Whether the track holds zero samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Program length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// A copy of channel `index`.
    ///
    /// # Errors
    /// [`TrackError::ChannelIndexOutOfRange`] past the channel list.
    pub fn get_channel(&self, index: usize) -> Result<Vec<f32>> {
        self.channels
            .get(index)
            .cloned()
            .ok_or(TrackError::ChannelIndexOutOfRange {
                index,
                channels: self.channels.len(),
            })
    }

    // === Measurement ===

    /// Integrated loudness in LUFS.
    ///
    /// Negative infinity is the sentinel for silence and programs shorter
    /// than one 400 ms gating block.
    ///
    /// # Errors
    /// [`TrackError::Dsp`] for sample rates outside 44.1/48 kHz.
    pub fn loudness(&self) -> Result<f64> {
        Ok(mixdown_dsp::integrated_loudness(
            &self.channels,
            self.sample_rate,
        )?)
    }

    /// Loudness range in LU.
    ///
    /// # Errors
    /// [`TrackError::Dsp`] for sample rates outside 44.1/48 kHz.
    pub fn loudness_range(&self) -> Result<f64> {
        Ok(mixdown_dsp::loudness_range(
            &self.channels,
            self.sample_rate,
        )?)
    }

    /// Linear true peak, maximum across channels.
    pub fn true_peak(&self) -> f64 {
        mixdown_dsp::true_peak_channels(&self.channels, self.sample_rate)
    }

    /// Largest raw sample value, maximum across channels.
    pub fn sample_peak(&self) -> f64 {
        self.channels
            .iter()
            .map(|ch| mixdown_dsp::sample_peak(ch))
            .fold(0.0, f64::max)
    }

    /// RMS level over all channels.
    ///
    /// This is a **linear** amplitude, not decibels; callers wanting dB go
    /// through [`mixdown_dsp::linear_to_db`].
    pub fn rms(&self) -> f64 {
        let samples = self.len() * self.channel_count();
        if samples == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .channels
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|&x| x as f64 * x as f64)
            .sum();
        (sum / samples as f64).sqrt()
    }

    /// Everything at once: loudness, range, peaks, shape.
    ///
    /// # Errors
    /// [`TrackError::Dsp`] for sample rates outside 44.1/48 kHz.
    pub fn report(&self) -> Result<LoudnessReport> {
        let true_peak = self.true_peak();
        Ok(LoudnessReport {
            integrated_lufs: self.loudness()?,
            loudness_range_lu: self.loudness_range()?,
            true_peak,
            true_peak_dbtp: mixdown_dsp::linear_to_db(true_peak),
            sample_peak: self.sample_peak(),
            duration_seconds: self.duration_seconds(),
            sample_rate: self.sample_rate,
            channels: self.channel_count(),
        })
    }

    // === Transforms ===

    /// Apply `db` of gain. No clipping.
    pub fn gain(&self, db: f64) -> Self {
        Self::from_parts(transforms::gain(&self.channels, db), self.sample_rate)
    }

    /// Linear fade-in over the first `ms` milliseconds.
    pub fn fade_in(&self, ms: f64) -> Self {
        Self::from_parts(
            transforms::fade_in(&self.channels, self.sample_rate, ms),
            self.sample_rate,
        )
    }

    /// Linear fade-out over the last `ms` milliseconds.
    pub fn fade_out(&self, ms: f64) -> Self {
        Self::from_parts(
            transforms::fade_out(&self.channels, self.sample_rate, ms),
            self.sample_rate,
        )
    }

    /// Extract `[start_ms, end_ms)`; `None` means end-of-track.
    pub fn slice(&self, start_ms: f64, end_ms: Option<f64>) -> Self {
        Self::from_parts(
            transforms::slice(&self.channels, self.sample_rate, start_ms, end_ms),
            self.sample_rate,
        )
    }

    /// Mirror the program in time.
    pub fn reverse(&self) -> Self {
        Self::from_parts(transforms::reverse(&self.channels), self.sample_rate)
    }

    /// Append `other` after this track.
    ///
    /// # Errors
    /// [`TrackError::SampleRateMismatch`] /
    /// [`TrackError::ChannelCountMismatch`] when the operands disagree.
    pub fn concat(&self, other: &Track) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(Self::from_parts(
            transforms::concat(&self.channels, &other.channels),
            self.sample_rate,
        ))
    }

    /// Mix `other` into this track with `gain_db` applied to it.
    ///
    /// The output is as long as the longer operand; the shorter is
    /// zero-extended.
    ///
    /// # Errors
    /// [`TrackError::SampleRateMismatch`] /
    /// [`TrackError::ChannelCountMismatch`] when the operands disagree.
    pub fn mix(&self, other: &Track, gain_db: f64) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(Self::from_parts(
            transforms::mix(&self.channels, &other.channels, gain_db),
            self.sample_rate,
        ))
    }

    /// Change playback speed by `rate_factor` (2.0 = twice as fast, an
    /// octave up). The sample rate is unchanged; pitch shifts with speed.
    ///
    /// # Errors
    /// [`TrackError::InvalidSpeedRate`] for non-positive factors.
    pub fn speed(&self, rate_factor: f64) -> Result<Self> {
        Ok(Self::from_parts(
            transforms::speed(&self.channels, rate_factor)?,
            self.sample_rate,
        ))
    }

    /// Trim leading/trailing silence below `threshold_db`, keeping
    /// `head_ms` of lead-in and `tail_ms` of tail.
    pub fn trim_silence(&self, threshold_db: f64, head_ms: f64, tail_ms: f64) -> Self {
        Self::from_parts(
            transforms::trim_silence(
                &self.channels,
                self.sample_rate,
                threshold_db,
                head_ms,
                tail_ms,
            ),
            self.sample_rate,
        )
    }

    /// [`Track::trim_silence`] with the documented defaults
    /// (-30 dB, 10 ms head, 50 ms tail).
    pub fn trim_silence_default(&self) -> Self {
        self.trim_silence(
            DEFAULT_SILENCE_THRESHOLD_DB,
            DEFAULT_TRIM_HEAD_MS,
            DEFAULT_TRIM_TAIL_MS,
        )
    }

    /// Normalize to `target_lufs` with a true-peak ceiling at
    /// `peak_limit_dbtp`; one scalar per program, so the stereo image is
    /// preserved.
    ///
    /// # Errors
    /// [`TrackError::Dsp`] for sample rates outside 44.1/48 kHz.
    pub fn normalize_loudness(&self, target_lufs: f64, peak_limit_dbtp: f64) -> Result<Self> {
        Ok(Self::from_parts(
            transforms::normalize_loudness(
                &self.channels,
                self.sample_rate,
                target_lufs,
                peak_limit_dbtp,
            )?,
            self.sample_rate,
        ))
    }

    /// [`Track::normalize_loudness`] at the streaming defaults
    /// (-14 LUFS, -1.5 dBTP).
    pub fn normalize(&self) -> Result<Self> {
        self.normalize_loudness(STREAMING_TARGET_LUFS, DEFAULT_PEAK_CEILING_DBTP)
    }

    // === Export ===

    /// Serialize as canonical 16-bit PCM WAV.
    pub fn to_wav(&self) -> Vec<u8> {
        wav::encode(&self.channels, self.sample_rate)
    }

    /// Encode as MP3 through the supplied external encoder.
    ///
    /// # Errors
    /// [`TrackError::EncodeFailed`] when the encoder rejects the program.
    pub fn to_mp3(&self, encoder: &dyn Mp3Encoder, bitrate_kbps: u32) -> Result<Vec<u8>> {
        debug!(
            bitrate_kbps,
            frames = self.len(),
            "encoding track through external MP3 encoder"
        );
        encoder.encode(&self.channels, self.sample_rate, bitrate_kbps)
    }

    /// [`Track::to_mp3`] at the default bitrate (128 kbit/s).
    ///
    /// # Errors
    /// [`TrackError::EncodeFailed`] when the encoder rejects the program.
    pub fn to_mp3_default(&self, encoder: &dyn Mp3Encoder) -> Result<Vec<u8>> {
        self.to_mp3(encoder, DEFAULT_MP3_BITRATE_KBPS)
    }

    /// Copy out the raw PCM.
    pub fn to_pcm(&self) -> PcmData {
        PcmData {
            channels: self.channels.clone(),
            sample_rate: self.sample_rate,
        }
    }

    fn check_compatible(&self, other: &Track) -> Result<()> {
        if self.sample_rate != other.sample_rate {
            return Err(TrackError::SampleRateMismatch {
                left: self.sample_rate,
                right: other.sample_rate,
            });
        }
        if self.channel_count() != other.channel_count() {
            return Err(TrackError::ChannelCountMismatch {
                left: self.channel_count(),
                right: other.channel_count(),
            });
        }
        Ok(())
    }
}
