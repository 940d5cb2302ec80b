//! Compressed-audio decode via Symphonia.
//!
//! Supports MP3, FLAC, OGG/Vorbis and AAC. The adapter decodes the whole
//! stream into planar f32 channels; anything past the first two channels is
//! dropped, matching the mono/stereo track model.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{Result, TrackError};

/// Planar PCM produced by the external decoder.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

/// Decode a compressed audio buffer into planar f32 channels.
///
/// # Errors
/// [`TrackError::DecodeFailed`] when probing, codec selection or decoding
/// fails, or when the stream contains no audio frames.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<DecodedAudio> {
    let stream = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| TrackError::DecodeFailed(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| TrackError::DecodeFailed("no audio track in stream".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TrackError::DecodeFailed(e.to_string()))?;

    let mut sample_rate = 0_u32;
    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream surfaces as an IO error in Symphonia.
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(TrackError::DecodeFailed(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt frame is skippable; anything else is fatal.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(TrackError::DecodeFailed(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let source_channels = spec.channels.count();
        if source_channels == 0 {
            return Err(TrackError::DecodeFailed(
                "stream reports zero channels".to_string(),
            ));
        }
        if channels.is_empty() {
            channels = vec![Vec::new(); source_channels.min(2)];
        }

        let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        interleaved.copy_interleaved_ref(decoded);
        for frame in interleaved.samples().chunks_exact(source_channels) {
            for (ch, buffer) in channels.iter_mut().enumerate() {
                buffer.push(frame.get(ch).copied().unwrap_or(0.0));
            }
        }
    }

    if sample_rate == 0 || channels.iter().all(Vec::is_empty) {
        return Err(TrackError::DecodeFailed(
            "stream produced no audio frames".to_string(),
        ));
    }

    debug!(
        sample_rate,
        channels = channels.len(),
        frames = channels[0].len(),
        "decoded compressed audio"
    );
    Ok(DecodedAudio {
        channels,
        sample_rate,
    })
}
