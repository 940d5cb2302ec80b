//! Canonical 16-bit PCM RIFF/WAVE read/write.
//!
//! The writer always emits the 44-byte canonical header followed by
//! interleaved little-endian int16 frames. The reader verifies the
//! `RIFF`/`WAVE` magic and then walks chunks, so files with extra metadata
//! chunks between `fmt ` and `data` still parse.
//!
//! Scaling is asymmetric in both directions (negative samples map through
//! 32768, non-negative through 32767) so an encode/decode round trip stays
//! within one quantization step.

use crate::error::{Result, TrackError};

/// Canonical header length in bytes.
pub const HEADER_LEN: usize = 44;

/// PCM format tag in the `fmt ` chunk.
const FORMAT_PCM: u16 = 1;

fn f32_to_i16(x: f32) -> i16 {
    let clamped = x.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0).round() as i16
    } else {
        (clamped * 32767.0).round() as i16
    }
}

fn i16_to_f32(s: i16) -> f32 {
    if s < 0 {
        s as f32 / 32768.0
    } else {
        s as f32 / 32767.0
    }
}

/// Serialize planar channels as a canonical 16-bit PCM WAV file.
///
/// Samples are clamped to [-1, 1] before quantization; headroom beyond
/// full scale is only ever lost here, at the fixed-point boundary.
pub fn encode(channels: &[Vec<f32>], sample_rate: u32) -> Vec<u8> {
    let channel_count = channels.len() as u32;
    let frames = channels.first().map_or(0, Vec::len) as u32;
    let data_size = frames * channel_count * 2;
    let byte_rate = sample_rate * channel_count * 2;
    let block_align = (channel_count * 2) as u16;

    let mut out = Vec::with_capacity(HEADER_LEN + data_size as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16_u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&(channel_count as u16).to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16_u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    for frame in 0..frames as usize {
        for channel in channels {
            out.extend_from_slice(&f32_to_i16(channel[frame]).to_le_bytes());
        }
    }
    out
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Parse a 16-bit PCM WAV file into planar channels and its sample rate.
///
/// # Errors
/// [`TrackError::InvalidWav`] when the buffer is shorter than the canonical
/// header, the `RIFF`/`WAVE` magic is missing, or the format is not 16-bit
/// integer PCM.
pub fn decode(bytes: &[u8]) -> Result<(Vec<Vec<f32>>, u32)> {
    if bytes.len() < HEADER_LEN {
        return Err(TrackError::InvalidWav(format!(
            "buffer of {} bytes is shorter than the 44-byte header",
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(TrackError::InvalidWav(
            "missing RIFF/WAVE magic".to_string(),
        ));
    }

    let mut format: Option<(u16, u32, u16)> = None;
    let mut data: Option<&[u8]> = None;

    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let chunk_id = &bytes[offset..offset + 4];
        let chunk_size = read_u32(bytes, offset + 4) as usize;
        let body_start = offset + 8;
        let body_end = (body_start + chunk_size).min(bytes.len());

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || body_start + 16 > bytes.len() {
                    return Err(TrackError::InvalidWav("truncated fmt chunk".to_string()));
                }
                let format_tag = read_u16(bytes, body_start);
                let channel_count = read_u16(bytes, body_start + 2);
                let sample_rate = read_u32(bytes, body_start + 4);
                let bits_per_sample = read_u16(bytes, body_start + 14);
                if format_tag != FORMAT_PCM || bits_per_sample != 16 {
                    return Err(TrackError::InvalidWav(format!(
                        "only 16-bit PCM is supported (format tag {format_tag}, {bits_per_sample} bits)"
                    )));
                }
                format = Some((channel_count, sample_rate, bits_per_sample));
            }
            b"data" => {
                data = Some(&bytes[body_start..body_end]);
            }
            _ => {}
        }

        // Chunks are word-aligned; odd sizes carry a pad byte.
        offset = body_start + chunk_size + (chunk_size & 1);
    }

    let (channel_count, sample_rate, _) = format
        .ok_or_else(|| TrackError::InvalidWav("missing fmt chunk".to_string()))?;
    let data = data.ok_or_else(|| TrackError::InvalidWav("missing data chunk".to_string()))?;
    if channel_count == 0 {
        return Err(TrackError::InvalidWav("zero channels".to_string()));
    }

    let channel_count = channel_count as usize;
    let frames = data.len() / (channel_count * 2);
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in 0..frames {
        for (ch, channel) in channels.iter_mut().enumerate() {
            let at = (frame * channel_count + ch) * 2;
            let sample = i16::from_le_bytes([data[at], data[at + 1]]);
            channel.push(i16_to_f32(sample));
        }
    }

    Ok((channels, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_one_quantization_step() {
        let left: Vec<f32> = (0..200).map(|i| ((i as f32) / 200.0) * 2.0 - 1.0).collect();
        let right: Vec<f32> = left.iter().map(|x| -x * 0.5).collect();
        let bytes = encode(&[left.clone(), right.clone()], 44_100);

        let (channels, rate) = decode(&bytes).unwrap();
        assert_eq!(rate, 44_100);
        assert_eq!(channels.len(), 2);
        for (orig, decoded) in [(&left, &channels[0]), (&right, &channels[1])] {
            assert_eq!(orig.len(), decoded.len());
            for (a, b) in orig.iter().zip(decoded.iter()) {
                assert!(
                    (a - b).abs() <= 1.0 / 32768.0,
                    "round trip moved {a} to {b}"
                );
            }
        }
    }

    #[test]
    fn stereo_interleaving_byte_layout() {
        // L = [0.5, -0.5], R = [0.25, -0.25]: bytes 44.. must interleave
        // L0, R0, L1, R1 with L0 > R0 > 0 > R1 > L1.
        let bytes = encode(&[vec![0.5, -0.5], vec![0.25, -0.25]], 44_100);
        assert_eq!(bytes.len(), HEADER_LEN + 8);

        let sample =
            |i: usize| i16::from_le_bytes([bytes[HEADER_LEN + i * 2], bytes[HEADER_LEN + i * 2 + 1]]);
        let (l0, r0, l1, r1) = (sample(0), sample(1), sample(2), sample(3));
        assert!(l0 > r0, "{l0} vs {r0}");
        assert!(r0 > 0);
        assert!(0 > r1);
        assert!(r1 > l1, "{r1} vs {l1}");
    }

    #[test]
    fn header_fields() {
        let bytes = encode(&[vec![0.0; 100]], 48_000);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(read_u32(&bytes, 16), 16);
        assert_eq!(read_u16(&bytes, 20), 1); // PCM
        assert_eq!(read_u16(&bytes, 22), 1); // mono
        assert_eq!(read_u32(&bytes, 24), 48_000);
        assert_eq!(read_u32(&bytes, 28), 48_000 * 2); // byte rate
        assert_eq!(read_u16(&bytes, 32), 2); // block align
        assert_eq!(read_u16(&bytes, 34), 16); // bits
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(read_u32(&bytes, 40), 200);
        assert_eq!(read_u32(&bytes, 4), 36 + 200);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            decode(b"not a wav file, not even close, nope..."),
            Err(TrackError::InvalidWav(_))
        ));
        assert!(matches!(decode(&[0u8; 10]), Err(TrackError::InvalidWav(_))));

        // RIFF magic but wrong form type
        let mut bytes = encode(&[vec![0.0; 4]], 44_100);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(decode(&bytes), Err(TrackError::InvalidWav(_))));
    }

    #[test]
    fn clamps_out_of_range_samples() {
        let bytes = encode(&[vec![2.0, -2.0]], 44_100);
        let (channels, _) = decode(&bytes).unwrap();
        assert!((channels[0][0] - 1.0).abs() < 1e-6);
        assert!((channels[0][1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn tolerates_extra_chunks_before_data() {
        // Canonical file, then splice a LIST chunk between fmt and data.
        let base = encode(&[vec![0.5, -0.5]], 44_100);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&base[..36]);
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&4_u32.to_le_bytes());
        bytes.extend_from_slice(b"INFO");
        bytes.extend_from_slice(&base[36..]);
        let riff_size = (bytes.len() - 8) as u32;
        bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());

        let (channels, rate) = decode(&bytes).unwrap();
        assert_eq!(rate, 44_100);
        assert_eq!(channels[0].len(), 2);
    }
}
