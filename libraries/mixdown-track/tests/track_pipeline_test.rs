//! End-to-end tests over the track facade: ingest, measure, transform,
//! export.

use mixdown_dsp::db_to_linear;
use mixdown_track::{
    Mp3Encoder, Result, Track, TrackError, DEFAULT_PEAK_CEILING_DBTP, STREAMING_TARGET_LUFS,
};

fn sine_track(freq: f64, amplitude: f64, sample_rate: u32, seconds: f64, channels: usize) -> Track {
    let n = (sample_rate as f64 * seconds) as usize;
    let buffer: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()) as f32
        })
        .collect();
    Track::from_channels(vec![buffer; channels], sample_rate).unwrap()
}

#[tokio::test]
async fn wav_bytes_round_trip_through_from_buffer() {
    let original = sine_track(440.0, 0.5, 44_100, 0.25, 2);
    let bytes = original.to_wav();

    let reloaded = Track::from_buffer(bytes).await.unwrap();
    assert_eq!(reloaded.sample_rate(), 44_100);
    assert_eq!(reloaded.channel_count(), 2);
    assert_eq!(reloaded.len(), original.len());

    let before = original.get_channel(0).unwrap();
    let after = reloaded.get_channel(0).unwrap();
    for (a, b) in before.iter().zip(after.iter()) {
        assert!((a - b).abs() <= 1.0 / 32768.0);
    }
}

#[tokio::test]
async fn undecodable_bytes_surface_decode_failed() {
    let result = Track::from_buffer(vec![0x42; 256]).await;
    assert!(matches!(result, Err(TrackError::DecodeFailed(_))));
}

#[tokio::test]
async fn truncated_riff_surfaces_invalid_wav() {
    let result = Track::from_buffer(b"RIFF1234WAVE".to_vec()).await;
    assert!(matches!(result, Err(TrackError::InvalidWav(_))));
}

#[test]
fn normalize_hits_target_and_respects_ceiling() {
    let track = sine_track(997.0, 0.1, 48_000, 2.0, 2);
    let normalized = track.normalize().unwrap();

    let lufs = normalized.loudness().unwrap();
    assert!(
        (lufs - STREAMING_TARGET_LUFS).abs() < 0.5,
        "normalized loudness {lufs} is not within 0.5 LU of the target"
    );
    let ceiling = db_to_linear(DEFAULT_PEAK_CEILING_DBTP);
    assert!(
        normalized.true_peak() <= ceiling + 0.01,
        "true peak {} exceeds the ceiling",
        normalized.true_peak()
    );

    // The receiver is untouched: a -20 dB stereo sine still reads about
    // -20 LUFS.
    let lufs_before = track.loudness().unwrap();
    assert!((lufs_before - (-20.0)).abs() < 1.0);
}

#[test]
fn normalization_preserves_stereo_balance() {
    let n = 96_000;
    let left: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f64 / 48_000.0;
            (0.4 * (2.0 * std::f64::consts::PI * 997.0 * t).sin()) as f32
        })
        .collect();
    let right: Vec<f32> = left.iter().map(|&x| x * 0.5).collect();
    let track = Track::from_channels(vec![left, right], 48_000).unwrap();

    let normalized = track.normalize().unwrap();
    let rms = |ch: &[f32]| {
        (ch.iter().map(|&x| x as f64 * x as f64).sum::<f64>() / ch.len() as f64).sqrt()
    };
    let before = rms(&track.get_channel(0).unwrap()) / rms(&track.get_channel(1).unwrap());
    let after =
        rms(&normalized.get_channel(0).unwrap()) / rms(&normalized.get_channel(1).unwrap());
    assert!(
        (before - after).abs() < 1e-6,
        "stereo balance moved from {before} to {after}"
    );
}

#[test]
fn duplicating_mono_to_stereo_adds_three_lu() {
    let mono = sine_track(997.0, 0.5, 48_000, 2.0, 1);
    let stereo = sine_track(997.0, 0.5, 48_000, 2.0, 2);

    let delta = stereo.loudness().unwrap() - mono.loudness().unwrap();
    assert!(
        (delta - 3.0103).abs() < 0.05,
        "stereo duplication added {delta} LU"
    );
}

#[test]
fn trim_silence_scenario() {
    // 200 ms silence + 500 ms tone + 200 ms silence, trimmed with the
    // documented defaults: shorter output, signal close to the head.
    let rate = 44_100;
    let pad = Track::silence(200.0, rate, 1).unwrap();
    let tone = sine_track(440.0, 0.8, rate, 0.5, 1);
    let assembled = pad.concat(&tone).unwrap().concat(&pad).unwrap();

    let trimmed = assembled.trim_silence_default();
    assert!(trimmed.len() < assembled.len());

    // Signal must show up within the head-room (10 ms) plus one detection
    // window of slack.
    let slack = rate as usize / 50;
    let head = &trimmed.get_channel(0).unwrap()[..slack];
    let peak = head.iter().map(|x| x.abs()).fold(0.0_f32, f32::max);
    assert!(peak > 0.01, "trimmed head contains no signal (peak {peak})");
}

#[test]
fn speed_changes_duration_not_rate() {
    let track = sine_track(440.0, 0.5, 48_000, 1.0, 1);

    let faster = track.speed(2.0).unwrap();
    assert_eq!(faster.sample_rate(), 48_000);
    assert_eq!(faster.len(), track.len() / 2);

    let same = track.speed(1.0).unwrap();
    assert_eq!(same.get_channel(0).unwrap(), track.get_channel(0).unwrap());
}

#[test]
fn report_summarizes_the_program() {
    let track = sine_track(997.0, db_to_linear(-6.0), 48_000, 2.0, 2);
    let report = track.report().unwrap();

    assert_eq!(report.sample_rate, 48_000);
    assert_eq!(report.channels, 2);
    assert!((report.duration_seconds - 2.0).abs() < 1e-6);
    assert!((report.true_peak_dbtp - (-6.0)).abs() < 0.2);
    assert!(report.sample_peak <= report.true_peak + 1e-9);
    assert!(report.integrated_lufs < 0.0 && report.integrated_lufs.is_finite());
    assert!(report.loudness_range_lu < 0.5);

    let rendered = format!("{report}");
    assert!(rendered.contains("LUFS") && rendered.contains("dBTP"));

    // Reports ship over the wire; the serde surface must hold.
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"integrated_lufs\""));
    assert!(json.contains("\"sample_rate\":48000"));
}

struct StubEncoder {
    fail: bool,
}

impl Mp3Encoder for StubEncoder {
    fn encode(
        &self,
        channels: &[Vec<f32>],
        _sample_rate: u32,
        bitrate_kbps: u32,
    ) -> Result<Vec<u8>> {
        if self.fail {
            return Err(TrackError::EncodeFailed("stub rejected input".to_string()));
        }
        // Opaque payload standing in for a real bitstream.
        Ok(vec![0xFF, 0xFB, bitrate_kbps as u8, channels.len() as u8])
    }
}

#[test]
fn to_mp3_delegates_to_the_encoder_seam() {
    let track = Track::silence(100.0, 44_100, 2).unwrap();

    let bytes = track.to_mp3(&StubEncoder { fail: false }, 192).unwrap();
    assert_eq!(bytes, vec![0xFF, 0xFB, 192, 2]);

    // The default path pins the documented 128 kbit/s bitrate.
    let bytes = track.to_mp3_default(&StubEncoder { fail: false }).unwrap();
    assert_eq!(bytes, vec![0xFF, 0xFB, 128, 2]);

    let err = track.to_mp3(&StubEncoder { fail: true }, 128).unwrap_err();
    assert!(matches!(err, TrackError::EncodeFailed(_)));
}
