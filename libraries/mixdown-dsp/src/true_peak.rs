//! True-peak measurement (ITU-R BS.1770-4 Annex 2).
//!
//! Inter-sample peaks are recovered by 4x oversampling through a polyphase
//! FIR interpolator: one 48-tap Kaiser-windowed sinc prototype split into
//! four 12-tap sub-filters, one per output phase. The table is built once
//! per process and published through a `OnceLock` so Tracks can be measured
//! from any thread.

use std::sync::OnceLock;

/// Oversampling factor (output phases).
const PHASES: usize = 4;
/// Taps per polyphase sub-filter.
const PHASE_TAPS: usize = 12;
/// Prototype length.
const TAPS: usize = PHASES * PHASE_TAPS;
/// Kaiser window shape parameter.
const KAISER_BETA: f64 = 5.0;

static POLYPHASE: OnceLock<[[f64; PHASE_TAPS]; PHASES]> = OnceLock::new();

/// Modified Bessel function of the first kind, order zero.
///
/// Standard power series; terminates once a term falls below 1e-12 of the
/// running sum, which happens well inside 20 iterations for the beta values
/// used here.
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..=20 {
        let factor = x / (2.0 * k as f64);
        term *= factor * factor;
        sum += term;
        if term < 1e-12 * sum {
            break;
        }
    }
    sum
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-10 {
        return 1.0;
    }
    let px = std::f64::consts::PI * x;
    px.sin() / px
}

/// Build the polyphase table from the windowed-sinc prototype.
///
/// The sinc is centered on the nearest multiple of the phase count to the
/// prototype midpoint (24 for 48 taps), which makes phase 0 reproduce the
/// input samples exactly; the Kaiser window stays centered on the true
/// midpoint (23.5). Each phase is normalized to unity DC gain.
fn build_polyphase() -> [[f64; PHASE_TAPS]; PHASES] {
    let sinc_center = (((TAPS - 1) as f64 / (2.0 * PHASES as f64)).round()) * PHASES as f64;
    let window_center = (TAPS - 1) as f64 / 2.0;
    let i0_beta = bessel_i0(KAISER_BETA);

    let mut prototype = [0.0_f64; TAPS];
    for (n, tap) in prototype.iter_mut().enumerate() {
        let t = (n as f64 - window_center) / window_center;
        let window = bessel_i0(KAISER_BETA * (1.0 - t * t).max(0.0).sqrt()) / i0_beta;
        *tap = sinc((n as f64 - sinc_center) / PHASES as f64) * window;
    }

    let mut phases = [[0.0_f64; PHASE_TAPS]; PHASES];
    for (p, phase) in phases.iter_mut().enumerate() {
        for (k, tap) in phase.iter_mut().enumerate() {
            *tap = prototype[k * PHASES + p];
        }
        let dc: f64 = phase.iter().sum();
        for tap in phase.iter_mut() {
            *tap /= dc;
        }
    }
    phases
}

fn phases() -> &'static [[f64; PHASE_TAPS]; PHASES] {
    POLYPHASE.get_or_init(build_polyphase)
}

/// Linear true peak of one channel.
///
/// The raw sample peak is always tracked; interpolated phases are only
/// evaluated once a full 12-sample history exists, so zero-padding at the
/// buffer head cannot manufacture phantom overshoot. `_sample_rate` is
/// accepted for API symmetry with the loudness kernel; the interpolator is
/// rate-independent.
pub fn true_peak(samples: &[f32], _sample_rate: u32) -> f64 {
    let table = phases();
    let mut peak = 0.0_f64;

    for n in 0..samples.len() {
        let raw = (samples[n] as f64).abs();
        if raw > peak {
            peak = raw;
        }
        if n + 1 < PHASE_TAPS {
            continue;
        }
        for phase in table {
            let mut acc = 0.0_f64;
            for (k, &tap) in phase.iter().enumerate() {
                acc += tap * samples[n - k] as f64;
            }
            let interpolated = acc.abs();
            if interpolated > peak {
                peak = interpolated;
            }
        }
    }
    peak
}

/// Linear true peak across a set of channels (the stereo variant).
pub fn true_peak_channels(channels: &[Vec<f32>], sample_rate: u32) -> f64 {
    channels
        .iter()
        .map(|ch| true_peak(ch, sample_rate))
        .fold(0.0, f64::max)
}

/// Largest absolute sample value of one channel.
pub fn sample_peak(samples: &[f32]) -> f64 {
    samples
        .iter()
        .map(|&x| (x as f64).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_reaches_unity() {
        let mut samples = vec![0.0_f32; 1024];
        samples[512] = 1.0;
        let peak = true_peak(&samples, 48_000);
        assert!(peak >= 1.0, "impulse measured {peak}");
    }

    #[test]
    fn adjacent_transient_exceeds_sample_peak() {
        let mut samples = vec![0.0_f32; 256];
        samples[100] = 0.9;
        samples[101] = -0.9;
        let peak = true_peak(&samples, 48_000);
        assert!(peak > 0.9, "transient measured {peak}");
    }

    #[test]
    fn dc_passes_at_unity_gain() {
        let samples = vec![0.5_f32; 256];
        let peak = true_peak(&samples, 48_000);
        assert!((peak - 0.5).abs() < 1e-6, "DC measured {peak}");
    }

    #[test]
    fn quarter_rate_sine_recovers_inter_sample_crest() {
        // Samples land at +-sin(pi/4) = 0.707 but the continuous waveform
        // reaches 1.0 between them.
        let samples: Vec<f32> = (0..512)
            .map(|n| {
                (std::f64::consts::FRAC_PI_2 * n as f64 + std::f64::consts::FRAC_PI_4).sin() as f32
            })
            .collect();
        let raw = sample_peak(&samples);
        let peak = true_peak(&samples, 48_000);
        assert!(raw < 0.72);
        assert!(peak > 0.9, "inter-sample crest measured {peak}");
        assert!(peak > raw, "interpolation found nothing above the raw peak");
    }

    #[test]
    fn empty_and_silent_buffers() {
        assert_eq!(true_peak(&[], 48_000), 0.0);
        assert_eq!(true_peak(&vec![0.0; 64], 44_100), 0.0);
    }

    #[test]
    fn stereo_takes_channel_max() {
        let left = vec![0.25_f32; 64];
        let mut right = vec![0.0_f32; 64];
        right[32] = 0.75;
        let peak = true_peak_channels(&[left, right], 44_100);
        assert!((peak - 0.75).abs() < 1e-9);
    }

    #[test]
    fn phase_zero_is_exact() {
        // The short-history region only tracks raw samples; a smooth ramp
        // must therefore measure exactly its largest sample.
        let samples: Vec<f32> = (0..8).map(|n| n as f32 / 10.0).collect();
        let peak = true_peak(&samples, 48_000);
        assert_eq!(peak, 0.7_f32 as f64);
    }

    #[test]
    fn bessel_series_converges() {
        // I0(5) from tables
        assert!((bessel_i0(5.0) - 27.239_871_823_604_45).abs() < 1e-6);
        assert_eq!(bessel_i0(0.0), 1.0);
    }
}
