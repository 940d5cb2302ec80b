//! Linear fade-in and fade-out ramps.

fn fade_len(ms: f64, sample_rate: u32, track_len: usize) -> usize {
    let samples = (ms * sample_rate as f64 / 1000.0) as usize;
    samples.min(track_len)
}

/// Ramp the first `ms` milliseconds from 0 to 1.
///
/// If the fade region exceeds the track, the entire track is ramped.
pub fn fade_in(channels: &[Vec<f32>], sample_rate: u32, ms: f64) -> Vec<Vec<f32>> {
    let len = channels.first().map_or(0, Vec::len);
    let ramp = fade_len(ms, sample_rate, len);

    channels
        .iter()
        .map(|channel| {
            let mut out = channel.clone();
            for (i, sample) in out.iter_mut().take(ramp).enumerate() {
                *sample *= i as f32 / ramp as f32;
            }
            out
        })
        .collect()
}

/// Ramp the last `ms` milliseconds from 1 to 0 (the mirror of [`fade_in`]).
pub fn fade_out(channels: &[Vec<f32>], sample_rate: u32, ms: f64) -> Vec<Vec<f32>> {
    let len = channels.first().map_or(0, Vec::len);
    let ramp = fade_len(ms, sample_rate, len);

    channels
        .iter()
        .map(|channel| {
            let mut out = channel.clone();
            for (j, sample) in out.iter_mut().skip(len - ramp).enumerate() {
                *sample *= (ramp - 1 - j) as f32 / ramp as f32;
            }
            out
        })
        .collect()
}
