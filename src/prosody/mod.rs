//! Per-word energy, voicing and pitch annotations.

use crate::config::ProsodyConfig;
use crate::pipeline::traits::F0Estimator;
use crate::types::{AudioInput, Line, PitchEstimate, Prosody, SpeechInterval};

pub mod energy;
pub mod pitch;
pub mod voicing;

use energy::{round3, word_energy, RmsTrack};
use pitch::PitchTrack;
use voicing::{blended_voicing, overlap_fraction, FlatnessAnalyzer};

pub const DEFAULT_ENERGY: f32 = 0.5;
pub const MIN_CURVE_POINTS: usize = 4;
pub const MAX_CURVE_POINTS: usize = 8;

/// Annotation used when the audio gives no usable signal for a word.
pub fn fallback_prosody(curve_points: usize, pitch: Option<PitchEstimate>) -> Prosody {
    let points = curve_points.clamp(MIN_CURVE_POINTS, MAX_CURVE_POINTS);
    Prosody {
        energy: Some(DEFAULT_ENERGY),
        energy_curve: Some(vec![DEFAULT_ENERGY; points]),
        pitch,
        voiced: Some(0.0),
    }
}

/// Fills `prosody` on every word. Pitch is only attached when an estimator
/// is supplied; voicing uses the speech intervals when present and a
/// spectral estimate otherwise.
pub fn annotate(
    lines: &mut [Line],
    audio: &AudioInput,
    speech_intervals: Option<&[SpeechInterval]>,
    f0: Option<&dyn F0Estimator>,
    config: &ProsodyConfig,
) {
    let points = config.curve_points.clamp(MIN_CURVE_POINTS, MAX_CURVE_POINTS);
    let rate = audio.sample_rate_hz;
    let rms = RmsTrack::compute(&audio.samples, rate, config.rms_frame_sec, config.rms_hop_sec);
    let pitch_track = f0.map(|estimator| {
        PitchTrack::estimate(
            estimator,
            &audio.samples,
            rate,
            config.pitch_chunk_sec,
            config.min_periodicity,
        )
    });
    let flatness = speech_intervals
        .is_none()
        .then(|| FlatnessAnalyzer::new(config.flatness_fft_size));

    let mut annotated = 0usize;
    let mut degraded = 0usize;
    for word in lines.iter_mut().flat_map(|line| line.words.iter_mut()) {
        let pitch = pitch_track
            .as_ref()
            .map(|track| track.word_pitch(word.start_time, word.end_time));
        let Some(energy) = word_energy(
            &rms,
            word.start_time,
            word.end_time,
            config.local_window_sec,
            points,
        ) else {
            word.prosody = fallback_prosody(points, pitch);
            degraded += 1;
            continue;
        };

        let voiced = match (speech_intervals, &flatness) {
            (Some(intervals), _) => overlap_fraction(word.start_time, word.end_time, intervals),
            (None, Some(analyzer)) => {
                let lo = sample_index(word.start_time, rate, audio.samples.len());
                let hi = sample_index(word.end_time, rate, audio.samples.len());
                blended_voicing(energy.energy, analyzer.flatness(&audio.samples[lo..hi]))
            }
            (None, None) => 0.0,
        };

        word.prosody = Prosody {
            energy: Some(energy.energy),
            energy_curve: Some(energy.curve),
            pitch,
            voiced: Some(round3(voiced)),
        };
        annotated += 1;
    }

    tracing::info!(
        annotated,
        degraded,
        pitch = pitch_track.as_ref().map(|t| !t.is_empty()).unwrap_or(false),
        vad = speech_intervals.is_some(),
        "prosody annotated"
    );
}

fn sample_index(t: f64, rate: u32, len: usize) -> usize {
    ((t.max(0.0) * rate as f64) as usize).min(len)
}
