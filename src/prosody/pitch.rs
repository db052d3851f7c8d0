use crate::pipeline::traits::F0Estimator;
use crate::types::{F0Frame, PitchEstimate};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub fn midi_from_hz(hz: f32) -> Option<u8> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    let midi = (69.0 + 12.0 * (hz as f64 / 440.0).log2()).round();
    (0.0..=127.0).contains(&midi).then_some(midi as u8)
}

/// Scientific pitch name, `A4` for MIDI 69.
pub fn note_name(midi: u8) -> String {
    let octave = midi as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[midi as usize % 12], octave)
}

pub fn estimate_from_hz(hz: f32) -> PitchEstimate {
    match midi_from_hz(hz) {
        Some(midi) => PitchEstimate {
            hz: (hz * 100.0).round() / 100.0,
            note: note_name(midi),
            midi,
        },
        None => PitchEstimate::unvoiced(),
    }
}

/// Voiced F0 frames placed on the song timeline.
#[derive(Debug, Clone, Default)]
pub struct PitchTrack {
    times: Vec<f64>,
    hz: Vec<f32>,
}

impl PitchTrack {
    /// Runs the estimator over fixed-length chunks. A failing chunk
    /// contributes no frames.
    pub fn estimate(
        estimator: &dyn F0Estimator,
        samples: &[f32],
        sample_rate_hz: u32,
        chunk_sec: f64,
        min_confidence: f32,
    ) -> Self {
        let mut track = Self::default();
        if samples.is_empty() || sample_rate_hz == 0 {
            return track;
        }
        let hop = estimator.hop_sec();
        let chunk_len = ((chunk_sec * sample_rate_hz as f64) as usize).max(1);
        for (chunk_idx, chunk) in samples.chunks(chunk_len).enumerate() {
            let offset = (chunk_idx * chunk_len) as f64 / sample_rate_hz as f64;
            match estimator.infer(chunk, sample_rate_hz) {
                Ok(frames) => track.extend_voiced(&frames, offset, hop, min_confidence),
                Err(err) => tracing::warn!(
                    chunk = chunk_idx,
                    error = %err,
                    "f0 estimation failed for chunk"
                ),
            }
        }
        track
    }

    fn extend_voiced(&mut self, frames: &[F0Frame], offset: f64, hop: f64, min_confidence: f32) {
        for (i, frame) in frames.iter().enumerate() {
            if frame.confidence > min_confidence
                && frame.frequency_hz.is_finite()
                && frame.frequency_hz > 0.0
            {
                self.times.push(offset + i as f64 * hop);
                self.hz.push(frame.frequency_hz);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Mean F0 of voiced frames in `[start, end)`.
    pub fn word_pitch(&self, start: f64, end: f64) -> PitchEstimate {
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t < end);
        if hi <= lo {
            return PitchEstimate::unvoiced();
        }
        let values = &self.hz[lo..hi];
        let mean = values.iter().map(|&f| f as f64).sum::<f64>() / values.len() as f64;
        estimate_from_hz(mean as f32)
    }
}
