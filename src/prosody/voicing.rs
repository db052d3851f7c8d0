use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::types::SpeechInterval;

/// Fraction of `[start, end]` covered by speech intervals.
pub fn overlap_fraction(start: f64, end: f64, intervals: &[SpeechInterval]) -> f32 {
    let duration = end - start;
    if duration <= 0.0 {
        return if intervals.iter().any(|iv| iv.start <= start && start <= iv.end) {
            1.0
        } else {
            0.0
        };
    }
    let covered: f64 = intervals
        .iter()
        .map(|iv| (iv.end.min(end) - iv.start.max(start)).max(0.0))
        .sum();
    (covered / duration).clamp(0.0, 1.0) as f32
}

/// Mean spectral flatness (geometric over arithmetic mean of the power
/// spectrum) of Hann-windowed frames. Silence counts as fully flat.
pub struct FlatnessAnalyzer {
    fft_size: usize,
    fft: std::sync::Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
}

impl FlatnessAnalyzer {
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.max(16);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let window = (0..fft_size)
            .map(|n| {
                let phase = 2.0 * std::f32::consts::PI * n as f32 / fft_size as f32;
                0.5 - 0.5 * phase.cos()
            })
            .collect();
        Self {
            fft_size,
            fft,
            window,
        }
    }

    pub fn flatness(&self, samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 1.0;
        }
        let hop = self.fft_size / 2;
        let mut total = 0.0f32;
        let mut frames = 0usize;
        let mut start = 0usize;
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.fft_size];
        loop {
            let end = (start + self.fft_size).min(samples.len());
            for (k, slot) in buffer.iter_mut().enumerate() {
                let x = if start + k < end { samples[start + k] } else { 0.0 };
                *slot = Complex::new(x * self.window[k], 0.0);
            }
            self.fft.process(&mut buffer);
            total += frame_flatness(&buffer[..self.fft_size / 2 + 1]);
            frames += 1;
            if end >= samples.len() {
                break;
            }
            start += hop;
        }
        total / frames as f32
    }
}

fn frame_flatness(bins: &[Complex<f32>]) -> f32 {
    const EPS: f64 = 1e-12;
    let power: Vec<f64> = bins.iter().map(|c| c.norm_sqr() as f64).collect();
    let arith = power.iter().sum::<f64>() / power.len() as f64;
    if arith <= EPS {
        return 1.0;
    }
    let log_mean = power.iter().map(|p| (p + EPS).ln()).sum::<f64>() / power.len() as f64;
    (log_mean.exp() / arith).clamp(0.0, 1.0) as f32
}

/// Voicing estimate without a speech detector.
pub fn blended_voicing(energy: f32, flatness: f32) -> f32 {
    (0.5 * energy + 0.5 * (1.0 - flatness)).clamp(0.0, 1.0)
}
