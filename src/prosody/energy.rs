/// Frame-wise RMS with centred frames; frame `i` sits at `i * hop_sec`.
#[derive(Debug, Clone)]
pub struct RmsTrack {
    pub values: Vec<f32>,
    pub hop_sec: f64,
}

impl RmsTrack {
    pub fn compute(samples: &[f32], sample_rate_hz: u32, frame_sec: f64, hop_sec: f64) -> Self {
        if samples.is_empty() || sample_rate_hz == 0 || hop_sec <= 0.0 {
            return Self {
                values: Vec::new(),
                hop_sec,
            };
        }
        let rate = sample_rate_hz as f64;
        let hop = ((rate * hop_sec).round() as usize).max(1);
        let half = ((rate * frame_sec).round() as usize).max(1) / 2;
        let frames = samples.len() / hop + 1;
        let values = (0..frames)
            .map(|i| {
                let center = i * hop;
                let lo = center.saturating_sub(half);
                let hi = (center + half).min(samples.len());
                if hi <= lo {
                    return 0.0;
                }
                let window = &samples[lo..hi];
                let sum_sq = window.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>();
                (sum_sq / window.len() as f64).sqrt() as f32
            })
            .collect();
        Self {
            values,
            hop_sec: hop as f64 / rate,
        }
    }

    /// First frame at or after `t`.
    pub fn frame_at(&self, t: f64) -> usize {
        if t <= 0.0 {
            return 0;
        }
        ((t / self.hop_sec) - 1e-9).ceil().max(0.0) as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordEnergy {
    pub energy: f32,
    pub curve: Vec<f32>,
}

/// Mean RMS over the word, normalized to the min/max of a local window
/// centred on it, plus `points` samples across the span.
pub fn word_energy(
    track: &RmsTrack,
    start: f64,
    end: f64,
    window_sec: f64,
    points: usize,
) -> Option<WordEnergy> {
    let first = track.frame_at(start);
    let last = track.frame_at(end);
    if first >= last || last > track.values.len() {
        return None;
    }
    let window_frames = ((window_sec / track.hop_sec) as usize).max(1);
    let center = (first + last) / 2;
    let lo = center.saturating_sub(window_frames / 2);
    let hi = (center + window_frames / 2).min(track.values.len()).max(lo + 1);
    let local = &track.values[lo..hi];
    let local_min = local.iter().copied().fold(f32::INFINITY, f32::min);
    let local_max = local.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = local_max - local_min + 1e-8;
    let normalize = |v: f32| round3(((v - local_min) / range).clamp(0.0, 1.0));

    let slice = &track.values[first..last];
    let mean = slice.iter().sum::<f32>() / slice.len() as f32;
    let curve = linspace_indices(slice.len(), points)
        .into_iter()
        .map(|i| normalize(slice[i]))
        .collect();
    Some(WordEnergy {
        energy: normalize(mean),
        curve,
    })
}

fn linspace_indices(len: usize, points: usize) -> Vec<usize> {
    if points <= 1 || len <= 1 {
        return vec![0; points.max(1)];
    }
    (0..points)
        .map(|k| (k * (len - 1)) / (points - 1))
        .collect()
}

pub(crate) fn round3(v: f32) -> f32 {
    (v * 1000.0).round() / 1000.0
}
