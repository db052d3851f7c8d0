use crate::config::TrimConfig;

/// Leading non-vocal section to cut before alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroTrim {
    pub onset_sec: f64,
    /// Seconds removed from the front; added back to every timestamp.
    pub offset_sec: f64,
    pub offset_samples: usize,
}

/// Finds a long instrumental intro on a vocal stem.
///
/// The threshold is 8% of the "singing level" (median of the loudest 20% of
/// frames) so that residual separation bleed stays below it. Returns `None`
/// when the onset is earlier than `min_intro_sec` or the clip is too short to
/// judge.
pub fn detect_intro_trim(
    samples: &[f32],
    sample_rate_hz: u32,
    config: &TrimConfig,
) -> Option<IntroTrim> {
    if !config.enabled {
        return None;
    }
    let frame_rms = compute_frame_rms(samples, sample_rate_hz, config.hop_sec)?;
    if frame_rms.len() < config.sustained_frames * 2 {
        return None;
    }

    let singing_level = loud_frame_median(&frame_rms, config.loud_fraction);
    let threshold = singing_level * config.threshold_ratio;
    let onset_frame = first_run_above_threshold(&frame_rms, threshold, config.sustained_frames)?;
    let frame_sec = hop_samples(sample_rate_hz, config.hop_sec) as f64 / sample_rate_hz as f64;
    let onset_sec = onset_frame as f64 * frame_sec;

    tracing::debug!(
        singing_level = format!("{singing_level:.4}"),
        threshold = format!("{threshold:.4}"),
        onset_frame,
        onset_sec = format!("{onset_sec:.2}"),
        "intro trim: detected vocal onset"
    );

    if onset_sec < config.min_intro_sec {
        return None;
    }
    let offset_sec = (onset_sec - config.preroll_sec).max(0.0);
    let offset_samples = ((offset_sec * sample_rate_hz as f64) as usize).min(samples.len());
    Some(IntroTrim {
        onset_sec,
        offset_sec,
        offset_samples,
    })
}

/// First and last frame whose RMS exceeds `ratio` of the peak, in seconds.
pub fn detect_vocal_range(
    samples: &[f32],
    sample_rate_hz: u32,
    hop_sec: f64,
    ratio: f32,
) -> Option<(f64, f64)> {
    let frame_rms = compute_frame_rms(samples, sample_rate_hz, hop_sec)?;
    let peak = frame_rms.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return None;
    }
    let threshold = peak * ratio;
    let first = frame_rms.iter().position(|&r| r > threshold)?;
    let last = frame_rms.iter().rposition(|&r| r > threshold)?;
    let frame_sec = hop_samples(sample_rate_hz, hop_sec) as f64 / sample_rate_hz as f64;
    let duration = samples.len() as f64 / sample_rate_hz as f64;
    let start = first as f64 * frame_sec;
    let end = ((last + 1) as f64 * frame_sec).min(duration);
    (end > start).then_some((start, end))
}

fn loud_frame_median(frame_rms: &[f32], loud_fraction: f32) -> f32 {
    let mut sorted = frame_rms.to_vec();
    sorted.sort_by(f32::total_cmp);
    let keep_from = ((1.0 - loud_fraction.clamp(0.0, 1.0)) * sorted.len() as f32) as usize;
    let loud = &sorted[keep_from.min(sorted.len() - 1)..];
    let mid = loud.len() / 2;
    if loud.len() % 2 == 0 {
        (loud[mid - 1] + loud[mid]) * 0.5
    } else {
        loud[mid]
    }
}

/// Start of the first run of `min_consec_frames` frames strictly above
/// `threshold`.
pub(crate) fn first_run_above_threshold(
    frame_rms: &[f32],
    threshold: f32,
    min_consec_frames: usize,
) -> Option<usize> {
    let mut run_start = 0usize;
    let mut run_len = 0usize;
    for (frame_idx, rms) in frame_rms.iter().copied().enumerate() {
        if rms > threshold {
            if run_len == 0 {
                run_start = frame_idx;
            }
            run_len += 1;
            if run_len >= min_consec_frames.max(1) {
                return Some(run_start);
            }
            continue;
        }
        run_len = 0;
    }
    None
}

fn hop_samples(sample_rate_hz: u32, hop_sec: f64) -> usize {
    ((sample_rate_hz as f64 * hop_sec).round() as usize).max(1)
}

/// Non-overlapping RMS frames; a trailing partial frame is dropped.
pub(crate) fn compute_frame_rms(
    samples: &[f32],
    sample_rate_hz: u32,
    hop_sec: f64,
) -> Option<Vec<f32>> {
    if samples.is_empty() || sample_rate_hz == 0 {
        return None;
    }
    let frame_len = hop_samples(sample_rate_hz, hop_sec);
    let frame_rms: Vec<f32> = samples
        .chunks_exact(frame_len)
        .map(|chunk| {
            let mean_sq =
                chunk.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>() / chunk.len() as f64;
            mean_sq.sqrt() as f32
        })
        .collect();
    if frame_rms.is_empty() {
        return None;
    }
    Some(frame_rms)
}
