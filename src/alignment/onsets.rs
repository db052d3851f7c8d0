use super::audio_boundaries::compute_frame_rms;
use super::grouping::round_ms;
use crate::config::RefineConfig;
use crate::types::Line;

/// Energy onsets in seconds, ascending.
///
/// The envelope is the positive RMS rise between consecutive frames; a frame
/// is an onset when it is a local envelope peak above `mean + 0.5 * std`.
/// Each onset is moved back to the RMS minimum that precedes it.
pub fn detect_onsets(samples: &[f32], sample_rate_hz: u32, hop_sec: f64) -> Vec<f64> {
    let Some(rms) = compute_frame_rms(samples, sample_rate_hz, hop_sec) else {
        return Vec::new();
    };
    if rms.len() < 3 {
        return Vec::new();
    }
    let frame_sec =
        ((sample_rate_hz as f64 * hop_sec).round().max(1.0)) / sample_rate_hz as f64;

    let mut envelope = vec![0.0f32; rms.len()];
    for t in 1..rms.len() {
        envelope[t] = (rms[t] - rms[t - 1]).max(0.0);
    }
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let var = envelope.iter().map(|e| (e - mean) * (e - mean)).sum::<f32>() / envelope.len() as f32;
    let threshold = mean + 0.5 * var.sqrt();

    let mut onsets = Vec::new();
    for t in 1..envelope.len() {
        let e = envelope[t];
        let next = envelope.get(t + 1).copied().unwrap_or(0.0);
        if e <= threshold || e < envelope[t - 1] || e <= next {
            continue;
        }
        let mut k = t;
        while k > 0 && rms[k - 1] < rms[k] {
            k -= 1;
        }
        let time = k as f64 * frame_sec;
        if onsets.last().map_or(true, |&last| time > last) {
            onsets.push(time);
        }
    }
    tracing::debug!(onsets = onsets.len(), frames = rms.len(), "onsets: detected");
    onsets
}

fn nearest(onsets: &[f64], t: f64) -> Option<f64> {
    let idx = onsets.partition_point(|&o| o < t);
    let after = onsets.get(idx).copied();
    let before = idx.checked_sub(1).and_then(|i| onsets.get(i).copied());
    match (before, after) {
        (Some(b), Some(a)) => Some(if t - b <= a - t { b } else { a }),
        (b, a) => b.or(a),
    }
}

/// Snaps word starts to nearby energy onsets, then re-chains each word's end
/// to the next word's start and recomputes the line span. A line's first word
/// is not snapped later when that would cut the line below
/// `config.min_line_sec`. Returns the number of snapped words.
pub fn refine_word_onsets(lines: &mut [Line], onsets: &[f64], config: &RefineConfig) -> usize {
    if onsets.is_empty() {
        return 0;
    }
    let mut snapped = 0usize;
    for (line_idx, line) in lines.iter_mut().enumerate() {
        let line_start = line.start_time;
        let line_end = line.words.last().map_or(line.end_time, |w| w.end_time);
        for i in 0..line.words.len() {
            let first_of_song = line_idx == 0 && i == 0;
            let tolerance = if first_of_song {
                config.first_word_tolerance_sec
            } else {
                config.tolerance_sec
            };
            let start = line.words[i].start_time;
            let Some(onset) = nearest(onsets, start) else {
                continue;
            };
            if (onset - start).abs() > tolerance {
                continue;
            }
            let floor = if first_of_song {
                (start - config.first_word_tolerance_sec).max(0.0)
            } else if i > 0 {
                line.words[i - 1].end_time
            } else {
                line_start
            };
            let snapped_at = round_ms(onset);
            if i == 0 && snapped_at > start && line_end - snapped_at < config.min_line_sec {
                continue;
            }
            if onset >= floor && onset < line.words[i].end_time {
                line.words[i].start_time = snapped_at;
                snapped += 1;
            }
        }
        for i in 1..line.words.len() {
            let next_start = line.words[i].start_time;
            line.words[i - 1].end_time = next_start;
        }
        line.sync_span_from_words();
    }
    tracing::info!(snapped, "onsets: refined word starts");
    snapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Word;

    const RATE: u32 = 1_000;

    fn bursts(starts: &[f64], total_sec: f64) -> Vec<f32> {
        let mut samples = vec![0.0f32; (total_sec * RATE as f64) as usize];
        for &s in starts {
            let from = (s * RATE as f64) as usize;
            let to = (from + 300).min(samples.len());
            for (k, x) in samples[from..to].iter_mut().enumerate() {
                *x = if k % 2 == 0 { 0.6 } else { -0.6 };
            }
        }
        samples
    }

    #[test]
    fn detects_burst_onsets() {
        let samples = bursts(&[1.0, 2.0, 3.5], 5.0);
        let onsets = detect_onsets(&samples, RATE, 0.016);
        assert_eq!(onsets.len(), 3, "{onsets:?}");
        for (got, want) in onsets.iter().zip([1.0, 2.0, 3.5]) {
            assert!((got - want).abs() < 0.04, "{got} vs {want}");
        }
    }

    #[test]
    fn silence_has_no_onsets() {
        assert!(detect_onsets(&vec![0.0; 4000], RATE, 0.016).is_empty());
    }

    #[test]
    fn nearest_picks_closest_side() {
        let onsets = [1.0, 2.0, 3.0];
        assert_eq!(nearest(&onsets, 1.4), Some(1.0));
        assert_eq!(nearest(&onsets, 1.6), Some(2.0));
        assert_eq!(nearest(&onsets, 9.0), Some(3.0));
        assert_eq!(nearest(&[], 1.0), None);
    }

    fn line(words: &[(&str, f64, f64)]) -> Line {
        Line::from_words(
            words.iter().map(|w| w.0).collect::<Vec<_>>().join(" "),
            words.iter().map(|&(t, s, e)| Word::new(t, s, e)).collect(),
        )
    }

    #[test]
    fn snaps_within_tolerance_and_rechains_ends() {
        let mut lines = vec![
            line(&[("a", 1.0, 1.5), ("b", 1.5, 2.0)]),
            line(&[("c", 3.0, 3.5), ("d", 3.5, 4.0)]),
        ];
        let onsets = [0.6, 1.6, 3.3, 3.6];
        let snapped = refine_word_onsets(&mut lines, &onsets, &RefineConfig::default());
        // a: first word of the song, 0.4 s away is within the wide window
        assert_eq!(lines[0].words[0].start_time, 0.6);
        assert_eq!(lines[0].words[1].start_time, 1.6);
        assert_eq!(lines[0].words[0].end_time, 1.6);
        // c: nearest onset 3.3 is outside ±0.15
        assert_eq!(lines[1].words[0].start_time, 3.0);
        assert_eq!(lines[1].words[1].start_time, 3.6);
        assert_eq!(lines[1].words[0].end_time, 3.6);
        assert_eq!(snapped, 3);
        assert_eq!(lines[0].start_time, 0.6);
        assert_eq!(lines[1].end_time, 4.0);
    }

    #[test]
    fn never_snaps_before_previous_word_end() {
        let mut lines = vec![
            line(&[("x", 0.0, 0.2)]),
            line(&[("a", 1.0, 1.5), ("b", 1.55, 2.0)]),
        ];
        let onsets = [1.45];
        refine_word_onsets(&mut lines, &onsets, &RefineConfig::default());
        assert_eq!(lines[1].words[1].start_time, 1.55);
        for l in &lines {
            for w in &l.words {
                assert!(w.end_time >= w.start_time);
            }
        }
    }

    #[test]
    fn keeps_line_start_when_snap_would_shorten_line() {
        let mut lines = vec![
            line(&[("a", 1.0, 1.5), ("b", 1.5, 2.0)]),
            line(&[("c", 5.0, 5.5), ("d", 5.5, 6.0)]),
        ];
        let config = RefineConfig::default();
        refine_word_onsets(&mut lines, &[5.12], &config);
        assert_eq!(lines[1].start_time, 5.0);
        crate::lyrics::enforce_monotonic_lines(&mut lines);
        for l in &lines {
            assert!(l.duration() >= config.min_line_sec - 1e-9, "{l:?}");
        }
    }

    #[test]
    fn snaps_line_start_later_when_line_stays_long_enough() {
        let mut lines = vec![line(&[("x", 0.0, 0.5)]), line(&[("c", 5.0, 6.0), ("d", 6.0, 7.0)])];
        refine_word_onsets(&mut lines, &[5.12], &RefineConfig::default());
        assert_eq!(lines[1].start_time, 5.12);
        assert_eq!(lines[1].end_time, 7.0);
    }
}
