use crate::config::ReconcileConfig;
use crate::types::Word;

/// Moves the shared boundary of adjacent lines where one is shorter than
/// `short_line_sec` and the other longer than `long_line_sec`. The new
/// boundary splits the pair's total span by unit count and, when the pair
/// spans at least two minimum line lengths, keeps `min_line_sec` from both
/// outer edges. Returns the number of pairs moved.
pub(crate) fn rebalance_pairs(
    spans: &mut [(f64, f64)],
    weights: &[usize],
    config: &ReconcileConfig,
) -> usize {
    let mut moved = 0usize;
    for i in 1..spans.len() {
        let (a_start, a_end) = spans[i - 1];
        let (b_start, b_end) = spans[i];
        let da = a_end - a_start;
        let db = b_end - b_start;
        let skewed = (da < config.short_line_sec && db > config.long_line_sec)
            || (db < config.short_line_sec && da > config.long_line_sec);
        if !skewed {
            continue;
        }

        let lo = a_start;
        let hi = b_end.max(lo);
        let wa = weights[i - 1].max(1) as f64;
        let wb = weights[i].max(1) as f64;
        let mut boundary = lo + (hi - lo) * wa / (wa + wb);
        if hi - lo >= 2.0 * config.min_line_sec {
            boundary = boundary.clamp(lo + config.min_line_sec, hi - config.min_line_sec);
        }
        tracing::debug!(
            line = i - 1,
            before_sec = format!("{da:.2}"),
            neighbour_sec = format!("{db:.2}"),
            boundary = format!("{boundary:.3}"),
            "reconcile: rebalanced line boundary"
        );
        spans[i - 1].1 = boundary;
        spans[i].0 = boundary;
        moved += 1;
    }
    moved
}

/// Clamps each duration into `[min_line_sec, max_line_sec]` and shifts lines
/// forward so that no line starts before the previous one ends. Returns how
/// far each line start moved.
pub(crate) fn clamp_and_order(
    spans: &mut [(f64, f64)],
    config: &ReconcileConfig,
) -> Vec<f64> {
    let mut prev_end = f64::NEG_INFINITY;
    spans
        .iter_mut()
        .map(|span| {
            let duration = (span.1 - span.0).clamp(config.min_line_sec, config.max_line_sec);
            let start = span.0.max(prev_end).max(0.0);
            let shift = start - span.0;
            *span = (start, start + duration);
            prev_end = span.1;
            shift
        })
        .collect()
}

/// Final word pass inside a line: words are clamped into the line span,
/// made monotonic with a minimum duration (reduced when the line is too
/// crowded for it), rescaled if they overflow the line end, and the first
/// start and last end are pinned to the line.
pub(crate) fn fit_words_to_line(
    words: &mut [Word],
    line_start: f64,
    line_end: f64,
    min_word_sec: f64,
) {
    if words.is_empty() {
        return;
    }
    let line_end = line_end.max(line_start);
    let span = line_end - line_start;
    let min_dur = min_word_sec.min(span / words.len() as f64);

    let mut prev_end = line_start;
    for w in words.iter_mut() {
        let start = w.start_time.clamp(line_start, line_end).max(prev_end);
        let end = w.end_time.clamp(line_start, line_end).max(start + min_dur);
        w.start_time = start;
        w.end_time = end;
        prev_end = end;
    }

    if prev_end > line_end && prev_end > line_start {
        let scale = span / (prev_end - line_start);
        for w in words.iter_mut() {
            w.start_time = line_start + (w.start_time - line_start) * scale;
            w.end_time = line_start + (w.end_time - line_start) * scale;
        }
    }

    if let Some(first) = words.first_mut() {
        first.start_time = line_start;
    }
    if let Some(last) = words.last_mut() {
        last.end_time = line_end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_next_to_long_line_is_rebalanced() {
        let config = ReconcileConfig::default();
        let mut spans = vec![(10.0, 10.2), (10.2, 19.2)];
        let moved = rebalance_pairs(&mut spans, &[4, 4], &config);
        assert_eq!(moved, 1);
        assert!((spans[0].1 - 14.6).abs() < 1e-9);
        assert_eq!(spans[0].1, spans[1].0);
        assert!(spans[0].1 - spans[0].0 >= config.min_line_sec);
        assert!(spans[1].1 - spans[1].0 >= config.min_line_sec);
    }

    #[test]
    fn rebalanced_boundary_keeps_minimum_from_edges() {
        let config = ReconcileConfig::default();
        let mut spans = vec![(0.0, 9.0), (9.0, 9.2)];
        rebalance_pairs(&mut spans, &[40, 1], &config);
        assert!((spans[1].0 - 8.2).abs() < 1e-9);
    }

    #[test]
    fn balanced_pairs_are_untouched() {
        let config = ReconcileConfig::default();
        let mut spans = vec![(0.0, 3.0), (3.0, 6.0)];
        assert_eq!(rebalance_pairs(&mut spans, &[1, 1], &config), 0);
        assert_eq!(spans, vec![(0.0, 3.0), (3.0, 6.0)]);
    }

    #[test]
    fn clamp_enforces_bounds_and_order() {
        let config = ReconcileConfig::default();
        let mut spans = vec![(0.0, 0.2), (0.5, 30.5), (20.0, 21.0)];
        let shifts = clamp_and_order(&mut spans, &config);
        assert_eq!(spans[0], (0.0, 1.0));
        assert_eq!(spans[1], (1.0, 16.0));
        assert_eq!(spans[2], (20.0, 21.0));
        assert_eq!(shifts, vec![0.0, 0.5, 0.0]);
    }

    #[test]
    fn words_fit_inside_line() {
        let mut words = vec![
            Word::new("a", 0.5, 0.5),
            Word::new("b", 0.4, 0.45),
            Word::new("c", 2.0, 9.0),
        ];
        fit_words_to_line(&mut words, 1.0, 3.0, 0.05);
        assert_eq!(words[0].start_time, 1.0);
        assert_eq!(words[2].end_time, 3.0);
        for pair in words.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time + 1e-9);
        }
        for w in &words {
            assert!(w.end_time > w.start_time);
        }
    }

    #[test]
    fn crowded_line_reduces_minimum_duration() {
        let mut words: Vec<Word> = (0..10).map(|i| Word::new(format!("w{i}"), 0.0, 0.0)).collect();
        fit_words_to_line(&mut words, 0.0, 0.2, 0.05);
        assert_eq!(words[9].end_time, 0.2);
        for pair in words.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time + 1e-9);
        }
    }
}
