use crate::alignment::grouping::round_ms;
use crate::reconcile::{split_proportional, unit_weight};
use crate::types::{AlignedWord, Line, Word};

/// Spacing given to a word the aligner never placed and that has no later
/// anchor in its line.
pub const PLACEHOLDER_WORD_SEC: f64 = 0.3;
pub const MIN_LINE_SEC: f64 = 0.5;

/// Spreads the words of `text` over `[start, end]` by unit count. The span is
/// at least half a second long.
pub fn distribute_words(text: &str, start: f64, end: f64) -> Vec<Word> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let weights: Vec<usize> = words.iter().map(|w| unit_weight(w)).collect();
    let end = start + (end - start).max(MIN_LINE_SEC);
    words
        .into_iter()
        .zip(split_proportional(start, end, &weights))
        .map(|(w, (s, e))| Word::new(w, round_ms(s), round_ms(e)))
        .collect()
}

/// Pushes each word that starts before its predecessor ends to that end,
/// keeping its duration. Returns how many words moved.
fn order_words(words: &mut [Word]) -> usize {
    let mut prev_end = f64::NEG_INFINITY;
    let mut moved = 0usize;
    for word in words.iter_mut() {
        let duration = (word.end_time - word.start_time).max(0.0);
        if word.start_time < prev_end {
            word.start_time = prev_end;
            word.end_time = round_ms(prev_end + duration);
            moved += 1;
        } else if word.end_time < word.start_time {
            word.end_time = word.start_time;
        }
        prev_end = word.end_time;
    }
    moved
}

/// Rebuilds lyric lines from aligner words keyed by their position in the
/// whitespace-split lyrics. Words the aligner skipped are fitted between their
/// placed neighbours, or chained after the last placed word.
pub fn group_words_into_lines(aligned: &[AlignedWord], lines: &[String]) -> Vec<Line> {
    let total: usize = lines.iter().map(|l| l.split_whitespace().count()).sum();
    let mut timings: Vec<Option<(f64, f64)>> = vec![None; total];
    for aw in aligned {
        if let Some(slot) = timings.get_mut(aw.index) {
            *slot = Some((aw.word.start_time, aw.word.end_time));
        }
    }

    let mut out = Vec::with_capacity(lines.len());
    let mut last_end = 0.0f64;
    let mut base = 0usize;
    for line in lines {
        let texts: Vec<&str> = line.split_whitespace().collect();
        if texts.is_empty() {
            continue;
        }
        let slots = &timings[base..base + texts.len()];
        base += texts.len();

        let mut spans = Vec::with_capacity(texts.len());
        let mut i = 0;
        while i < texts.len() {
            if let Some(span) = slots[i] {
                spans.push(span);
                last_end = span.1;
                i += 1;
                continue;
            }
            let run_end = (i..texts.len()).find(|&j| slots[j].is_some()).unwrap_or(texts.len());
            let weights: Vec<usize> = texts[i..run_end].iter().map(|w| unit_weight(w)).collect();
            match slots.get(run_end).copied().flatten() {
                Some((next_start, _)) if next_start > last_end => {
                    spans.extend(split_proportional(last_end, next_start, &weights));
                }
                _ => {
                    for _ in i..run_end {
                        spans.push((last_end, last_end + PLACEHOLDER_WORD_SEC));
                        last_end += PLACEHOLDER_WORD_SEC;
                    }
                }
            }
            if let Some(&(_, e)) = spans.last() {
                last_end = last_end.max(e);
            }
            i = run_end;
        }

        let mut words: Vec<Word> = texts
            .iter()
            .zip(spans)
            .map(|(text, (s, e))| Word::new(*text, round_ms(s), round_ms(e)))
            .collect();
        order_words(&mut words);
        if let Some(w) = words.last() {
            last_end = last_end.max(w.end_time);
        }
        out.push(Line::from_words(line.as_str(), words));
    }
    out
}

/// Orders words inside each line, re-derives line spans from their words and
/// removes overlaps between consecutive lines. A line pushed forward has its
/// words redistributed by unit count. Returns how many lines were moved.
pub fn enforce_monotonic_lines(lines: &mut [Line]) -> usize {
    let mut prev_end = 0.0f64;
    let mut moved = 0usize;
    let mut reordered = 0usize;
    for line in lines.iter_mut() {
        reordered += order_words(&mut line.words);
        line.sync_span_from_words();
        let mut start = line.start_time;
        let mut end = line.end_time;

        if start < prev_end {
            moved += 1;
            let original_start = start;
            start = prev_end;
            if end <= start {
                end = start + (end - original_start).max(MIN_LINE_SEC);
            }
            if !line.words.is_empty() {
                let weights: Vec<usize> = line.words.iter().map(|w| unit_weight(&w.text)).collect();
                let spans = split_proportional(start, start + (end - start).max(0.1), &weights);
                for (word, (s, e)) in line.words.iter_mut().zip(spans) {
                    word.start_time = round_ms(s);
                    word.end_time = round_ms(e);
                }
            }
        }
        if end <= start {
            end = start + MIN_LINE_SEC;
        }
        line.start_time = round_ms(start);
        line.end_time = round_ms(end);
        if let Some(last) = line.words.last_mut() {
            last.end_time = line.end_time;
        }
        prev_end = end;
    }
    if moved > 0 || reordered > 0 {
        tracing::info!(moved, reordered, "fixed overlapping line and word boundaries");
    }
    moved
}
