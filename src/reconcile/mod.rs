//! Maps authoritative lyric lines onto the timing of an independent,
//! differently worded transcript.

use crate::alignment::global_alignment::{AlignmentScores, RefSymbol};
use crate::config::ReconcileConfig;
use crate::pipeline::defaults::NeedlemanWunschAligner;
use crate::pipeline::traits::SyllableAligner;
use crate::types::{AsrSegment, Line, Word};

mod boundaries;
mod interpolation;
mod syllables;

pub use interpolation::split_proportional;
pub use syllables::{orthographic_units, unit_count, unit_weight};

use boundaries::{clamp_and_order, fit_words_to_line, rebalance_pairs};
use interpolation::{fill_unmatched, matched_pace, Extent};
use syllables::{reference_tokens, timed_syllables, ReferenceToken};

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub lines: Vec<Line>,
    /// Lines that received at least one paired syllable.
    pub matched_lines: usize,
}

impl ReconcileOutcome {
    pub fn is_unmatched(&self) -> bool {
        self.matched_lines == 0
    }
}

fn widen(slot: &mut Option<(f64, f64)>, start: f64, end: f64) {
    *slot = Some(match *slot {
        Some((s, e)) => (s.min(start), e.max(end)),
        None => (start, end),
    });
}

pub fn reconcile(
    reference_lines: &[String],
    transcript: &[AsrSegment],
    config: &ReconcileConfig,
) -> ReconcileOutcome {
    reconcile_with(&NeedlemanWunschAligner, reference_lines, transcript, config)
}

/// Gives every reference line and word a timestamp using the transcript as a
/// noisy timing prior.
pub fn reconcile_with(
    aligner: &dyn SyllableAligner,
    reference_lines: &[String],
    transcript: &[AsrSegment],
    config: &ReconcileConfig,
) -> ReconcileOutcome {
    if reference_lines.is_empty() {
        return ReconcileOutcome {
            lines: Vec::new(),
            matched_lines: 0,
        };
    }

    let line_words: Vec<Vec<&str>> = reference_lines
        .iter()
        .map(|l| l.split_whitespace().collect())
        .collect();
    let tokens = reference_tokens(reference_lines);
    let timed = timed_syllables(transcript);
    let symbols: Vec<RefSymbol<'_>> = tokens.iter().map(ReferenceToken::symbol).collect();
    let timed_text: Vec<&str> = timed.iter().map(|t| t.text.as_str()).collect();
    let paired = aligner.align(&symbols, &timed_text, &AlignmentScores::from(config));

    let mut line_raw: Vec<Option<(f64, f64)>> = vec![None; reference_lines.len()];
    let mut word_raw: Vec<Vec<Option<(f64, f64)>>> =
        line_words.iter().map(|w| vec![None; w.len()]).collect();
    for (token, pair) in tokens.iter().zip(&paired) {
        let (ReferenceToken::Unit { line, word, .. }, Some(j)) = (token, pair) else {
            continue;
        };
        let Some(syllable) = timed.get(*j) else {
            continue;
        };
        widen(&mut line_raw[*line], syllable.start, syllable.end);
        widen(&mut word_raw[*line][*word], syllable.start, syllable.end);
    }

    let line_weights: Vec<usize> = reference_lines.iter().map(|l| unit_weight(l)).collect();
    let matched_lines = line_raw.iter().filter(|s| s.is_some()).count();
    let pace = matched_pace(
        &line_raw,
        &line_weights,
        config.min_sec_per_unit,
        config.max_sec_per_unit,
    );
    let mut spans = fill_unmatched(&line_raw, &line_weights, Extent::Open { sec_per_unit: pace })
        .unwrap_or_else(|| vec![(0.0, config.unmatched_default_sec); reference_lines.len()]);

    let rebalanced = rebalance_pairs(&mut spans, &line_weights, config);
    let shifts = clamp_and_order(&mut spans, config);

    let lines: Vec<Line> = reference_lines
        .iter()
        .zip(&line_words)
        .zip(word_raw)
        .zip(spans.iter().zip(shifts))
        .map(|(((text, words), raw), (&(start, end), shift))| {
            let raw: Vec<Option<(f64, f64)>> =
                raw.into_iter().map(|w| w.map(|(s, e)| (s + shift, e + shift))).collect();
            build_line(text, words, &raw, start, end, config.min_word_sec)
        })
        .collect();

    tracing::info!(
        lines = lines.len(),
        matched_lines,
        timed_syllables = timed.len(),
        rebalanced,
        "reconcile: lines timed from transcript"
    );
    ReconcileOutcome {
        lines,
        matched_lines,
    }
}

fn build_line(
    text: &str,
    words: &[&str],
    raw: &[Option<(f64, f64)>],
    start: f64,
    end: f64,
    min_word_sec: f64,
) -> Line {
    let weights: Vec<usize> = words.iter().map(|w| unit_weight(w)).collect();
    let spans = fill_unmatched(raw, &weights, Extent::Bounded { start, end }).unwrap_or_default();
    let mut timed_words: Vec<Word> = words
        .iter()
        .zip(spans)
        .map(|(w, (s, e))| Word::new(*w, s, e))
        .collect();
    fit_words_to_line(&mut timed_words, start, end, min_word_sec);
    Line {
        text: text.to_string(),
        start_time: start,
        end_time: end,
        words: timed_words,
    }
}
