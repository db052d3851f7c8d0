use unicode_normalization::UnicodeNormalization;

use crate::alignment::global_alignment::RefSymbol;
use crate::alignment::phonemizer::is_hangul_syllable;
use crate::types::AsrSegment;

/// Orthographic units used for matching and for proportional timing: one per
/// Hangul syllable block or other alphanumeric character (lower-cased), after
/// NFKC normalization. Punctuation, symbols and whitespace contribute nothing.
pub fn orthographic_units(text: &str) -> Vec<String> {
    text.nfkc()
        .filter(|&c| is_hangul_syllable(c) || c.is_alphanumeric())
        .map(|c| {
            if is_hangul_syllable(c) {
                c.to_string()
            } else {
                c.to_lowercase().collect()
            }
        })
        .collect()
}

pub fn unit_count(text: &str) -> usize {
    text.nfkc()
        .filter(|&c| is_hangul_syllable(c) || c.is_alphanumeric())
        .count()
}

/// Proportional weight of a word or line; never zero.
pub fn unit_weight(text: &str) -> usize {
    unit_count(text).max(1)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReferenceToken {
    LineBreak,
    Unit { line: usize, word: usize, text: String },
}

impl ReferenceToken {
    pub(crate) fn symbol(&self) -> RefSymbol<'_> {
        match self {
            Self::LineBreak => RefSymbol::LineBreak,
            Self::Unit { text, .. } => RefSymbol::Unit(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TimedSyllable {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

pub(crate) fn reference_tokens(lines: &[String]) -> Vec<ReferenceToken> {
    let mut tokens = Vec::new();
    for (line_idx, line) in lines.iter().enumerate() {
        if line_idx > 0 {
            tokens.push(ReferenceToken::LineBreak);
        }
        for (word_idx, word) in line.split_whitespace().enumerate() {
            tokens.extend(orthographic_units(word).into_iter().map(|text| ReferenceToken::Unit {
                line: line_idx,
                word: word_idx,
                text,
            }));
        }
    }
    tokens
}

/// Splits each transcript word span evenly into one syllable per unit.
/// Segments without word timing fall back to their own text and span.
pub(crate) fn timed_syllables(segments: &[AsrSegment]) -> Vec<TimedSyllable> {
    let mut out = Vec::new();
    for segment in segments {
        if segment.words.is_empty() {
            push_split(&mut out, &segment.text, segment.start, segment.end);
            continue;
        }
        for word in &segment.words {
            push_split(&mut out, &word.word, word.start, word.end);
        }
    }
    out
}

fn push_split(out: &mut Vec<TimedSyllable>, text: &str, start: f64, end: f64) {
    let units = orthographic_units(text);
    if units.is_empty() || !start.is_finite() || !end.is_finite() {
        return;
    }
    let step = (end - start).max(0.0) / units.len() as f64;
    for (i, text) in units.into_iter().enumerate() {
        out.push(TimedSyllable {
            text,
            start: start + i as f64 * step,
            end: start + (i + 1) as f64 * step,
        });
    }
}
