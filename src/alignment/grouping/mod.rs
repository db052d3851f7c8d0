use crate::types::{AlignedWord, PhonemeSpan, Word};

#[cfg(test)]
mod tests;

/// Running min(start)/max(end) per source word.
#[derive(Debug, Clone)]
pub(crate) struct WordSpans {
    spans: Vec<Option<(f64, f64)>>,
}

impl WordSpans {
    fn new(word_count: usize) -> Self {
        Self {
            spans: vec![None; word_count],
        }
    }

    fn extend(&mut self, word: usize, start: f64, end: f64) {
        let Some(slot) = self.spans.get_mut(word) else {
            return;
        };
        *slot = Some(match *slot {
            Some((s, e)) => (s.min(start), e.max(end)),
            None => (start, end),
        });
    }
}

enum CursorStep {
    Word(usize),
    Silence,
    Exhausted,
}

/// Walks the filtered input phonemes while matching aligner output by
/// identity. Anything the cursor cannot resolve is discarded.
struct PhonemeCursor<'a> {
    phonemes: &'a [String],
    word_index: &'a [Option<usize>],
    pos: usize,
}

impl<'a> PhonemeCursor<'a> {
    fn new(phonemes: &'a [String], word_index: &'a [Option<usize>]) -> Self {
        Self {
            phonemes,
            word_index,
            pos: 0,
        }
    }

    /// Advances past the next phoneme equal to `phoneme`.
    fn advance_to(&mut self, phoneme: &str) -> CursorStep {
        while self.pos < self.phonemes.len() && self.phonemes[self.pos] != phoneme {
            self.pos += 1;
        }
        if self.pos >= self.phonemes.len() {
            return CursorStep::Exhausted;
        }
        let word = self.word_index[self.pos];
        self.pos += 1;
        match word {
            Some(word) => CursorStep::Word(word),
            None => CursorStep::Silence,
        }
    }
}

/// Aggregates phoneme spans into per-word spans.
///
/// When the aligner returned exactly one span per input phoneme the mapping is
/// positional; otherwise spans are matched to input phonemes by identity, in
/// order.
pub(crate) fn aggregate_word_spans(
    phonemes: &[String],
    word_index: &[Option<usize>],
    spans: &[PhonemeSpan],
    word_count: usize,
) -> WordSpans {
    let mut out = WordSpans::new(word_count);

    if spans.len() == phonemes.len() {
        for (span, word) in spans.iter().zip(word_index) {
            if let Some(word) = *word {
                out.extend(word, span.start, span.end);
            }
        }
        return out;
    }

    tracing::debug!(
        phonemes = phonemes.len(),
        spans = spans.len(),
        "grouping: ragged aligner output, matching phonemes by identity"
    );
    let mut cursor = PhonemeCursor::new(phonemes, word_index);
    for span in spans {
        match cursor.advance_to(&span.phoneme) {
            CursorStep::Word(word) => out.extend(word, span.start, span.end),
            CursorStep::Silence => {}
            CursorStep::Exhausted => break,
        }
    }
    out
}

pub(crate) fn round_ms(t: f64) -> f64 {
    (t * 1000.0).round() / 1000.0
}

/// Emits one `AlignedWord` per word that received at least one phoneme span.
/// Word indices are shifted by `index_offset` so chunk-local words keep
/// their position in the full lyric.
pub(crate) fn spans_to_words(
    words: &[String],
    spans: &WordSpans,
    index_offset: usize,
) -> Vec<AlignedWord> {
    let mut out = Vec::with_capacity(words.len());
    for (idx, text) in words.iter().enumerate() {
        match spans.spans.get(idx).copied().flatten() {
            Some((start, end)) => out.push(AlignedWord {
                index: index_offset + idx,
                word: Word::new(text.as_str(), round_ms(start), round_ms(end.max(start))),
            }),
            None => tracing::debug!(
                word = text.as_str(),
                index = index_offset + idx,
                "grouping: word has no phoneme timestamps, omitted"
            ),
        }
    }
    out
}
