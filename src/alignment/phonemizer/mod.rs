use std::collections::BTreeSet;

use crate::types::{PhonemeSequence, SILENCE_PHONEME};

mod tables;
#[cfg(test)]
mod tests;

use tables::{
    letter_phonemes, word_phonemes, CODAS, CODA_COUNT, FILLER_PHONEME, HANGUL_BASE, HANGUL_LAST,
    NUCLEI, NUCLEUS_COUNT, ONSETS,
};

const MAX_SILENCE_RUN: usize = 2;

pub fn is_hangul_syllable(c: char) -> bool {
    (HANGUL_BASE..=HANGUL_LAST).contains(&(c as u32))
}

/// Onset/nucleus/coda indices of a precomposed Hangul syllable.
pub fn decompose_syllable(c: char) -> Option<(usize, usize, usize)> {
    if !is_hangul_syllable(c) {
        return None;
    }
    let code = c as u32 - HANGUL_BASE;
    let onset = code / (NUCLEUS_COUNT * CODA_COUNT);
    let nucleus = (code % (NUCLEUS_COUNT * CODA_COUNT)) / CODA_COUNT;
    let coda = code % CODA_COUNT;
    Some((onset as usize, nucleus as usize, coda as usize))
}

pub fn syllable_phonemes(c: char) -> Vec<&'static str> {
    let Some((onset, nucleus, coda)) = decompose_syllable(c) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(3);
    if !ONSETS[onset].is_empty() {
        out.push(ONSETS[onset]);
    }
    out.push(NUCLEI[nucleus]);
    if coda > 0 {
        out.push(CODAS[coda]);
    }
    out
}

/// Approximate phonemes for a run of non-Hangul alphanumerics. The whole-word
/// table wins over letter-by-letter mapping; unmapped characters vanish.
pub fn latin_run_phonemes(run: &str) -> Vec<&'static str> {
    let lower = run.to_lowercase();
    if let Some(phonemes) = word_phonemes(&lower) {
        return phonemes.to_vec();
    }
    lower
        .chars()
        .flat_map(|c| letter_phonemes(c).iter().copied())
        .collect()
}

/// Every symbol `tokenize` can emit, excluding `SP`, in sorted order.
pub fn phoneme_inventory() -> Vec<&'static str> {
    let mut set: BTreeSet<&'static str> = BTreeSet::new();
    set.extend(ONSETS.iter().copied().filter(|p| !p.is_empty()));
    set.extend(NUCLEI.iter().copied());
    set.extend(CODAS.iter().copied().filter(|p| !p.is_empty()));
    for c in 'a'..='z' {
        set.extend(letter_phonemes(c).iter().copied());
    }
    set.insert(FILLER_PHONEME);
    set.into_iter().collect()
}

#[derive(Default)]
struct SequenceBuilder {
    phonemes: Vec<String>,
    word_index: Vec<Option<usize>>,
}

impl SequenceBuilder {
    fn push(&mut self, phoneme: &str, word: Option<usize>) {
        self.phonemes.push(phoneme.to_string());
        self.word_index.push(word);
    }

    fn push_word(&mut self, phonemes: &[&str], word: usize) -> usize {
        for ph in phonemes {
            self.push(ph, Some(word));
        }
        phonemes.len()
    }

    fn silence(&mut self) {
        self.push(SILENCE_PHONEME, None);
    }

    fn finish(mut self, words: Vec<String>) -> PhonemeSequence {
        while self.phonemes.len() >= 2
            && self.phonemes[self.phonemes.len() - 1] == SILENCE_PHONEME
            && self.phonemes[self.phonemes.len() - 2] == SILENCE_PHONEME
        {
            self.phonemes.pop();
            self.word_index.pop();
        }
        if self.phonemes.last().map(String::as_str) != Some(SILENCE_PHONEME) {
            self.silence();
        }

        let mut phonemes = Vec::with_capacity(self.phonemes.len());
        let mut word_index = Vec::with_capacity(self.word_index.len());
        let mut silence_run = 0usize;
        for (ph, idx) in self.phonemes.into_iter().zip(self.word_index) {
            if ph == SILENCE_PHONEME {
                silence_run += 1;
                if silence_run > MAX_SILENCE_RUN {
                    continue;
                }
            } else {
                silence_run = 0;
            }
            phonemes.push(ph);
            word_index.push(idx);
        }

        PhonemeSequence {
            phonemes,
            word_index,
            words,
        }
    }
}

/// Converts lyric text into an `SP`-framed phoneme sequence with a parallel
/// phoneme-to-word map. Grapheme level only: no liaison or assimilation.
pub fn tokenize(text: &str) -> PhonemeSequence {
    let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    let mut builder = SequenceBuilder::default();
    builder.silence();
    if words.is_empty() {
        return builder.finish(words);
    }

    for (word_idx, word) in words.iter().enumerate() {
        let mut emitted = 0usize;
        let mut latin_run = String::new();
        for c in word.chars() {
            if is_hangul_syllable(c) {
                if !latin_run.is_empty() {
                    emitted += builder.push_word(&latin_run_phonemes(&latin_run), word_idx);
                    latin_run.clear();
                }
                emitted += builder.push_word(&syllable_phonemes(c), word_idx);
            } else if c.is_alphanumeric() {
                latin_run.push(c);
            }
        }
        if !latin_run.is_empty() {
            emitted += builder.push_word(&latin_run_phonemes(&latin_run), word_idx);
        }
        if emitted == 0 {
            builder.push(FILLER_PHONEME, Some(word_idx));
        }
        builder.silence();
    }

    builder.finish(words)
}
