use crate::alignment::global_alignment::{needleman_wunsch, AlignmentScores, RefSymbol};
use crate::alignment::phonemizer::tokenize;
use crate::pipeline::traits::{Phonemizer, SyllableAligner};
use crate::types::PhonemeSequence;

pub struct HangulPhonemizer;

impl Phonemizer for HangulPhonemizer {
    fn tokenize(&self, text: &str) -> PhonemeSequence {
        tokenize(text)
    }
}

pub struct NeedlemanWunschAligner;

impl SyllableAligner for NeedlemanWunschAligner {
    fn align(
        &self,
        reference: &[RefSymbol<'_>],
        timed: &[&str],
        scores: &AlignmentScores,
    ) -> Vec<Option<usize>> {
        needleman_wunsch(reference, timed, scores)
    }
}
