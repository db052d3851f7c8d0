use crate::alignment::global_alignment::{AlignmentScores, RefSymbol};
use crate::error::SyncError;
use crate::pipeline::vocabulary::PhonemeVocabulary;
use crate::types::{AsrSegment, F0Frame, PhonemeSequence, PhonemeSpan, SpeechInterval};

/// Frame-level phoneme aligner. Receives the phonemes of one chunk (already
/// filtered to the vocabulary) and returns one span per aligned phoneme, with
/// times relative to the start of `samples`.
pub trait PhonemeAligner: Send + Sync {
    fn infer(
        &self,
        samples: &[f32],
        sample_rate_hz: u32,
        phonemes: &[String],
        vocabulary: &PhonemeVocabulary,
    ) -> Result<Vec<PhonemeSpan>, SyncError>;
}

pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(
        &self,
        samples: &[f32],
        sample_rate_hz: u32,
        language: &str,
    ) -> Result<Vec<AsrSegment>, SyncError>;
}

pub trait F0Estimator: Send + Sync {
    /// Frame hop of the returned track, in seconds.
    fn hop_sec(&self) -> f64;

    fn infer(&self, samples: &[f32], sample_rate_hz: u32) -> Result<Vec<F0Frame>, SyncError>;
}

pub trait SpeechActivityDetector: Send + Sync {
    fn detect(
        &self,
        samples: &[f32],
        sample_rate_hz: u32,
    ) -> Result<Vec<SpeechInterval>, SyncError>;
}

pub trait Phonemizer: Send + Sync {
    fn tokenize(&self, text: &str) -> PhonemeSequence;
}

/// Global alignment of reference symbols against timed transcript symbols.
/// Returns, for each reference symbol, the index of the paired timed symbol.
pub trait SyllableAligner: Send + Sync {
    fn align(
        &self,
        reference: &[RefSymbol<'_>],
        timed: &[&str],
        scores: &AlignmentScores,
    ) -> Vec<Option<usize>>;
}
