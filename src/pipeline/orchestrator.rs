use crate::alignment::audio_boundaries::detect_intro_trim;
use crate::alignment::chunking::{
    merge_chunk_words, place_chunk_words, restore_offset, split_lines_for_chunks, AudioChunk,
    ChunkPlan,
};
use crate::alignment::grouping::{aggregate_word_spans, spans_to_words};
use crate::config::{ChunkConfig, TrimConfig};
use crate::error::SyncError;
use crate::pipeline::model_handle::CancellationFlag;
use crate::pipeline::traits::{PhonemeAligner, Phonemizer};
use crate::pipeline::vocabulary::PhonemeVocabulary;
use crate::types::{AlignedWord, AudioInput};

/// Drives the external phoneme aligner over a whole song: intro trim,
/// chunking, per-chunk inference, word aggregation and merge.
pub struct AcousticOrchestrator<'a> {
    pub phonemizer: &'a dyn Phonemizer,
    pub aligner: &'a dyn PhonemeAligner,
    pub vocabulary: &'a PhonemeVocabulary,
    pub trim: &'a TrimConfig,
    pub chunk: &'a ChunkConfig,
    pub cancel: Option<&'a CancellationFlag>,
}

impl AcousticOrchestrator<'_> {
    /// Word timings on the original (untrimmed) timeline, tagged with their
    /// index in the whitespace-split lyrics. Inference failures are logged
    /// and produce an empty list; only cancellation is returned as an error.
    pub fn align(
        &self,
        audio: &AudioInput,
        lines: &[String],
    ) -> Result<Vec<AlignedWord>, SyncError> {
        match self.try_align(audio, lines) {
            Ok(words) => Ok(words),
            Err(SyncError::Cancelled) => Err(SyncError::Cancelled),
            Err(err) => {
                tracing::warn!(error = %err, "acoustic alignment failed; no words produced");
                Ok(Vec::new())
            }
        }
    }

    fn try_align(
        &self,
        audio: &AudioInput,
        lines: &[String],
    ) -> Result<Vec<AlignedWord>, SyncError> {
        if audio.samples.is_empty() || audio.sample_rate_hz == 0 || lines.is_empty() {
            return Ok(Vec::new());
        }
        let rate = audio.sample_rate_hz;
        let trim = detect_intro_trim(&audio.samples, rate, self.trim);
        let (offset_sec, samples) = match trim {
            Some(trim) => {
                tracing::info!(
                    onset_sec = format!("{:.2}", trim.onset_sec),
                    offset_sec = format!("{:.2}", trim.offset_sec),
                    "trimmed instrumental intro"
                );
                (trim.offset_sec, &audio.samples[trim.offset_samples..])
            }
            None => (0.0, audio.samples.as_slice()),
        };

        let plan = ChunkPlan::new(samples.len(), rate, self.chunk);
        let line_groups = split_lines_for_chunks(lines, plan.len());
        tracing::info!(
            chunks = plan.len(),
            lines = lines.len(),
            duration_sec = format!("{:.1}", samples.len() as f64 / rate as f64),
            "acoustic alignment plan"
        );

        let mut per_chunk = Vec::with_capacity(plan.len());
        let mut word_offset = 0usize;
        for (chunk, chunk_lines) in plan.chunks(samples).zip(line_groups) {
            if let Some(cancel) = self.cancel {
                cancel.check()?;
            }
            let words = self.align_chunk(&chunk, rate, chunk_lines, word_offset)?;
            word_offset += chunk_lines
                .iter()
                .map(|l| l.split_whitespace().count())
                .sum::<usize>();
            per_chunk.push(place_chunk_words(&chunk, words));
        }

        let mut merged = merge_chunk_words(per_chunk);
        restore_offset(&mut merged, offset_sec);
        tracing::info!(words = merged.len(), "acoustic alignment complete");
        Ok(merged)
    }

    fn align_chunk(
        &self,
        chunk: &AudioChunk<'_>,
        rate: u32,
        lines: &[String],
        word_offset: usize,
    ) -> Result<Vec<AlignedWord>, SyncError> {
        if lines.is_empty() || chunk.samples.is_empty() {
            return Ok(Vec::new());
        }
        let sequence = self.phonemizer.tokenize(&lines.join("\n"));

        let mut phonemes = Vec::with_capacity(sequence.len());
        let mut word_index = Vec::with_capacity(sequence.len());
        for (phoneme, word) in sequence.phonemes.iter().zip(&sequence.word_index) {
            if self.vocabulary.contains(phoneme) {
                phonemes.push(phoneme.clone());
                word_index.push(*word);
            } else {
                tracing::warn!(phoneme = phoneme.as_str(), "phoneme not in vocabulary; skipped");
            }
        }
        if phonemes.len() < 2 {
            tracing::warn!(
                chunk = chunk.index,
                phonemes = phonemes.len(),
                "too few phonemes for alignment"
            );
            return Ok(Vec::new());
        }

        tracing::debug!(
            chunk = chunk.index,
            offset_sec = format!("{:.1}", chunk.time_offset_sec),
            phonemes = phonemes.len(),
            words = sequence.words.len(),
            "aligning chunk"
        );
        let spans = self
            .aligner
            .infer(chunk.samples, rate, &phonemes, self.vocabulary)?;
        if spans.is_empty() {
            tracing::warn!(chunk = chunk.index, "aligner returned no timestamps");
            return Ok(Vec::new());
        }
        let word_spans = aggregate_word_spans(&phonemes, &word_index, &spans, sequence.words.len());
        Ok(spans_to_words(&sequence.words, &word_spans, word_offset))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::pipeline::defaults::HangulPhonemizer;
    use crate::types::PhonemeSpan;

    /// Lays phonemes back to back, 0.1 s each, from the chunk start.
    struct EvenAligner {
        calls: AtomicUsize,
    }

    impl PhonemeAligner for EvenAligner {
        fn infer(
            &self,
            _samples: &[f32],
            _sample_rate_hz: u32,
            phonemes: &[String],
            _vocabulary: &PhonemeVocabulary,
        ) -> Result<Vec<PhonemeSpan>, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(phonemes
                .iter()
                .enumerate()
                .map(|(i, p)| PhonemeSpan::new(p.as_str(), i as f64 * 0.1, (i + 1) as f64 * 0.1))
                .collect())
        }
    }

    struct FailingAligner;

    impl PhonemeAligner for FailingAligner {
        fn infer(
            &self,
            _samples: &[f32],
            _sample_rate_hz: u32,
            _phonemes: &[String],
            _vocabulary: &PhonemeVocabulary,
        ) -> Result<Vec<PhonemeSpan>, SyncError> {
            Err(SyncError::runtime("aligner inference", "device lost"))
        }
    }

    fn no_trim() -> TrimConfig {
        TrimConfig {
            enabled: false,
            ..TrimConfig::default()
        }
    }

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_pass_aggregates_words() {
        let aligner = EvenAligner {
            calls: AtomicUsize::new(0),
        };
        let vocabulary = PhonemeVocabulary::default();
        let trim = no_trim();
        let chunk = ChunkConfig::default();
        let orchestrator = AcousticOrchestrator {
            phonemizer: &HangulPhonemizer,
            aligner: &aligner,
            vocabulary: &vocabulary,
            trim: &trim,
            chunk: &chunk,
            cancel: None,
        };
        let audio = AudioInput::new(100, vec![0.1; 1000]);
        let words = orchestrator.align(&audio, &lines(&["한 양"])).unwrap();
        // SP h a N SP ya NG SP
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].index, 0);
        assert_eq!((words[0].word.start_time, words[0].word.end_time), (0.1, 0.4));
        assert_eq!((words[1].word.start_time, words[1].word.end_time), (0.5, 0.7));
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn out_of_vocabulary_phonemes_are_dropped() {
        let aligner = EvenAligner {
            calls: AtomicUsize::new(0),
        };
        let vocabulary = PhonemeVocabulary::from_phonemes(["a", "ya", "NG"]);
        let trim = no_trim();
        let chunk = ChunkConfig::default();
        let orchestrator = AcousticOrchestrator {
            phonemizer: &HangulPhonemizer,
            aligner: &aligner,
            vocabulary: &vocabulary,
            trim: &trim,
            chunk: &chunk,
            cancel: None,
        };
        let audio = AudioInput::new(100, vec![0.1; 1000]);
        let words = orchestrator.align(&audio, &lines(&["한 양"])).unwrap();
        // SP a SP ya NG SP
        assert_eq!(words.len(), 2);
        assert_eq!((words[0].word.start_time, words[0].word.end_time), (0.1, 0.2));
        assert_eq!((words[1].word.start_time, words[1].word.end_time), (0.3, 0.5));
    }

    #[test]
    fn too_few_phonemes_skip_inference() {
        let aligner = EvenAligner {
            calls: AtomicUsize::new(0),
        };
        let vocabulary = PhonemeVocabulary::default();
        let trim = no_trim();
        let chunk = ChunkConfig::default();
        let orchestrator = AcousticOrchestrator {
            phonemizer: &HangulPhonemizer,
            aligner: &aligner,
            vocabulary: &vocabulary,
            trim: &trim,
            chunk: &chunk,
            cancel: None,
        };
        let audio = AudioInput::new(100, vec![0.1; 1000]);
        let words = orchestrator.align(&audio, &lines(&["   "])).unwrap();
        assert!(words.is_empty());
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn chunked_pass_keeps_global_word_indices() {
        let aligner = EvenAligner {
            calls: AtomicUsize::new(0),
        };
        let vocabulary = PhonemeVocabulary::default();
        let trim = no_trim();
        let chunk = ChunkConfig {
            chunk_duration_sec: 30.0,
            overlap_sec: 10.0,
        };
        let orchestrator = AcousticOrchestrator {
            phonemizer: &HangulPhonemizer,
            aligner: &aligner,
            vocabulary: &vocabulary,
            trim: &trim,
            chunk: &chunk,
            cancel: None,
        };
        let audio = AudioInput::new(100, vec![0.1; 100 * 60]);
        let lyrics = lines(&["가", "나", "다"]);
        let words = orchestrator.align(&audio, &lyrics).unwrap();
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 3);
        let indices: Vec<usize> = words.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(words[1].word.start_time, 20.1);
        assert_eq!(words[2].word.start_time, 40.1);
    }

    #[test]
    fn aligner_failure_yields_empty_result() {
        let vocabulary = PhonemeVocabulary::default();
        let trim = no_trim();
        let chunk = ChunkConfig::default();
        let orchestrator = AcousticOrchestrator {
            phonemizer: &HangulPhonemizer,
            aligner: &FailingAligner,
            vocabulary: &vocabulary,
            trim: &trim,
            chunk: &chunk,
            cancel: None,
        };
        let audio = AudioInput::new(100, vec![0.1; 1000]);
        let words = orchestrator.align(&audio, &lines(&["한"])).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn cancellation_is_checked_between_chunks() {
        let aligner = EvenAligner {
            calls: AtomicUsize::new(0),
        };
        let vocabulary = PhonemeVocabulary::default();
        let trim = no_trim();
        let chunk = ChunkConfig::default();
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let orchestrator = AcousticOrchestrator {
            phonemizer: &HangulPhonemizer,
            aligner: &aligner,
            vocabulary: &vocabulary,
            trim: &trim,
            chunk: &chunk,
            cancel: Some(&cancel),
        };
        let audio = AudioInput::new(100, vec![0.1; 1000]);
        let result = orchestrator.align(&audio, &lines(&["한"]));
        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 0);
    }
}
