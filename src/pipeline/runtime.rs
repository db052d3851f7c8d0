use std::path::PathBuf;
use std::sync::Arc;

use crate::alignment::grouping::round_ms;
use crate::alignment::onsets::{detect_onsets, refine_word_onsets};
use crate::audio::load_audio;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::lyrics::{
    clean_lines, clean_segments, detect_language, enforce_monotonic_lines,
    group_words_into_lines, split_lyric_lines,
};
use crate::pipeline::cascade::run_cascade;
use crate::pipeline::model_handle::{CancellationFlag, ModelHandle};
use crate::pipeline::orchestrator::AcousticOrchestrator;
use crate::pipeline::traits::{
    F0Estimator, PhonemeAligner, Phonemizer, SpeechActivityDetector, SpeechRecognizer,
    SyllableAligner,
};
use crate::pipeline::vocabulary::PhonemeVocabulary;
use crate::prosody::annotate;
use crate::reconcile::reconcile_with;
use crate::types::{AudioInput, CascadeStage, Line, SpeechInterval, SyncOutput};

/// One song to synchronize.
#[derive(Debug, Clone, Default)]
pub struct SyncJob {
    pub audio_path: PathBuf,
    pub lyrics: String,
    pub language: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

pub struct LyricSynchronizer {
    config: SyncConfig,
    phonemizer: Box<dyn Phonemizer>,
    syllable_aligner: Box<dyn SyllableAligner>,
    vocabulary: PhonemeVocabulary,
    phoneme_aligner: Option<ModelHandle<dyn PhonemeAligner>>,
    recognizer: Option<ModelHandle<dyn SpeechRecognizer>>,
    f0_estimator: Option<ModelHandle<dyn F0Estimator>>,
    speech_detector: Option<ModelHandle<dyn SpeechActivityDetector>>,
    cancel: Option<CancellationFlag>,
}

pub(crate) struct LyricSynchronizerParts {
    pub config: SyncConfig,
    pub phonemizer: Box<dyn Phonemizer>,
    pub syllable_aligner: Box<dyn SyllableAligner>,
    pub vocabulary: PhonemeVocabulary,
    pub phoneme_aligner: Option<ModelHandle<dyn PhonemeAligner>>,
    pub recognizer: Option<ModelHandle<dyn SpeechRecognizer>>,
    pub f0_estimator: Option<ModelHandle<dyn F0Estimator>>,
    pub speech_detector: Option<ModelHandle<dyn SpeechActivityDetector>>,
    pub cancel: Option<CancellationFlag>,
}

impl LyricSynchronizer {
    pub(crate) fn from_parts(parts: LyricSynchronizerParts) -> Self {
        Self {
            config: parts.config,
            phonemizer: parts.phonemizer,
            syllable_aligner: parts.syllable_aligner,
            vocabulary: parts.vocabulary,
            phoneme_aligner: parts.phoneme_aligner,
            recognizer: parts.recognizer,
            f0_estimator: parts.f0_estimator,
            speech_detector: parts.speech_detector,
            cancel: parts.cancel,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Loads the job's audio and synchronizes its lyrics. Only a missing or
    /// undecodable audio file (or cancellation) is an error.
    pub fn synchronize(&mut self, job: &SyncJob) -> Result<SyncOutput, SyncError> {
        let audio = load_audio(&job.audio_path)?;
        self.synchronize_audio(&audio, job)
    }

    pub fn synchronize_audio(
        &mut self,
        audio: &AudioInput,
        job: &SyncJob,
    ) -> Result<SyncOutput, SyncError> {
        let Self {
            config,
            phonemizer,
            syllable_aligner,
            vocabulary,
            phoneme_aligner,
            recognizer,
            f0_estimator,
            speech_detector,
            cancel,
        } = self;
        let config = &*config;
        let phonemizer: &dyn Phonemizer = &**phonemizer;
        let syllable_aligner: &dyn SyllableAligner = &**syllable_aligner;
        let vocabulary = &*vocabulary;
        let cancel = cancel.as_ref();
        let duration = round_ms(audio.duration_sec());
        let raw_lines = split_lyric_lines(&job.lyrics);
        let lines = clean_lines(raw_lines.iter().map(String::as_str));
        let language = detect_language(
            &job.lyrics,
            job.language.as_deref(),
            job.title.as_deref(),
            job.artist.as_deref(),
        );
        tracing::info!(
            lines = lines.len(),
            dropped = raw_lines.len() - lines.len(),
            language = language.as_str(),
            duration_sec = duration,
            "synchronizing lyrics"
        );

        if lines.is_empty() {
            return Ok(SyncOutput {
                lyrics: Vec::new(),
                full_text: String::new(),
                language,
                duration,
                stage: None,
            });
        }
        if let Some(cancel) = cancel {
            cancel.check()?;
        }

        let outcome = {
            let mut aligner_scope = phoneme_aligner.as_mut().map(|h| h.scoped());
            let mut recognizer_scope = recognizer.as_mut().map(|h| h.scoped());
            run_cascade(&lines, audio, &config.cascade, |stage| match stage {
                CascadeStage::AcousticAlign => {
                    let Some(scope) = aligner_scope.as_mut() else {
                        return Ok(None);
                    };
                    let aligner = scope.get()?;
                    let orchestrator = AcousticOrchestrator {
                        phonemizer,
                        aligner: &*aligner,
                        vocabulary,
                        trim: &config.trim,
                        chunk: &config.chunk,
                        cancel,
                    };
                    let words = orchestrator.align(audio, &lines)?;
                    Ok((!words.is_empty()).then(|| group_words_into_lines(&words, &lines)))
                }
                CascadeStage::AsrReconcile => {
                    let Some(scope) = recognizer_scope.as_mut() else {
                        return Ok(None);
                    };
                    let recognizer = scope.get()?;
                    let transcript = clean_segments(recognizer.transcribe(
                        &audio.samples,
                        audio.sample_rate_hz,
                        &language,
                    )?);
                    let outcome = reconcile_with(
                        syllable_aligner,
                        &lines,
                        &transcript,
                        &config.reconcile,
                    );
                    Ok((!outcome.is_unmatched()).then_some(outcome.lines))
                }
                CascadeStage::ProportionalDistribute => Ok(None),
            })?
        };

        let mut synced = outcome.lines;
        if config.refine.enabled {
            let onsets = detect_onsets(&audio.samples, audio.sample_rate_hz, config.refine.hop_sec);
            refine_word_onsets(&mut synced, &onsets, &config.refine);
        }
        enforce_monotonic_lines(&mut synced);

        let speech = speech_detector
            .as_mut()
            .and_then(|handle| detect_speech(&mut handle.scoped(), audio));
        let mut f0_scope = f0_estimator.as_mut().map(|h| h.scoped());
        let f0 = f0_scope.as_mut().and_then(|scope| match scope.get() {
            Ok(model) => Some(model),
            Err(err) => {
                tracing::warn!(error = %err, "f0 estimator unavailable; pitch skipped");
                None
            }
        });
        annotate(
            &mut synced,
            audio,
            speech.as_deref(),
            f0.as_deref(),
            &config.prosody,
        );

        Ok(SyncOutput {
            full_text: full_text(&synced),
            lyrics: synced,
            language,
            duration,
            stage: Some(outcome.stage),
        })
    }
}

fn detect_speech(
    handle: &mut ModelHandle<dyn SpeechActivityDetector>,
    audio: &AudioInput,
) -> Option<Vec<SpeechInterval>> {
    let detector: Arc<dyn SpeechActivityDetector> = match handle.get() {
        Ok(detector) => detector,
        Err(err) => {
            tracing::warn!(error = %err, "speech detector unavailable");
            return None;
        }
    };
    match detector.detect(&audio.samples, audio.sample_rate_hz) {
        Ok(intervals) => Some(intervals),
        Err(err) => {
            tracing::warn!(error = %err, "speech detection failed; using spectral voicing");
            None
        }
    }
}

fn full_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
