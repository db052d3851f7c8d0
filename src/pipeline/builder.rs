use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::pipeline::defaults::{HangulPhonemizer, NeedlemanWunschAligner};
use crate::pipeline::model_handle::{CancellationFlag, ModelHandle};
use crate::pipeline::runtime::{LyricSynchronizer, LyricSynchronizerParts};
use crate::pipeline::traits::{
    F0Estimator, PhonemeAligner, Phonemizer, SpeechActivityDetector, SpeechRecognizer,
    SyllableAligner,
};
use crate::pipeline::vocabulary::PhonemeVocabulary;

pub struct LyricSyncBuilder {
    config: SyncConfig,
    phonemizer: Option<Box<dyn Phonemizer>>,
    syllable_aligner: Option<Box<dyn SyllableAligner>>,
    vocabulary: Option<PhonemeVocabulary>,
    vocabulary_paths: Option<(Option<PathBuf>, Option<PathBuf>)>,
    phoneme_aligner: Option<ModelHandle<dyn PhonemeAligner>>,
    recognizer: Option<ModelHandle<dyn SpeechRecognizer>>,
    f0_estimator: Option<ModelHandle<dyn F0Estimator>>,
    speech_detector: Option<ModelHandle<dyn SpeechActivityDetector>>,
    cancel: Option<CancellationFlag>,
}

impl LyricSyncBuilder {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            phonemizer: None,
            syllable_aligner: None,
            vocabulary: None,
            vocabulary_paths: None,
            phoneme_aligner: None,
            recognizer: None,
            f0_estimator: None,
            speech_detector: None,
            cancel: None,
        }
    }

    pub fn with_phonemizer(mut self, phonemizer: Box<dyn Phonemizer>) -> Self {
        self.phonemizer = Some(phonemizer);
        self
    }

    pub fn with_syllable_aligner(mut self, syllable_aligner: Box<dyn SyllableAligner>) -> Self {
        self.syllable_aligner = Some(syllable_aligner);
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: PhonemeVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Vocabulary config and pronunciation dictionary tried in that order at
    /// build time.
    pub fn with_vocabulary_paths(
        mut self,
        config: Option<PathBuf>,
        dictionary: Option<PathBuf>,
    ) -> Self {
        self.vocabulary_paths = Some((config, dictionary));
        self
    }

    pub fn with_phoneme_aligner(mut self, aligner: Arc<dyn PhonemeAligner>) -> Self {
        self.phoneme_aligner = Some(ModelHandle::ready("phoneme aligner", aligner));
        self
    }

    /// Defers construction of the aligner until a job first needs it.
    pub fn with_phoneme_aligner_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn PhonemeAligner>, SyncError> + Send + Sync + 'static,
    {
        self.phoneme_aligner = Some(ModelHandle::new("phoneme aligner", loader));
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(ModelHandle::ready("speech recognizer", recognizer));
        self
    }

    pub fn with_recognizer_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn SpeechRecognizer>, SyncError> + Send + Sync + 'static,
    {
        self.recognizer = Some(ModelHandle::new("speech recognizer", loader));
        self
    }

    pub fn with_f0_estimator(mut self, estimator: Arc<dyn F0Estimator>) -> Self {
        self.f0_estimator = Some(ModelHandle::ready("f0 estimator", estimator));
        self
    }

    pub fn with_speech_detector(mut self, detector: Arc<dyn SpeechActivityDetector>) -> Self {
        self.speech_detector = Some(ModelHandle::ready("speech detector", detector));
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<LyricSynchronizer, SyncError> {
        let chunk = &self.config.chunk;
        if chunk.chunk_duration_sec <= 0.0 || chunk.overlap_sec >= chunk.chunk_duration_sec {
            return Err(SyncError::invalid_input(format!(
                "chunk overlap ({}s) must be shorter than the chunk ({}s)",
                chunk.overlap_sec, chunk.chunk_duration_sec
            )));
        }

        let vocabulary = match (self.vocabulary, self.vocabulary_paths) {
            (Some(vocabulary), _) => vocabulary,
            (None, Some((config, dictionary))) => {
                PhonemeVocabulary::load_with_fallback(config.as_deref(), dictionary.as_deref())
                    .unwrap_or_else(|| {
                        tracing::warn!("no phoneme vocabulary loaded; using built-in inventory");
                        PhonemeVocabulary::default()
                    })
            }
            (None, None) => PhonemeVocabulary::default(),
        };

        Ok(LyricSynchronizer::from_parts(LyricSynchronizerParts {
            config: self.config,
            phonemizer: self
                .phonemizer
                .unwrap_or_else(|| Box::new(HangulPhonemizer)),
            syllable_aligner: self
                .syllable_aligner
                .unwrap_or_else(|| Box::new(NeedlemanWunschAligner)),
            vocabulary,
            phoneme_aligner: self.phoneme_aligner,
            recognizer: self.recognizer,
            f0_estimator: self.f0_estimator,
            speech_detector: self.speech_detector,
            cancel: self.cancel,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkConfig;

    #[test]
    fn builder_defaults() {
        let builder = LyricSyncBuilder::new(SyncConfig::default());
        assert!(builder.phonemizer.is_none());
        assert!(builder.phoneme_aligner.is_none());
        let sync = builder.build().expect("default build");
        assert_eq!(sync.config(), &SyncConfig::default());
    }

    #[test]
    fn build_rejects_overlap_not_shorter_than_chunk() {
        let config = SyncConfig {
            chunk: ChunkConfig {
                chunk_duration_sec: 30.0,
                overlap_sec: 30.0,
            },
            ..SyncConfig::default()
        };
        let result = LyricSyncBuilder::new(config).build();
        assert!(matches!(result, Err(SyncError::InvalidInput { .. })));
    }

    #[test]
    fn vocabulary_paths_fall_back_to_inventory() {
        let builder = LyricSyncBuilder::new(SyncConfig::default()).with_vocabulary_paths(
            Some(PathBuf::from("/nonexistent/vocab.json")),
            Some(PathBuf::from("/nonexistent/dict.tsv")),
        );
        assert!(builder.build().is_ok());
    }

    #[test]
    fn loader_is_not_called_at_build_time() {
        let builder = LyricSyncBuilder::new(SyncConfig::default())
            .with_phoneme_aligner_loader(|| Err(SyncError::runtime("load aligner", "no weights")));
        assert!(builder.build().is_ok());
    }
}
