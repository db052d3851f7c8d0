use std::path::Path;

use serde::Deserialize;

use crate::error::SyncError;
use crate::pipeline::traits::SpeechRecognizer;
use crate::types::AsrSegment;

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptDocument {
    Wrapped { segments: Vec<AsrSegment> },
    Bare(Vec<AsrSegment>),
}

/// Recognizer backed by a transcript computed ahead of time. Accepts either a
/// bare segment list or `{"segments": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct TranscriptFile {
    segments: Vec<AsrSegment>,
}

impl TranscriptFile {
    pub fn new(segments: Vec<AsrSegment>) -> Self {
        Self { segments }
    }

    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SyncError::io("read transcript", e))?;
        let doc: TranscriptDocument =
            serde_json::from_str(&data).map_err(|e| SyncError::json("parse transcript", e))?;
        let segments = match doc {
            TranscriptDocument::Wrapped { segments } | TranscriptDocument::Bare(segments) => {
                segments
            }
        };
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[AsrSegment] {
        &self.segments
    }
}

impl SpeechRecognizer for TranscriptFile {
    fn transcribe(
        &self,
        _samples: &[f32],
        _sample_rate_hz: u32,
        _language: &str,
    ) -> Result<Vec<AsrSegment>, SyncError> {
        Ok(self.segments.clone())
    }
}
