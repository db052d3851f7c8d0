pub mod alignment;
pub mod audio;
pub mod config;
pub mod error;
pub mod lyrics;
pub mod pipeline;
pub mod prosody;
pub mod reconcile;
pub mod report;
pub mod types;

pub use alignment::phonemizer::tokenize;
pub use audio::load_audio;
pub use config::SyncConfig;
pub use error::SyncError;
pub use pipeline::builder::LyricSyncBuilder;
pub use pipeline::model_handle::{CancellationFlag, ModelHandle};
pub use pipeline::runtime::{LyricSynchronizer, SyncJob};
pub use pipeline::traits::{
    F0Estimator, PhonemeAligner, Phonemizer, SpeechActivityDetector, SpeechRecognizer,
    SyllableAligner,
};
pub use pipeline::transcript::TranscriptFile;
pub use pipeline::vocabulary::PhonemeVocabulary;
pub use prosody::annotate;
pub use reconcile::{reconcile, reconcile_with, ReconcileOutcome};
pub use types::{
    AsrSegment, AsrWord, AudioInput, CascadeStage, Line, SpeechInterval, SyncOutput, Word,
};
