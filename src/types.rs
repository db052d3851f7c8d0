use serde::{Deserialize, Serialize};

pub const SILENCE_PHONEME: &str = "SP";

#[derive(Debug, Clone)]
pub struct AudioInput {
    pub sample_rate_hz: u32,
    /// Mono samples in [-1, 1].
    pub samples: Vec<f32>,
}

impl AudioInput {
    pub fn new(sample_rate_hz: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate_hz,
            samples,
        }
    }

    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate_hz as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeSequence {
    pub phonemes: Vec<String>,
    /// Source word for each phoneme; `None` marks a silence boundary.
    pub word_index: Vec<Option<usize>>,
    pub words: Vec<String>,
}

impl PhonemeSequence {
    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }
}

/// One aligned phoneme as reported by the external frame aligner.
#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeSpan {
    pub phoneme: String,
    pub start: f64,
    pub end: f64,
}

impl PhonemeSpan {
    pub fn new(phoneme: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            phoneme: phoneme.into(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsrWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsrSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub words: Vec<AsrWord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechInterval {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F0Frame {
    pub frequency_hz: f32,
    /// Periodicity / voicing confidence in [0, 1].
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEstimate {
    #[serde(rename = "pitch")]
    pub hz: f32,
    pub note: String,
    pub midi: u8,
}

impl PitchEstimate {
    pub fn unvoiced() -> Self {
        Self {
            hz: 0.0,
            note: String::new(),
            midi: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prosody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_curve: Option<Vec<f32>>,
    #[serde(flatten)]
    pub pitch: Option<PitchEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voiced: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(flatten)]
    pub prosody: Prosody,
}

impl Word {
    pub fn new(text: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            text: text.into(),
            start_time,
            end_time,
            prosody: Prosody::default(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub words: Vec<Word>,
}

impl Line {
    /// Builds a line whose span is taken from its first and last word.
    pub fn from_words(text: impl Into<String>, words: Vec<Word>) -> Self {
        let start_time = words.first().map(|w| w.start_time).unwrap_or(0.0);
        let end_time = words.last().map(|w| w.end_time).unwrap_or(start_time);
        Self {
            text: text.into(),
            start_time,
            end_time,
            words,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub(crate) fn sync_span_from_words(&mut self) {
        if let (Some(first), Some(last)) = (self.words.first(), self.words.last()) {
            self.start_time = first.start_time;
            self.end_time = last.end_time;
        }
    }
}

/// Word produced by acoustic alignment, still tagged with its position in the
/// phonemized word list so gaps can be filled by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedWord {
    pub index: usize,
    pub word: Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStage {
    AcousticAlign,
    AsrReconcile,
    ProportionalDistribute,
}

impl CascadeStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AcousticAlign => "acoustic_align",
            Self::AsrReconcile => "asr_reconcile",
            Self::ProportionalDistribute => "proportional_distribute",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::AcousticAlign => Some(Self::AsrReconcile),
            Self::AsrReconcile => Some(Self::ProportionalDistribute),
            Self::ProportionalDistribute => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutput {
    pub lyrics: Vec<Line>,
    pub full_text: String,
    pub language: String,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<CascadeStage>,
}
