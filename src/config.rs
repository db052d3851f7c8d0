use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Top-level engine configuration. Every field has a default so a partial
/// JSON file only needs to name what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub trim: TrimConfig,
    pub chunk: ChunkConfig,
    pub reconcile: ReconcileConfig,
    pub prosody: ProsodyConfig,
    pub refine: RefineConfig,
    pub cascade: CascadeConfig,
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SyncError::io("read sync config", e))?;
        serde_json::from_str(&data).map_err(|e| SyncError::json("parse sync config", e))
    }
}

/// Leading-silence detection applied before acoustic alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    pub enabled: bool,
    pub min_intro_sec: f64,
    pub preroll_sec: f64,
    pub sustained_frames: usize,
    /// RMS hop expressed in seconds (2048 samples at 44.1 kHz).
    pub hop_sec: f64,
    pub loud_fraction: f32,
    pub threshold_ratio: f32,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_intro_sec: 8.0,
            preroll_sec: 2.0,
            sustained_frames: 15,
            hop_sec: 2048.0 / 44_100.0,
            loud_fraction: 0.2,
            threshold_ratio: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub chunk_duration_sec: f64,
    pub overlap_sec: f64,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_duration_sec: 480.0,
            overlap_sec: 30.0,
        }
    }
}

impl ChunkConfig {
    pub fn step_sec(&self) -> f64 {
        (self.chunk_duration_sec - self.overlap_sec).max(f64::EPSILON)
    }
}

/// Scores and repair thresholds for lyric/transcript reconciliation.
///
/// The DP magnitudes are tuning knobs, not contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub match_score: f32,
    pub mismatch_score: f32,
    pub gap_score: f32,
    pub line_break_skip_score: f32,
    pub min_line_sec: f64,
    pub max_line_sec: f64,
    pub short_line_sec: f64,
    pub long_line_sec: f64,
    pub min_word_sec: f64,
    pub min_sec_per_unit: f64,
    pub max_sec_per_unit: f64,
    pub unmatched_default_sec: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            match_score: 2.0,
            mismatch_score: -1.0,
            gap_score: -1.0,
            line_break_skip_score: 0.0,
            min_line_sec: 1.0,
            max_line_sec: 15.0,
            short_line_sec: 1.5,
            long_line_sec: 6.0,
            min_word_sec: 0.05,
            min_sec_per_unit: 0.15,
            max_sec_per_unit: 1.0,
            unmatched_default_sec: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProsodyConfig {
    pub rms_frame_sec: f64,
    pub rms_hop_sec: f64,
    pub local_window_sec: f64,
    pub curve_points: usize,
    pub pitch_chunk_sec: f64,
    pub min_periodicity: f32,
    pub flatness_fft_size: usize,
}

impl Default for ProsodyConfig {
    fn default() -> Self {
        Self {
            rms_frame_sec: 0.128,
            rms_hop_sec: 0.032,
            local_window_sec: 30.0,
            curve_points: 6,
            pitch_chunk_sec: 60.0,
            min_periodicity: 0.5,
            flatness_fft_size: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    pub enabled: bool,
    pub hop_sec: f64,
    pub tolerance_sec: f64,
    pub first_word_tolerance_sec: f64,
    /// A line's first word is never moved later if that leaves the line
    /// shorter than this.
    pub min_line_sec: f64,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hop_sec: 0.016,
            tolerance_sec: 0.15,
            first_word_tolerance_sec: 0.5,
            min_line_sec: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Vocal range threshold as a fraction of the peak RMS.
    pub vocal_range_ratio: f32,
    pub vocal_range_hop_sec: f64,
    /// Per-line duration used when the song length is unknown.
    pub fallback_line_sec: f64,
    pub default_language: String,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            vocal_range_ratio: 0.10,
            vocal_range_hop_sec: 0.032,
            fallback_line_sec: 2.0,
            default_language: "ko".to_string(),
        }
    }
}
