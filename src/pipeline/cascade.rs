use crate::alignment::audio_boundaries::detect_vocal_range;
use crate::config::CascadeConfig;
use crate::error::SyncError;
use crate::lyrics::distribute_words;
use crate::reconcile::{split_proportional, unit_weight};
use crate::types::{AudioInput, CascadeStage, Line};

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub lines: Vec<Line>,
    pub stage: CascadeStage,
}

/// Walks `AcousticAlign → AsrReconcile → ProportionalDistribute`, trying
/// each stage once. `attempt` runs the model-backed stages and returns
/// `Ok(None)` when a stage has nothing to offer. The terminal stage is
/// computed here and always yields one line per lyric line.
pub fn run_cascade<F>(
    lines: &[String],
    audio: &AudioInput,
    config: &CascadeConfig,
    mut attempt: F,
) -> Result<CascadeOutcome, SyncError>
where
    F: FnMut(CascadeStage) -> Result<Option<Vec<Line>>, SyncError>,
{
    let mut stage = CascadeStage::AcousticAlign;
    loop {
        if stage == CascadeStage::ProportionalDistribute {
            return Ok(CascadeOutcome {
                lines: proportional_lines(lines, audio, config),
                stage,
            });
        }
        match attempt(stage) {
            Ok(Some(result)) if !result.is_empty() => {
                tracing::info!(
                    stage = stage.as_str(),
                    lines = result.len(),
                    "cascade stage accepted"
                );
                return Ok(CascadeOutcome {
                    lines: result,
                    stage,
                });
            }
            Ok(_) => {
                tracing::info!(
                    stage = stage.as_str(),
                    "cascade stage produced nothing; escalating"
                );
            }
            Err(SyncError::Cancelled) => return Err(SyncError::Cancelled),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                tracing::warn!(stage = stage.as_str(), error = %err, "cascade stage failed");
            }
        }
        stage = match stage.next() {
            Some(next) => next,
            None => CascadeStage::ProportionalDistribute,
        };
    }
}

/// Spreads lyric lines over the vocal range by unit count and their words
/// inside each line the same way.
pub fn proportional_lines(
    lines: &[String],
    audio: &AudioInput,
    config: &CascadeConfig,
) -> Vec<Line> {
    if lines.is_empty() {
        return Vec::new();
    }
    let duration = audio.duration_sec();
    let (start, end) = if duration > 0.0 {
        detect_vocal_range(
            &audio.samples,
            audio.sample_rate_hz,
            config.vocal_range_hop_sec,
            config.vocal_range_ratio,
        )
        .unwrap_or((0.0, duration))
    } else {
        (0.0, config.fallback_line_sec * lines.len() as f64)
    };
    tracing::info!(
        start = format!("{start:.2}"),
        end = format!("{end:.2}"),
        lines = lines.len(),
        "proportional distribution"
    );

    let weights: Vec<usize> = lines.iter().map(|l| unit_weight(l)).collect();
    lines
        .iter()
        .zip(split_proportional(start, end, &weights))
        .map(|(text, (s, e))| Line::from_words(text.as_str(), distribute_words(text, s, e)))
        .collect()
}
