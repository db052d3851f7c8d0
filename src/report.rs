use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::types::{CascadeStage, Line, SyncOutput};

const OUTLIER_TOP_N: usize = 20;
const EPS_DURATION_SEC: f64 = 0.001;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub songs: Vec<SongReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub aligner: String,
    pub case_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SongReport {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<CascadeStage>,
    pub language: String,
    pub duration_sec: f64,
    pub line_count: u32,
    pub word_count: u32,
    pub has_reference: bool,
    pub structural: StructuralMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingMetrics>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructuralMetrics {
    pub overlapping_line_count: u32,
    pub non_positive_line_count: u32,
    pub line_span_mismatch_count: u32,
    pub negative_duration_word_count: u32,
    pub overlap_word_count: u32,
    pub word_outside_line_count: u32,
    pub gap_ratio: f32,
    pub coverage_ratio: f32,
}

/// Reference line timing used to score a synchronized song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimingMetrics {
    pub start: EndpointMetrics,
    pub end: EndpointMetrics,
    pub abs_err_ms_median: f32,
    pub abs_err_ms_p90: f32,
    pub offset_ms: f32,
    pub drift_ms_per_sec: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointMetrics {
    pub mean_signed_ms: f32,
    pub median_abs_ms: f32,
    pub p90_abs_ms: f32,
    pub max_abs_ms: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    pub abs_err_ms_p90: Option<MetricDistribution>,
    pub gap_ratio: Option<MetricDistribution>,
    pub coverage_ratio: Option<MetricDistribution>,
    pub worst_abs_err_ms_p90: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateCounts {
    pub total: u32,
    pub with_reference: u32,
    pub acoustic_align: u32,
    pub asr_reconcile: u32,
    pub proportional_distribute: u32,
    pub structurally_invalid: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f32,
    pub p50: f32,
    pub p90: f32,
    pub p95: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub value: f32,
}

impl StructuralMetrics {
    pub fn is_valid(&self) -> bool {
        self.overlapping_line_count == 0
            && self.non_positive_line_count == 0
            && self.line_span_mismatch_count == 0
            && self.negative_duration_word_count == 0
            && self.overlap_word_count == 0
            && self.word_outside_line_count == 0
    }
}

pub fn compute_song_report(
    id: &str,
    output: &SyncOutput,
    reference: Option<&[ReferenceLine]>,
) -> Result<SongReport, SyncError> {
    let mut notes = Vec::new();
    let lines = &output.lyrics;
    if lines.is_empty() {
        notes.push("no_lines".to_string());
    }
    if output.stage == Some(CascadeStage::ProportionalDistribute) {
        notes.push("proportional_fallback".to_string());
    }

    let structural = compute_structural_metrics(lines, output.duration)?;
    if !structural.is_valid() {
        notes.push("structural_violations".to_string());
    }

    let timing = match reference {
        Some(reference) => {
            if reference.len() != lines.len() {
                notes.push(format!(
                    "line_count_mismatch:pred={} ref={}",
                    lines.len(),
                    reference.len()
                ));
            }
            Some(compute_timing_metrics(lines, reference, output.duration, &mut notes)?)
        }
        None => None,
    };

    Ok(SongReport {
        id: id.to_string(),
        stage: output.stage,
        language: output.language.clone(),
        duration_sec: output.duration,
        line_count: to_u32(lines.len()),
        word_count: to_u32(lines.iter().map(|l| l.words.len()).sum()),
        has_reference: reference.is_some(),
        structural,
        timing,
        notes,
    })
}

pub fn aggregate_reports(songs: &[SongReport]) -> AggregateReport {
    let count_stage = |stage: CascadeStage| songs.iter().filter(|s| s.stage == Some(stage)).count();
    let p90: Vec<f64> = songs
        .iter()
        .filter_map(|s| s.timing.as_ref().map(|t| t.abs_err_ms_p90 as f64))
        .collect();
    let gap: Vec<f64> = songs.iter().map(|s| s.structural.gap_ratio as f64).collect();
    let coverage: Vec<f64> = songs
        .iter()
        .map(|s| s.structural.coverage_ratio as f64)
        .collect();

    let mut worst: Vec<OutlierEntry> = songs
        .iter()
        .filter_map(|s| {
            s.timing.as_ref().map(|t| OutlierEntry {
                id: s.id.clone(),
                value: t.abs_err_ms_p90,
            })
        })
        .collect();
    worst.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    worst.truncate(OUTLIER_TOP_N);

    AggregateReport {
        counts: AggregateCounts {
            total: to_u32(songs.len()),
            with_reference: to_u32(songs.iter().filter(|s| s.has_reference).count()),
            acoustic_align: to_u32(count_stage(CascadeStage::AcousticAlign)),
            asr_reconcile: to_u32(count_stage(CascadeStage::AsrReconcile)),
            proportional_distribute: to_u32(count_stage(CascadeStage::ProportionalDistribute)),
            structurally_invalid: to_u32(songs.iter().filter(|s| !s.structural.is_valid()).count()),
        },
        abs_err_ms_p90: distribution_or_none(&p90),
        gap_ratio: distribution_or_none(&gap),
        coverage_ratio: distribution_or_none(&coverage),
        worst_abs_err_ms_p90: worst,
    }
}

const SPAN_EPS: f64 = 1e-6;

fn compute_structural_metrics(
    lines: &[Line],
    duration_sec: f64,
) -> Result<StructuralMetrics, SyncError> {
    let overlapping_line_count = lines
        .windows(2)
        .filter(|pair| pair[0].end_time > pair[1].start_time + SPAN_EPS)
        .count();
    let non_positive_line_count = lines.iter().filter(|l| l.end_time <= l.start_time).count();
    let line_span_mismatch_count = lines
        .iter()
        .filter(|l| match (l.words.first(), l.words.last()) {
            (Some(first), Some(last)) => {
                (first.start_time - l.start_time).abs() > SPAN_EPS
                    || (last.end_time - l.end_time).abs() > SPAN_EPS
            }
            _ => false,
        })
        .count();

    let mut negative_duration_word_count = 0usize;
    let mut overlap_word_count = 0usize;
    let mut word_outside_line_count = 0usize;
    for line in lines {
        for word in &line.words {
            if word.end_time < word.start_time {
                negative_duration_word_count += 1;
            }
            if word.start_time < line.start_time - SPAN_EPS
                || word.end_time > line.end_time + SPAN_EPS
            {
                word_outside_line_count += 1;
            }
        }
        overlap_word_count += line
            .words
            .windows(2)
            .filter(|pair| pair[0].end_time > pair[1].start_time + SPAN_EPS)
            .count();
    }

    let mut gap = 0.0f64;
    let mut covered = 0.0f64;
    for (i, line) in lines.iter().enumerate() {
        covered += (line.end_time - line.start_time).max(0.0);
        if let Some(next) = lines.get(i + 1) {
            gap += (next.start_time - line.end_time).max(0.0);
        }
    }
    let denom = duration_sec.max(EPS_DURATION_SEC);

    Ok(StructuralMetrics {
        overlapping_line_count: to_u32(overlapping_line_count),
        non_positive_line_count: to_u32(non_positive_line_count),
        line_span_mismatch_count: to_u32(line_span_mismatch_count),
        negative_duration_word_count: to_u32(negative_duration_word_count),
        overlap_word_count: to_u32(overlap_word_count),
        word_outside_line_count: to_u32(word_outside_line_count),
        gap_ratio: checked_f32(gap / denom, "structural.gap_ratio")?,
        coverage_ratio: checked_f32(covered / denom, "structural.coverage_ratio")?,
    })
}

fn compute_timing_metrics(
    predicted: &[Line],
    reference: &[ReferenceLine],
    duration_sec: f64,
    notes: &mut Vec<String>,
) -> Result<TimingMetrics, SyncError> {
    let paired_len = predicted.len().min(reference.len());
    if paired_len == 0 {
        notes.push("no_line_pairs_for_timing".to_string());
    }

    let mut start_signed = Vec::with_capacity(paired_len);
    let mut end_signed = Vec::with_capacity(paired_len);
    let mut center_signed = Vec::with_capacity(paired_len);
    let mut abs_all = Vec::with_capacity(paired_len * 2);
    for (pred, reference_line) in predicted.iter().zip(reference) {
        let start_err = (pred.start_time - reference_line.start_time) * 1000.0;
        let end_err = (pred.end_time - reference_line.end_time) * 1000.0;
        start_signed.push(start_err);
        end_signed.push(end_err);
        center_signed.push((start_err + end_err) / 2.0);
        abs_all.push(start_err.abs());
        abs_all.push(end_err.abs());
    }

    let start = endpoint_metrics("timing.start", &start_signed)?;
    let end = endpoint_metrics("timing.end", &end_signed)?;
    abs_all.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let drift = (end.mean_signed_ms as f64 - start.mean_signed_ms as f64)
        / duration_sec.max(EPS_DURATION_SEC);

    Ok(TimingMetrics {
        abs_err_ms_median: checked_f32(median_sorted(&abs_all), "timing.abs_err_ms_median")?,
        abs_err_ms_p90: checked_f32(percentile_sorted(&abs_all, 0.9), "timing.abs_err_ms_p90")?,
        offset_ms: checked_f32(mean(&center_signed), "timing.offset_ms")?,
        drift_ms_per_sec: checked_f32(drift, "timing.drift_ms_per_sec")?,
        start,
        end,
    })
}

fn endpoint_metrics(
    metric_prefix: &str,
    signed_errors: &[f64],
) -> Result<EndpointMetrics, SyncError> {
    let mut abs_values: Vec<f64> = signed_errors.iter().map(|v| v.abs()).collect();
    abs_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let max_abs = abs_values.last().copied().unwrap_or(0.0);

    Ok(EndpointMetrics {
        mean_signed_ms: checked_f32(
            mean(signed_errors),
            &format!("{metric_prefix}.mean_signed_ms"),
        )?,
        median_abs_ms: checked_f32(
            median_sorted(&abs_values),
            &format!("{metric_prefix}.median_abs_ms"),
        )?,
        p90_abs_ms: checked_f32(
            percentile_sorted(&abs_values, 0.9),
            &format!("{metric_prefix}.p90_abs_ms"),
        )?,
        max_abs_ms: checked_f32(max_abs, &format!("{metric_prefix}.max_abs_ms"))?,
    })
}

fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(MetricDistribution {
        mean: checked_f32(mean(&sorted), "aggregate.mean").ok()?,
        p50: checked_f32(percentile_sorted(&sorted, 0.5), "aggregate.p50").ok()?,
        p90: checked_f32(percentile_sorted(&sorted, 0.9), "aggregate.p90").ok()?,
        p95: checked_f32(percentile_sorted(&sorted, 0.95), "aggregate.p95").ok()?,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median_sorted(sorted_values: &[f64]) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let mid = sorted_values.len() / 2;
    if sorted_values.len() % 2 == 0 {
        (sorted_values[mid - 1] + sorted_values[mid]) / 2.0
    } else {
        sorted_values[mid]
    }
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    match sorted_values.len() {
        0 => 0.0,
        1 => sorted_values[0],
        len => {
            let rank = percentile.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
        }
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn checked_f32(value: f64, metric_name: &str) -> Result<f32, SyncError> {
    if !value.is_finite() || value.abs() > f32::MAX as f64 {
        return Err(SyncError::invalid_input(format!(
            "metric '{metric_name}' produced unusable value: {value}"
        )));
    }
    Ok(value as f32)
}
