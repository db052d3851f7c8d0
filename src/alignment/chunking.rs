use super::grouping::round_ms;
use crate::config::ChunkConfig;
use crate::types::AlignedWord;

/// One window of the (trimmed) waveform. Only lives for the duration of a
/// chunked alignment pass.
#[derive(Debug, Clone, Copy)]
pub struct AudioChunk<'a> {
    pub index: usize,
    pub sample_offset: usize,
    pub samples: &'a [f32],
    pub time_offset_sec: f64,
    /// End of the part of this chunk that does not overlap the next one.
    /// `None` for the last chunk.
    pub boundary_sec: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPlan {
    sample_rate_hz: u32,
    chunk_samples: usize,
    step_samples: usize,
    starts: Vec<usize>,
}

impl ChunkPlan {
    /// A single chunk spans the whole waveform when it fits within the chunk
    /// budget plus overlap; otherwise chunks start every `chunk - overlap`.
    pub fn new(total_samples: usize, sample_rate_hz: u32, config: &ChunkConfig) -> Self {
        let rate = sample_rate_hz.max(1) as f64;
        let duration = total_samples as f64 / rate;
        if duration <= config.chunk_duration_sec + config.overlap_sec {
            return Self {
                sample_rate_hz,
                chunk_samples: total_samples,
                step_samples: total_samples.max(1),
                starts: vec![0],
            };
        }

        let chunk_samples = ((config.chunk_duration_sec * rate) as usize).max(1);
        let step_samples = ((config.step_sec() * rate) as usize).clamp(1, chunk_samples);
        let starts = (0..total_samples).step_by(step_samples).collect();
        Self {
            sample_rate_hz,
            chunk_samples,
            step_samples,
            starts,
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.starts.len() == 1
    }

    pub fn chunks<'a>(&'a self, samples: &'a [f32]) -> impl Iterator<Item = AudioChunk<'a>> + 'a {
        let rate = self.sample_rate_hz.max(1) as f64;
        let last = self.starts.len().saturating_sub(1);
        self.starts.iter().enumerate().map(move |(index, &start)| {
            let start = start.min(samples.len());
            let end = (start + self.chunk_samples).min(samples.len());
            AudioChunk {
                index,
                sample_offset: start,
                samples: &samples[start..end],
                time_offset_sec: start as f64 / rate,
                boundary_sec: (index < last).then(|| (start + self.step_samples) as f64 / rate),
            }
        })
    }
}

/// Hands each chunk `ceil(lines / chunks)` consecutive lyric lines. Trailing
/// chunks may get nothing.
pub fn split_lines_for_chunks<'a>(lines: &'a [String], chunk_count: usize) -> Vec<&'a [String]> {
    let chunk_count = chunk_count.max(1);
    let per_chunk = lines.len().div_ceil(chunk_count).max(1);
    (0..chunk_count)
        .map(|i| {
            let start = (i * per_chunk).min(lines.len());
            let end = (start + per_chunk).min(lines.len());
            &lines[start..end]
        })
        .collect()
}

/// Moves chunk-relative words to absolute time and drops, for every chunk but
/// the last, words starting at or past the non-overlapping boundary.
pub fn place_chunk_words(chunk: &AudioChunk<'_>, words: Vec<AlignedWord>) -> Vec<AlignedWord> {
    let before = words.len();
    let placed: Vec<AlignedWord> = words
        .into_iter()
        .map(|mut w| {
            w.word.start_time = round_ms(w.word.start_time + chunk.time_offset_sec);
            w.word.end_time = round_ms(w.word.end_time + chunk.time_offset_sec);
            w
        })
        .filter(|w| chunk.boundary_sec.map_or(true, |b| w.word.start_time < b))
        .collect();
    if placed.len() < before {
        tracing::debug!(
            chunk = chunk.index,
            dropped = before - placed.len(),
            boundary_sec = chunk.boundary_sec,
            "chunking: dropped words past non-overlapping boundary"
        );
    }
    placed
}

pub fn merge_chunk_words(chunks: Vec<Vec<AlignedWord>>) -> Vec<AlignedWord> {
    let mut merged: Vec<AlignedWord> = chunks.into_iter().flatten().collect();
    merged.sort_by(|a, b| a.word.start_time.total_cmp(&b.word.start_time));
    merged
}

/// Shifts every timestamp by the intro-trim offset.
pub fn restore_offset(words: &mut [AlignedWord], offset_sec: f64) {
    if offset_sec <= 0.0 {
        return;
    }
    for w in words {
        w.word.start_time = round_ms(w.word.start_time + offset_sec);
        w.word.end_time = round_ms(w.word.end_time + offset_sec);
    }
}
