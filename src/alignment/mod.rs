pub mod audio_boundaries;
pub mod chunking;
pub mod global_alignment;
pub(crate) mod grouping;
pub mod onsets;
pub mod phonemizer;
