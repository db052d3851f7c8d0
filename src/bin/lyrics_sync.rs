use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lyrics_sync_rs::report::{
    aggregate_reports, compute_song_report, Meta, ReferenceLine, Report, SongReport,
};
use lyrics_sync_rs::{
    LyricSyncBuilder, SpeechRecognizer, SyncConfig, SyncError, SyncJob, TranscriptFile,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[path = "lyrics_sync/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "lyrics_sync")]
#[command(about = "Synchronize lyrics to audio and report timing quality")]
struct Args {
    /// JSON manifest listing the songs to synchronize.
    #[arg(long, env = "LYRICS_SYNC_MANIFEST")]
    manifest: PathBuf,
    #[arg(long, env = "LYRICS_SYNC_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "LYRICS_SYNC_VOCAB_CONFIG")]
    vocab_config: Option<PathBuf>,
    #[arg(long, env = "LYRICS_SYNC_VOCAB_DICTIONARY")]
    vocab_dictionary: Option<PathBuf>,
    /// Directory receiving one synchronized JSON document per song.
    #[arg(long, env = "LYRICS_SYNC_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
    #[arg(long, env = "LYRICS_SYNC_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "LYRICS_SYNC_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "LYRICS_SYNC_OFFSET", default_value_t = 0)]
    offset: usize,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    cases: Vec<Case>,
}

#[derive(Debug, Clone, Deserialize)]
struct Case {
    id: String,
    audio: PathBuf,
    lyrics: PathBuf,
    #[serde(default)]
    transcript: Option<PathBuf>,
    #[serde(default)]
    reference: Option<PathBuf>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(message) = run() {
        tracing::error!("{message}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let manifest_dir = args
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let config = match args.config.as_ref() {
        Some(path) => SyncConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => SyncConfig::default(),
    };

    let mut cases = load_manifest(&args.manifest)?;
    if args.offset > 0 {
        cases = cases.into_iter().skip(args.offset).collect();
    }
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err("No cases selected after applying offset/limit.".to_string());
    }

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let started = Instant::now();
    let mut songs: Vec<SongReport> = Vec::with_capacity(cases.len());
    for case in &cases {
        progress.set_message(case.id.clone());
        let song = run_case(case, &manifest_dir, &config, &args)?;
        songs.push(song);
        progress.inc(1);
    }
    progress.finish_with_message("done");
    tracing::info!(
        cases = songs.len(),
        elapsed_sec = started.elapsed().as_secs_f64(),
        "synchronization finished"
    );

    let aggregates = aggregate_reports(&songs);
    let report = Report {
        schema_version: 1,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            aligner: "transcript-reconcile".to_string(),
            case_count: songs.len(),
        },
        songs,
        aggregates,
    };

    let out_path = resolve_out_path(args.out.as_ref());
    json_report_formatter::write_json(&out_path, &report, "report")?;
    println!("{}", out_path.display());
    Ok(())
}

fn run_case(
    case: &Case,
    manifest_dir: &Path,
    config: &SyncConfig,
    args: &Args,
) -> Result<SongReport, String> {
    let lyrics_path = resolve_path(manifest_dir, &case.lyrics);
    let lyrics = fs::read_to_string(&lyrics_path)
        .map_err(|err| format!("Failed to read lyrics '{}': {err}", lyrics_path.display()))?;

    let mut builder = LyricSyncBuilder::new(config.clone())
        .with_vocabulary_paths(args.vocab_config.clone(), args.vocab_dictionary.clone());
    if let Some(transcript) = case.transcript.as_ref() {
        let transcript_path = resolve_path(manifest_dir, transcript);
        builder = builder.with_recognizer_loader(move || {
            let recognizer: Arc<dyn SpeechRecognizer> =
                Arc::new(TranscriptFile::load(&transcript_path)?);
            Ok(recognizer)
        });
    }
    let mut synchronizer = builder
        .build()
        .map_err(|err| format!("Failed to build synchronizer for '{}': {err}", case.id))?;

    let job = SyncJob {
        audio_path: resolve_path(manifest_dir, &case.audio),
        lyrics,
        language: case.language.clone(),
        title: case.title.clone(),
        artist: case.artist.clone(),
    };
    let output = synchronizer
        .synchronize(&job)
        .map_err(|err: SyncError| format!("Case '{}' failed: {err}", case.id))?;

    if let Some(dir) = args.output_dir.as_ref() {
        let path = dir.join(format!("{}.json", case.id));
        json_report_formatter::write_json(&path, &output, "lyrics")?;
    }

    let reference = match case.reference.as_ref() {
        Some(path) => Some(load_reference(&resolve_path(manifest_dir, path))?),
        None => None,
    };
    compute_song_report(&case.id, &output, reference.as_deref())
        .map_err(|err| format!("Failed to score case '{}': {err}", case.id))
}

fn load_manifest(path: &Path) -> Result<Vec<Case>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read manifest '{}': {err}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse manifest '{}': {err}", path.display()))?;
    Ok(manifest.cases)
}

fn load_reference(path: &Path) -> Result<Vec<ReferenceLine>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read reference '{}': {err}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse reference '{}': {err}", path.display()))
}

fn resolve_out_path(out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return path.clone();
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from("target")
        .join("lyrics_sync_reports")
        .join(format!("lyrics-sync-report-{run_id}.json"))
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
