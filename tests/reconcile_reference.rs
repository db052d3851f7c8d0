use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use libtest_mimic::{Arguments, Failed, Trial};
use lyrics_sync_rs::config::ReconcileConfig;
use lyrics_sync_rs::{reconcile, AsrSegment, Line};
use serde::Deserialize;

const DEFAULT_DELTA_MS: f64 = 1.0;
const SUITE_NAME: &str = "reconcile_reference_matches_within_delta";
const EPS_SEC: f64 = 1e-9;

#[derive(Debug, Deserialize)]
struct ReconcileFixture {
    reference: Vec<String>,
    transcript: Vec<AsrSegment>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    matched_lines: usize,
    #[serde(default)]
    lines: Vec<ExpectedLine>,
}

#[derive(Debug, Deserialize)]
struct ExpectedLine {
    index: usize,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
}

fn main() {
    let args = Arguments::from_args();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let fixture_dir = repo_root.join("tests").join("fixtures").join("reconcile");
    let delta_ms = env_f64("LYRICS_SYNC_IT_DELTA_MS", DEFAULT_DELTA_MS);

    let fixtures = match list_fixtures(&fixture_dir) {
        Ok(paths) if !paths.is_empty() => paths,
        Ok(_) => {
            run_setup_failure(
                &args,
                format!("No reconcile fixtures found under {}.", fixture_dir.display()),
            );
            return;
        }
        Err(err) => {
            run_setup_failure(&args, err);
            return;
        }
    };

    let tests = fixtures
        .into_iter()
        .map(|path| {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Trial::test(format!("{SUITE_NAME}::{name}"), move || {
                run_fixture(&path, delta_ms).map_err(Failed::from)
            })
        })
        .collect();

    libtest_mimic::run(&args, tests).exit();
}

fn run_setup_failure(args: &Arguments, message: String) {
    let test = Trial::test(format!("{SUITE_NAME}::setup"), move || {
        Err(Failed::from(message))
    });
    libtest_mimic::run(args, vec![test]).exit();
}

fn list_fixtures(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(dir)
        .map_err(|err| format!("Failed to list fixtures in '{}': {err}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| format!("Failed to read fixture entry: {err}"))?
            .path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn run_fixture(path: &Path, delta_ms: f64) -> Result<(), String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read fixture '{}': {err}", path.display()))?;
    let fixture: ReconcileFixture = serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse fixture '{}': {err}", path.display()))?;

    let config = ReconcileConfig::default();
    let outcome = reconcile(&fixture.reference, &fixture.transcript, &config);

    if outcome.lines.len() != fixture.reference.len() {
        return Err(format!(
            "line count mismatch: predicted={} reference={}",
            outcome.lines.len(),
            fixture.reference.len()
        ));
    }
    if outcome.matched_lines != fixture.expected.matched_lines {
        return Err(format!(
            "matched line count mismatch: predicted={} expected={}",
            outcome.matched_lines, fixture.expected.matched_lines
        ));
    }

    check_structure(&outcome.lines, &config)?;

    let delta_sec = delta_ms / 1000.0;
    let mut failures = Vec::new();
    for expected in &fixture.expected.lines {
        let Some(line) = outcome.lines.get(expected.index) else {
            failures.push(format!("line {} missing", expected.index));
            continue;
        };
        if let Some(start) = expected.start {
            if (line.start_time - start).abs() > delta_sec {
                failures.push(format!(
                    "line {} start {:.4}s expected {:.4}s",
                    expected.index, line.start_time, start
                ));
            }
        }
        if let Some(end) = expected.end {
            if (line.end_time - end).abs() > delta_sec {
                failures.push(format!(
                    "line {} end {:.4}s expected {:.4}s",
                    expected.index, line.end_time, end
                ));
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} endpoint(s) outside {delta_ms}ms:\n  {}",
            failures.len(),
            failures.join("\n  ")
        ))
    }
}

fn check_structure(lines: &[Line], config: &ReconcileConfig) -> Result<(), String> {
    for (i, pair) in lines.windows(2).enumerate() {
        if pair[0].end_time > pair[1].start_time + EPS_SEC {
            return Err(format!(
                "line {i} ends at {:.4}s after line {} starts at {:.4}s",
                pair[0].end_time,
                i + 1,
                pair[1].start_time
            ));
        }
    }
    for (i, line) in lines.iter().enumerate() {
        let duration = line.duration();
        if duration < config.min_line_sec - EPS_SEC || duration > config.max_line_sec + EPS_SEC {
            return Err(format!("line {i} duration {duration:.4}s outside bounds"));
        }
        let first = line.words.first().map(|w| w.start_time);
        let last = line.words.last().map(|w| w.end_time);
        if first != Some(line.start_time) || last != Some(line.end_time) {
            return Err(format!("line {i} span does not match its words"));
        }
        for pair in line.words.windows(2) {
            if pair[0].end_time > pair[1].start_time + EPS_SEC {
                return Err(format!("line {i} has overlapping words"));
            }
        }
    }
    Ok(())
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(default)
}
