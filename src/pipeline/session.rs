// src/pipeline/session.rs
//
// Recorded sessions: one `HandFrame` JSON object per line. Replaying a
// session runs every frame through a fresh engine and writes one
// `Classification` per line next to it in the output directory.

use super::engine::RecognitionEngine;
use super::event_bus::RecognitionEvent;
use super::metrics::MetricsSummary;
use crate::analysis::{ClassifierMode, StabilizerPhase};
use crate::detection::TrainingSample;
use crate::types::{Config, HandFrame};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const SESSION_EXTENSION: &str = "jsonl";
const RESULTS_SUFFIX: &str = ".results.jsonl";

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session: String,
    pub frames: usize,
    pub locks: usize,
    /// Labels committed, in order (initial locks and replacements).
    pub locked_labels: Vec<String>,
    pub output_path: PathBuf,
    /// Stabilizer phase after the last frame.
    pub final_phase: StabilizerPhase,
    pub metrics: MetricsSummary,
}

pub struct SessionReplayer {
    config: Config,
}

impl SessionReplayer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Every `*.jsonl` under the input directory, except earlier results.
    pub fn find_session_files(&self) -> Result<Vec<PathBuf>> {
        let input_dir = Path::new(&self.config.replay.input_dir);
        if !input_dir.is_dir() {
            anyhow::bail!("Session directory not found: {}", input_dir.display());
        }

        let mut sessions = Vec::new();
        for entry in WalkDir::new(input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let is_session = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(SESSION_EXTENSION))
                .unwrap_or(false);
            let is_results = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(RESULTS_SUFFIX))
                .unwrap_or(false);

            if entry.file_type().is_file() && is_session && !is_results {
                sessions.push(path.to_path_buf());
            }
        }
        sessions.sort();

        info!("Found {} session files", sessions.len());
        Ok(sessions)
    }

    /// Replay one session through a fresh engine.
    pub fn replay(
        &self,
        path: &Path,
        training: Option<&[TrainingSample]>,
    ) -> Result<SessionReport> {
        let frames = read_session(path)?;
        let session = session_name(path);

        let mut engine = RecognitionEngine::new(&self.config);
        if let Some(samples) = training {
            engine.load_training_set(samples.to_vec());
        }
        if engine.mode() == ClassifierMode::Neighbor {
            debug!("{}: neighbor mode with {} samples", session, engine.sample_count());
        }
        engine.drain_events();

        let output_dir = Path::new(&self.config.replay.output_dir);
        fs::create_dir_all(output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
        let output_path = output_dir.join(format!("{}{}", session, RESULTS_SUFFIX));
        let file = File::create(&output_path)
            .with_context(|| format!("creating {}", output_path.display()))?;
        let mut writer = BufWriter::new(file);
        info!("💾 Results will be written to: {}", output_path.display());

        let mut locked_labels = Vec::new();
        for frame in &frames {
            let classification = engine.feed(frame);
            let line = serde_json::to_string(&classification)?;
            writeln!(writer, "{}", line)?;

            for event in engine.drain_events() {
                if let Some(label) = event.committed_label() {
                    info!("  🔒 '{}' at {:.0}ms", label, frame.timestamp_ms);
                    locked_labels.push(label.to_string());
                }
                if let RecognitionEvent::HandLost { timestamp_ms, .. } = event {
                    debug!("  ✋ hand lost at {:.0}ms", timestamp_ms);
                }
            }
        }
        writer
            .flush()
            .with_context(|| format!("writing {}", output_path.display()))?;

        Ok(SessionReport {
            session,
            frames: frames.len(),
            locks: locked_labels.len(),
            locked_labels,
            output_path,
            final_phase: engine.phase(),
            metrics: engine.metrics().summary(),
        })
    }
}

/// Parse a session file. Blank lines are ignored.
pub fn read_session(path: &Path) -> Result<Vec<HandFrame>> {
    let file = File::open(path).with_context(|| format!("opening session {}", path.display()))?;

    let mut frames = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: HandFrame = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid frame", path.display(), idx + 1))?;
        frames.push(frame);
    }

    debug!("Read {} frames from {}", frames.len(), path.display());
    Ok(frames)
}

fn session_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session")
        .to_string()
}
