// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use sign_detection::analysis::{label_counts, load_training_set, ClassifierMode};
use sign_detection::pipeline::{SessionReplayer, SessionReport};
use sign_detection::types::Config;
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sign-detection",
    about = "Replay recorded hand-landmark sessions through the sign recognition engine"
)]
struct Cli {
    /// YAML configuration file (defaults are used if it does not exist)
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Directory searched for *.jsonl sessions
    #[arg(long)]
    input_dir: Option<String>,

    /// Directory for *.results.jsonl output
    #[arg(long)]
    output_dir: Option<String>,

    /// JSON training set for neighbor mode
    #[arg(long)]
    training_set: Option<String>,

    /// Classifier: geometric or neighbor
    #[arg(long)]
    mode: Option<ClassifierMode>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_found = Path::new(&cli.config).exists();
    let mut config = if config_found {
        Config::read(&cli.config)?
    } else {
        Config::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sign_detection={}", config.logging.level).into()),
        )
        .init();

    info!("✋ Sign Detection Replay Starting");

    if config_found {
        info!("✓ Configuration loaded from {}", cli.config);
    } else {
        warn!("{} not found, using default configuration", cli.config);
    }

    if let Some(dir) = cli.input_dir {
        config.replay.input_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        config.replay.output_dir = dir;
    }
    if let Some(path) = cli.training_set {
        config.replay.training_set = Some(path);
    }
    if let Some(mode) = cli.mode {
        config.engine.mode = mode;
    }
    config.validate();

    info!(
        "Stabilizer: window={}, required={}, lock>{:.0}%, hysteresis={:.0}ms, dropout={:?}",
        config.stabilizer.window_size,
        config.stabilizer.required_frames,
        config.stabilizer.lock_confidence,
        config.stabilizer.hysteresis_ms,
        config.stabilizer.dropout_policy
    );
    info!("Classifier mode: {}", config.engine.mode);

    let training = match &config.replay.training_set {
        Some(path) => {
            let samples = load_training_set(Path::new(path))?;
            info!("  {} distinct labels", label_counts(&samples).len());
            Some(samples)
        }
        None => None,
    };

    if config.engine.mode == ClassifierMode::Neighbor && training.is_none() {
        warn!("Neighbor mode without a training set: every frame will abstain");
    }

    let replayer = SessionReplayer::new(config.clone());
    let sessions = replayer.find_session_files()?;

    if sessions.is_empty() {
        error!("No session files found in {}", config.replay.input_dir);
        return Ok(());
    }

    info!("Found {} session(s) to replay", sessions.len());

    let mut reports: Vec<SessionReport> = Vec::new();
    for (idx, path) in sessions.iter().enumerate() {
        info!("========================================");
        info!(
            "Replaying session {}/{}: {}",
            idx + 1,
            sessions.len(),
            path.display()
        );
        info!("========================================");

        match replayer.replay(path, training.as_deref()) {
            Ok(report) => {
                log_report(&report);
                reports.push(report);
            }
            Err(e) => {
                error!("Failed to replay {}: {:#}", path.display(), e);
            }
        }
    }

    std::fs::create_dir_all(&config.replay.output_dir)?;
    let summary_path = Path::new(&config.replay.output_dir).join("summary.json");
    let summary = serde_json::to_string_pretty(&reports)?;
    std::fs::write(&summary_path, summary)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    info!(
        "✓ Replayed {}/{} sessions, summary at {}",
        reports.len(),
        sessions.len(),
        summary_path.display()
    );
    Ok(())
}

fn log_report(report: &SessionReport) {
    let m = &report.metrics;
    info!("✓ Session '{}' replayed", report.session);
    info!("  Total frames: {}", report.frames);
    info!(
        "  Frames with hand: {} ({:.1}%)",
        m.frames_with_hand,
        100.0 * m.frames_with_hand as f64 / m.total_frames.max(1) as f64
    );
    if m.invalid_frames > 0 {
        info!("  ⚠️  Invalid frames skipped: {}", m.invalid_frames);
    }
    info!("  Hand lost: {} time(s)", m.hand_lost);
    info!(
        "  Locks: {} ({} replacements)",
        report.locks, m.lock_replacements
    );
    if !report.locked_labels.is_empty() {
        info!("  Sequence: {}", report.locked_labels.join(" "));
    }
    if m.motion_overrides > 0 {
        info!("  Motion overrides: {}", m.motion_overrides);
    }
    if m.neighbor_abstentions > 0 {
        info!("  Neighbor abstentions: {}", m.neighbor_abstentions);
    }
    info!("  Final phase: {}", report.final_phase.as_str());
    info!("  Results: {}", report.output_path.display());
}
