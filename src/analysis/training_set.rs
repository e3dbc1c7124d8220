// src/analysis/training_set.rs
//
// Training samples on disk: a plain JSON array of `{label, vector}`.
// Vector lengths are not checked here; a mismatched sample simply never
// wins a neighbor vote.

use crate::detection::TrainingSample;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn load_training_set(path: &Path) -> Result<Vec<TrainingSample>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading training set {}", path.display()))?;
    let samples: Vec<TrainingSample> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing training set {}", path.display()))?;

    info!(
        "✓ Loaded {} training samples from {} ({})",
        samples.len(),
        path.display(),
        describe_labels(&samples)
    );
    Ok(samples)
}

pub fn save_training_set(path: &Path, samples: &[TrainingSample]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(samples).context("serializing training set")?;
    fs::write(path, json).with_context(|| format!("writing training set {}", path.display()))?;

    info!("💾 Saved {} training samples to {}", samples.len(), path.display());
    Ok(())
}

/// Samples per label, sorted by label.
pub fn label_counts(samples: &[TrainingSample]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for sample in samples {
        *counts.entry(sample.label.as_str()).or_insert(0) += 1;
    }
    counts
}

fn describe_labels(samples: &[TrainingSample]) -> String {
    let counts = label_counts(samples);
    if counts.is_empty() {
        return "empty".to_string();
    }
    counts
        .iter()
        .map(|(label, n)| format!("{}×{}", label, n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("training.json");

        let samples = vec![
            TrainingSample::new("HELLO", vec![0.1, 0.2, 0.3]),
            TrainingSample::new("THANKS", vec![0.4, 0.5]),
        ];
        save_training_set(&path, &samples).unwrap();

        let loaded = load_training_set(&path).unwrap();
        assert_eq!(loaded, samples);
    }

    #[test]
    fn test_reads_plain_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.json");
        fs::write(
            &path,
            r#"[{"label": "A", "vector": [0, 0, 0]}, {"label": "B", "vector": [10, 10, 10]}]"#,
        )
        .unwrap();

        let loaded = load_training_set(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].label, "B");
        assert_eq!(loaded[1].vector, vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_training_set(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing training set"));
    }

    #[test]
    fn test_label_counts() {
        let samples = vec![
            TrainingSample::new("B", vec![]),
            TrainingSample::new("A", vec![]),
            TrainingSample::new("B", vec![]),
        ];
        let counts = label_counts(&samples);
        assert_eq!(counts.get("A"), Some(&1));
        assert_eq!(counts.get("B"), Some(&2));
        assert_eq!(describe_labels(&samples), "A×1, B×2");
    }
}
