use crate::detection::NEIGHBOR_K;
use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use tracing::warn;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let mut config = Self::read(path)?;
        config.validate();
        Ok(config)
    }

    /// Parse without validating.
    pub fn read(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
        serde_yaml::from_str(&contents).with_context(|| format!("parsing config {}", path))
    }

    /// Clamp values the engine cannot work with. Never fails.
    pub fn validate(&mut self) {
        let stab = &mut self.stabilizer;
        if stab.window_size == 0 {
            warn!("stabilizer.window_size must be > 0, using 1");
            stab.window_size = 1;
        }
        if stab.required_frames == 0 {
            warn!("stabilizer.required_frames must be > 0, using 1");
            stab.required_frames = 1;
        }
        if stab.required_frames > stab.window_size {
            warn!(
                "stabilizer.required_frames ({}) exceeds window_size ({}), clamping",
                stab.required_frames, stab.window_size
            );
            stab.required_frames = stab.window_size;
        }
        if stab.hysteresis_ms < 0.0 {
            warn!("stabilizer.hysteresis_ms is negative, using 0");
            stab.hysteresis_ms = 0.0;
        }
        stab.lock_confidence = stab.lock_confidence.clamp(0.0, 100.0);

        if self.neighbor.k != NEIGHBOR_K {
            warn!(
                "neighbor.k is fixed at {} (config asked for {})",
                NEIGHBOR_K, self.neighbor.k
            );
            self.neighbor.k = NEIGHBOR_K;
        }
        if self.neighbor.epsilon <= 0.0 {
            warn!("neighbor.epsilon must be positive, using 1e-6");
            self.neighbor.epsilon = 1e-6;
        }

        if self.motion.window == 0 {
            warn!("motion.window must be > 0, using 5");
            self.motion.window = 5;
        }

        if self.engine.event_capacity == 0 {
            self.engine.event_capacity = 1;
        }

        self.geometry.raw_confidence = self.geometry.raw_confidence.clamp(0.0, 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ClassifierMode;
    use crate::types::DropoutPolicy;
    use std::io::Write;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "stabilizer:\n  window_size: 10\n  required_frames: 8\nengine:\n  mode: neighbor\n"
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.stabilizer.window_size, 10);
        assert_eq!(config.stabilizer.required_frames, 8);
        assert_eq!(config.stabilizer.lock_confidence, 75.0);
        assert_eq!(config.stabilizer.dropout_policy, DropoutPolicy::Skip);
        assert_eq!(config.engine.mode, ClassifierMode::Neighbor);
        assert_eq!(config.geometry.finger_extension_ratio, 1.2);
    }

    #[test]
    fn test_validate_clamps_bad_values() {
        let mut config = Config::default();
        config.stabilizer.window_size = 5;
        config.stabilizer.required_frames = 12;
        config.neighbor.k = 9;
        config.validate();

        assert_eq!(config.stabilizer.required_frames, 5);
        assert_eq!(config.neighbor.k, NEIGHBOR_K);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::load("/nonexistent/sign-detection.yaml").is_err());
    }
}
