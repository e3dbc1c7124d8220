// src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::ClassifierMode;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stabilizer: StabilizerConfig,
    pub geometry: GeometryConfig,
    pub motion: MotionConfig,
    pub neighbor: NeighborConfig,
    pub engine: EngineConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

/// What the stabilizer does with a frame where a hand is visible but no
/// classifier produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropoutPolicy {
    /// Leave the window untouched.
    Skip,
    /// Evict the oldest entry so stale votes age out.
    Shrink,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    pub window_size: usize,
    pub required_frames: usize,
    pub hysteresis_ms: f64,
    /// Combined confidence (percent) that must be exceeded to lock.
    pub lock_confidence: f64,
    pub dropout_policy: DropoutPolicy,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            required_frames: 25,
            hysteresis_ms: 800.0,
            lock_confidence: 75.0,
            dropout_policy: DropoutPolicy::Skip,
        }
    }
}

/// Ratios applied to scale-normalized distances by the geometric classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Tip must be this much farther from the wrist than the PIP joint.
    pub finger_extension_ratio: f64,
    /// Thumb tip vs thumb MCP distance to the pinky MCP.
    pub thumb_far_ratio: f64,
    /// Thumb tip-to-MCP vs IP-to-MCP.
    pub thumb_straight_ratio: f64,
    /// Two points closer than this (scale units) are "touching".
    pub thumb_touch_distance: f64,
    /// Tip gap over MCP gap above which two fingers count as spread.
    pub spread_ratio: f64,
    /// Index PIP rise above its MCP (scale units) for the hook shape.
    pub hook_rise: f64,
    /// Thumb tip drop below the knuckle row for the crossed-thumb fist.
    pub thumb_cross_drop: f64,
    /// Thumb tip drop below the knuckle row for the low-thumb fist.
    pub thumb_low_drop: f64,
    /// Raw confidence attached to every geometric candidate.
    pub raw_confidence: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            finger_extension_ratio: 1.2,
            thumb_far_ratio: 1.2,
            thumb_straight_ratio: 1.4,
            thumb_touch_distance: 0.4,
            spread_ratio: 1.5,
            hook_rise: 0.35,
            thumb_cross_drop: 0.3,
            thumb_low_drop: 0.6,
            raw_confidence: 90.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub window: usize,
    /// Average index-tip displacement per frame, in hand-scale units.
    pub velocity_threshold: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            window: 5,
            velocity_threshold: 0.08,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborConfig {
    pub k: usize,
    pub epsilon: f64,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            k: crate::detection::NEIGHBOR_K,
            epsilon: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: ClassifierMode,
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Geometric,
            event_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub training_set: Option<String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input_dir: "sessions".to_string(),
            output_dir: "output".to_string(),
            training_set: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// FRAME INPUT
// ============================================================================

/// One tracked point of the hand skeleton in normalized image space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Landmark) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Detector output for one camera frame. Empty `landmarks` means the hand
/// was lost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub timestamp_ms: f64,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl HandFrame {
    pub fn new(timestamp_ms: f64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ms,
            landmarks,
        }
    }

    pub fn hand_lost(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            landmarks: Vec::new(),
        }
    }

    pub fn has_hand(&self) -> bool {
        !self.landmarks.is_empty()
    }
}

// ============================================================================
// CLASSIFICATION OUTPUT
// ============================================================================

/// Why a frame produced (or did not produce) a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineStatus {
    Ready,
    NoHand,
    InvalidLandmarks { count: usize },
    InsufficientTrainingData { have: usize, need: usize },
    NoCandidate,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::NoHand => write!(f, "no hand"),
            Self::InvalidLandmarks { count } => {
                write!(f, "expected 21 landmarks, got {}", count)
            }
            Self::InsufficientTrainingData { have, need } => {
                write!(f, "need {} training samples, have {}", need, have)
            }
            Self::NoCandidate => write!(f, "no matching sign"),
        }
    }
}

/// User-facing per-frame result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: Option<String>,
    pub confidence: f64,
    pub locked: bool,
    pub verification_progress: f64,
    pub mode: ClassifierMode,
    pub status: EngineStatus,
}

impl Classification {
    pub fn idle(mode: ClassifierMode) -> Self {
        Self {
            label: None,
            confidence: 0.0,
            locked: false,
            verification_progress: 0.0,
            mode,
            status: EngineStatus::NoHand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_without_depth_parses() {
        let frame: HandFrame =
            serde_json::from_str(r#"{"timestamp_ms": 12.5, "landmarks": [{"x": 0.1, "y": 0.2}]}"#)
                .unwrap();
        assert_eq!(frame.landmarks[0], Landmark::new(0.1, 0.2, 0.0));
        assert!(frame.has_hand());

        let lost: HandFrame = serde_json::from_str(r#"{"timestamp_ms": 13.0}"#).unwrap();
        assert!(!lost.has_hand());
    }

    #[test]
    fn test_status_serializes_with_kind() {
        let json = serde_json::to_value(EngineStatus::InsufficientTrainingData { have: 2, need: 5 })
            .unwrap();
        assert_eq!(json["kind"], "insufficient_training_data");
        assert_eq!(json["have"], 2);
        assert_eq!(
            EngineStatus::InvalidLandmarks { count: 7 }.to_string(),
            "expected 21 landmarks, got 7"
        );
    }
}
