// src/detection/motion.rs
//
// Static shapes that have a "drawn" counterpart (I → J, 1/D → Z) are
// indistinguishable in a single frame. This tracks index-fingertip speed
// while such a shape is held and swaps in the motion variant once the
// average displacement is high enough.

use super::geometric::Sign;
use super::landmarks::{INDEX_TIP, LANDMARK_COUNT};
use super::normalizer::HandScale;
use crate::types::{Landmark, MotionConfig};
use std::collections::VecDeque;
use tracing::debug;

/// Motion variant for a static sign, if it has one.
pub fn motion_variant(sign: Sign) -> Option<Sign> {
    match sign {
        Sign::I => Some(Sign::J),
        Sign::One | Sign::D => Some(Sign::Z),
        _ => None,
    }
}

pub struct MotionOverride {
    config: MotionConfig,
    displacements: VecDeque<f64>,
    prev_tip: Option<Landmark>,
}

impl MotionOverride {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            displacements: VecDeque::with_capacity(config.window),
            prev_tip: None,
            config,
        }
    }

    /// Feed this frame's geometric candidate. Returns the candidate, or its
    /// motion variant when the fingertip has been moving fast enough over a
    /// full window.
    pub fn apply(&mut self, candidate: Option<Sign>, landmarks: &[Landmark]) -> Option<Sign> {
        let (sign, variant) = match candidate.and_then(|s| motion_variant(s).map(|v| (s, v))) {
            Some(pair) if landmarks.len() == LANDMARK_COUNT => pair,
            _ => {
                self.reset();
                return candidate;
            }
        };

        let tip = landmarks[INDEX_TIP];
        let scale = HandScale::from_landmarks(landmarks);

        if let Some(prev) = self.prev_tip {
            self.displacements
                .push_back(scale.normalized_distance(&prev, &tip));
            if self.displacements.len() > self.config.window {
                self.displacements.pop_front();
            }
        }
        self.prev_tip = Some(tip);

        match self.average_velocity() {
            Some(v) if v > self.config.velocity_threshold => {
                debug!(
                    "Motion override {} → {} (avg velocity {:.3})",
                    sign.as_str(),
                    variant.as_str(),
                    v
                );
                Some(variant)
            }
            _ => Some(sign),
        }
    }

    /// Mean displacement over a full window; `None` until the window fills.
    pub fn average_velocity(&self) -> Option<f64> {
        if self.displacements.len() < self.config.window {
            return None;
        }
        Some(self.displacements.iter().sum::<f64>() / self.displacements.len() as f64)
    }

    pub fn sample_count(&self) -> usize {
        self.displacements.len()
    }

    pub fn reset(&mut self) {
        self.displacements.clear();
        self.prev_tip = None;
    }
}

impl Default for MotionOverride {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}
