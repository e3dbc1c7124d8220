// src/analysis/model_selector.rs
//
// Routes a frame to the geometric classifier (plus motion override) or to
// the neighbor classifier, and owns the training set the latter reads.

use crate::detection::{
    FeatureVector, GeometricClassifier, GestureCandidate, MotionOverride, NeighborClassifier,
    NeighborOutcome, TrainingSample, NEIGHBOR_K,
};
use crate::types::{Config, Landmark};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    #[default]
    Geometric,
    Neighbor,
}

impl ClassifierMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Geometric => "geometric",
            Self::Neighbor => "neighbor",
        }
    }
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geometric" => Ok(Self::Geometric),
            "neighbor" | "knn" => Ok(Self::Neighbor),
            other => Err(format!(
                "unknown classifier mode '{}' (expected geometric or neighbor)",
                other
            )),
        }
    }
}

/// Training samples shared between the engine and whoever loads or records
/// them. Writers swap or append under the write lock; a classification holds
/// the read lock for its whole search.
pub type SharedTrainingSet = Arc<RwLock<Vec<TrainingSample>>>;

/// Result of routing one valid 21-point frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Candidate {
        candidate: GestureCandidate,
        /// The motion override replaced the static shape.
        motion_override: bool,
    },
    InsufficientSamples {
        have: usize,
        need: usize,
    },
    NoCandidate,
}

pub struct ModelSelector {
    mode: ClassifierMode,
    training: SharedTrainingSet,
    geometric: GeometricClassifier,
    motion: MotionOverride,
    neighbor: NeighborClassifier,
}

impl ModelSelector {
    pub fn new(config: &Config) -> Self {
        Self::with_training_set(config, Arc::new(RwLock::new(Vec::new())))
    }

    /// Build around an existing shared training set.
    pub fn with_training_set(config: &Config, training: SharedTrainingSet) -> Self {
        let selector = Self {
            mode: config.engine.mode,
            training,
            geometric: GeometricClassifier::new(config.geometry.clone()),
            motion: MotionOverride::new(config.motion.clone()),
            neighbor: NeighborClassifier::new(config.neighbor.epsilon),
        };
        selector.warn_if_undertrained();
        selector
    }

    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    /// Returns `true` if the mode actually changed.
    pub fn set_mode(&mut self, mode: ClassifierMode) -> bool {
        if mode == self.mode {
            return false;
        }
        info!("Classifier mode {} → {}", self.mode, mode);
        self.mode = mode;
        self.motion.reset();
        self.warn_if_undertrained();
        true
    }

    /// Replace the whole training set in one write. Returns the previous size.
    pub fn load_training_set(&mut self, samples: Vec<TrainingSample>) -> usize {
        let new_len = samples.len();
        let previous = std::mem::replace(&mut *self.write(), samples).len();
        info!("Training set replaced: {} → {} samples", previous, new_len);
        self.warn_if_undertrained();
        previous
    }

    /// Append samples. Returns the new size.
    pub fn add_samples<I>(&mut self, samples: I) -> usize
    where
        I: IntoIterator<Item = TrainingSample>,
    {
        let mut guard = self.write();
        let before = guard.len();
        guard.extend(samples);
        let after = guard.len();
        debug!("Added {} training samples ({} total)", after - before, after);
        after
    }

    /// Drop every sample and fall back to geometric mode.
    pub fn clear(&mut self) {
        let removed = std::mem::take(&mut *self.write()).len();
        info!("Training set cleared ({} samples removed)", removed);
        self.mode = ClassifierMode::Geometric;
        self.motion.reset();
    }

    pub fn sample_count(&self) -> usize {
        self.read().len()
    }

    /// Snapshot copy of the current samples.
    pub fn samples(&self) -> Vec<TrainingSample> {
        self.read().clone()
    }

    pub fn training_set(&self) -> SharedTrainingSet {
        Arc::clone(&self.training)
    }

    /// Fingertip displacements currently buffered for the J/Z check.
    pub fn motion_samples(&self) -> usize {
        self.motion.sample_count()
    }

    /// Classify one 21-point frame with the active branch.
    pub fn classify(&mut self, landmarks: &[Landmark]) -> Selection {
        match self.mode {
            ClassifierMode::Geometric => self.classify_geometric(landmarks),
            ClassifierMode::Neighbor => {
                self.motion.reset();
                let query = FeatureVector::wrist_relative(landmarks);
                self.classify_vector(query.as_slice())
            }
        }
    }

    /// Neighbor vote for an already-encoded feature vector.
    pub fn classify_vector(&self, query: &[f64]) -> Selection {
        let samples = self.read();
        match self.neighbor.classify(query, &samples) {
            NeighborOutcome::Candidate(candidate) => Selection::Candidate {
                candidate,
                motion_override: false,
            },
            NeighborOutcome::InsufficientSamples { have, need } => {
                Selection::InsufficientSamples { have, need }
            }
            NeighborOutcome::NoMatch => Selection::NoCandidate,
        }
    }

    /// Hand lost: forget fingertip history.
    pub fn reset_motion(&mut self) {
        self.motion.reset();
    }

    fn classify_geometric(&mut self, landmarks: &[Landmark]) -> Selection {
        let static_sign = self.geometric.classify(landmarks);
        let sign = self.motion.apply(static_sign, landmarks);

        match sign {
            Some(sign) => Selection::Candidate {
                candidate: GestureCandidate::new(
                    sign.as_str(),
                    self.geometric.config().raw_confidence,
                ),
                motion_override: Some(sign) != static_sign,
            },
            None => Selection::NoCandidate,
        }
    }

    fn warn_if_undertrained(&self) {
        if self.mode == ClassifierMode::Neighbor {
            let have = self.sample_count();
            if have < NEIGHBOR_K {
                warn!(
                    "Neighbor mode with {} training samples (need {}), no candidates until more are added",
                    have, NEIGHBOR_K
                );
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<TrainingSample>> {
        self.training.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<TrainingSample>> {
        self.training.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::test_hands::HandBuilder;
    use crate::detection::{Finger, FEATURE_LEN};
    use std::thread;

    fn samples(label: &str, n: usize) -> Vec<TrainingSample> {
        (0..n)
            .map(|i| TrainingSample::new(label, vec![i as f64 * 0.01; FEATURE_LEN]))
            .collect()
    }

    #[test]
    fn test_defaults_to_geometric() {
        let mut selector = ModelSelector::new(&Config::default());
        assert_eq!(selector.mode(), ClassifierMode::Geometric);

        let open = HandBuilder::open_palm().build();
        match selector.classify(&open) {
            Selection::Candidate { candidate, motion_override } => {
                assert_eq!(candidate.label, "5");
                assert_eq!(candidate.raw_confidence, 90.0);
                assert!(!motion_override);
            }
            other => panic!("expected candidate, got {:?}", other),
        }
    }

    #[test]
    fn test_neighbor_mode_needs_samples() {
        let mut selector = ModelSelector::new(&Config::default());
        assert!(selector.set_mode(ClassifierMode::Neighbor));
        assert!(!selector.set_mode(ClassifierMode::Neighbor));

        selector.add_samples(samples("HELLO", 3));
        let hand = HandBuilder::fist().build();
        assert_eq!(
            selector.classify(&hand),
            Selection::InsufficientSamples { have: 3, need: 5 }
        );

        selector.add_samples(samples("HELLO", 2));
        match selector.classify(&hand) {
            Selection::Candidate { candidate, .. } => assert_eq!(candidate.label, "HELLO"),
            other => panic!("expected candidate, got {:?}", other),
        }
    }

    #[test]
    fn test_load_replaces_and_add_appends() {
        let mut selector = ModelSelector::new(&Config::default());
        assert_eq!(selector.add_samples(samples("A", 4)), 4);
        assert_eq!(selector.load_training_set(samples("B", 6)), 4);
        assert_eq!(selector.sample_count(), 6);
        assert!(selector.samples().iter().all(|s| s.label == "B"));
        assert_eq!(selector.add_samples(samples("C", 2)), 8);
    }

    #[test]
    fn test_clear_resets_to_geometric() {
        let mut selector = ModelSelector::new(&Config::default());
        selector.load_training_set(samples("A", 10));
        selector.set_mode(ClassifierMode::Neighbor);

        selector.clear();
        assert_eq!(selector.sample_count(), 0);
        assert_eq!(selector.mode(), ClassifierMode::Geometric);
    }

    #[test]
    fn test_shared_set_updated_from_another_thread() {
        let mut selector = ModelSelector::new(&Config::default());
        selector.set_mode(ClassifierMode::Neighbor);

        let handle = selector.training_set();
        thread::spawn(move || {
            let mut guard = handle.write().unwrap();
            *guard = samples("REMOTE", 5);
        })
        .join()
        .unwrap();

        assert_eq!(selector.sample_count(), 5);
        let query = vec![0.0; FEATURE_LEN];
        match selector.classify_vector(&query) {
            Selection::Candidate { candidate, .. } => assert_eq!(candidate.label, "REMOTE"),
            other => panic!("expected candidate, got {:?}", other),
        }
    }

    #[test]
    fn test_motion_override_flagged() {
        let mut selector = ModelSelector::new(&Config::default());
        let hand = HandBuilder::fist().extend(Finger::Pinky).build();

        let mut last = None;
        for i in 0..8 {
            let moved = crate::detection::test_hands::shifted(&hand, 0.03 * i as f64, 0.0);
            last = Some(selector.classify(&moved));
        }
        match last.unwrap() {
            Selection::Candidate { candidate, motion_override } => {
                assert_eq!(candidate.label, "J");
                assert!(motion_override);
            }
            other => panic!("expected candidate, got {:?}", other),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("neighbor".parse::<ClassifierMode>(), Ok(ClassifierMode::Neighbor));
        assert_eq!("Geometric".parse::<ClassifierMode>(), Ok(ClassifierMode::Geometric));
        assert!("svm".parse::<ClassifierMode>().is_err());
    }
}
