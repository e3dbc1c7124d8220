// src/detection/mod.rs

mod geometric;
mod landmarks;
mod motion;
mod neighbor;
mod normalizer;

#[cfg(test)]
pub(crate) mod test_hands;

// Re-export public APIs
pub use geometric::{FingerStates, GeometricClassifier, Rule, RuleOutcome, Sign};
pub use landmarks::*;
pub use motion::{motion_variant, MotionOverride};
pub use neighbor::{
    euclidean_distance, nearest_vote, nearest_vote_with, GestureCandidate, NeighborClassifier,
    NeighborOutcome, TrainingSample, NEIGHBOR_K,
};
pub use normalizer::{HandScale, NormalizedHand, SCALE_EPSILON, SCALE_FLOOR};
