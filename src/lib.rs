// src/lib.rs
//
// Sign recognition over 21-point hand landmarks: per-frame classifiers
// (geometric rules with a motion override, or k-NN over trained samples)
// feeding a stabilizer that turns noisy guesses into locked decisions.

pub mod analysis;
pub mod config;
pub mod detection;
pub mod pipeline;
pub mod types;

pub use analysis::{ClassifierMode, ModelSelector, Stabilizer, StabilizerPhase};
pub use detection::{GeometricClassifier, GestureCandidate, Sign, TrainingSample};
pub use pipeline::{RecognitionEngine, RecognitionEvent, SessionReplayer};
pub use types::{Classification, Config, EngineStatus, HandFrame, Landmark};
