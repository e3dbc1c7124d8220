// src/analysis/mod.rs
//
// Decision layer on top of the per-frame classifiers.
//
//   21 landmarks → model_selector ─┬─ geometric + motion override ─┐
//                                  └─ neighbor (training set) ─────┴→ stabilizer → decision
//
// training_set handles the on-disk JSON form of the samples.

pub mod model_selector;
pub mod stabilizer;
pub mod training_set;

pub use model_selector::{ClassifierMode, ModelSelector, Selection, SharedTrainingSet};
pub use stabilizer::{
    step, LockTransition, Stabilizer, StabilizerOutput, StabilizerPhase, StabilizerState,
};
pub use training_set::{label_counts, load_training_set, save_training_set};
