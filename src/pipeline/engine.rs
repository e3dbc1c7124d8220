// src/pipeline/engine.rs
//
// Per-frame entry point. One call to `feed` fully classifies a frame and
// folds it into the stabilizer before the next frame is accepted.

use super::event_bus::{EventBus, RecognitionEvent};
use super::metrics::EngineMetrics;
use crate::analysis::{
    ClassifierMode, LockTransition, ModelSelector, Selection, SharedTrainingSet, Stabilizer,
    StabilizerPhase,
};
use crate::detection::{FeatureVector, TrainingSample, LANDMARK_COUNT};
use crate::types::{Classification, Config, EngineStatus, HandFrame};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct RecognitionEngine {
    selector: ModelSelector,
    stabilizer: Stabilizer,
    events: EventBus,
    metrics: EngineMetrics,
    last_timestamp_ms: Option<f64>,
    last: Classification,
}

impl RecognitionEngine {
    pub fn new(config: &Config) -> Self {
        Self::from_selector(config, ModelSelector::new(config))
    }

    /// Engine reading from a training set shared with other owners.
    pub fn with_training_set(config: &Config, training: SharedTrainingSet) -> Self {
        Self::from_selector(config, ModelSelector::with_training_set(config, training))
    }

    fn from_selector(config: &Config, selector: ModelSelector) -> Self {
        let mode = selector.mode();
        Self {
            selector,
            stabilizer: Stabilizer::new(config.stabilizer.clone()),
            events: EventBus::new(config.engine.event_capacity),
            metrics: EngineMetrics::new(),
            last_timestamp_ms: None,
            last: Classification::idle(mode),
        }
    }

    pub fn feed(&mut self, frame: &HandFrame) -> Classification {
        self.metrics.inc(&self.metrics.total_frames);

        if let Some(prev) = self.last_timestamp_ms {
            if frame.timestamp_ms < prev {
                warn!(
                    "Frame timestamp went backwards ({:.1}ms < {:.1}ms)",
                    frame.timestamp_ms, prev
                );
            }
        }
        self.last_timestamp_ms = Some(frame.timestamp_ms);

        if !frame.has_hand() {
            self.hand_lost(frame.timestamp_ms);
            return self.last.clone();
        }

        let count = frame.landmarks.len();
        if count != LANDMARK_COUNT {
            warn!(
                "Skipping frame at {:.1}ms: expected {} landmarks, got {}",
                frame.timestamp_ms, LANDMARK_COUNT, count
            );
            self.metrics.inc(&self.metrics.invalid_frames);
            let mut skipped = self.last.clone();
            skipped.status = EngineStatus::InvalidLandmarks { count };
            return skipped;
        }

        self.metrics.inc(&self.metrics.frames_with_hand);

        let started = Instant::now();
        let selection = self.selector.classify(&frame.landmarks);
        self.metrics.set_timing(
            &self.metrics.classify_time_us,
            started.elapsed().as_micros() as u64,
        );

        let (candidate, status) = match selection {
            Selection::Candidate {
                candidate,
                motion_override,
            } => {
                self.metrics.inc(&self.metrics.candidates);
                if motion_override {
                    self.metrics.inc(&self.metrics.motion_overrides);
                }
                debug!(
                    "Candidate '{}' ({:.1}%) at {:.1}ms",
                    candidate.label, candidate.raw_confidence, frame.timestamp_ms
                );
                (Some(candidate), EngineStatus::Ready)
            }
            Selection::InsufficientSamples { have, need } => {
                self.metrics.inc(&self.metrics.neighbor_abstentions);
                (None, EngineStatus::InsufficientTrainingData { have, need })
            }
            Selection::NoCandidate => (None, EngineStatus::NoCandidate),
        };

        let output = self
            .stabilizer
            .update(candidate.as_ref(), frame.timestamp_ms);

        match output.transition {
            Some(LockTransition::Acquired { ref label }) => {
                self.metrics.inc(&self.metrics.locks);
                self.events.publish(RecognitionEvent::Locked {
                    label: label.clone(),
                    confidence: output.confidence,
                    timestamp_ms: frame.timestamp_ms,
                });
            }
            Some(LockTransition::Replaced { ref from, ref to }) => {
                self.metrics.inc(&self.metrics.lock_replacements);
                self.events.publish(RecognitionEvent::LockReplaced {
                    from: from.clone(),
                    to: to.clone(),
                    confidence: output.confidence,
                    timestamp_ms: frame.timestamp_ms,
                });
            }
            None => {}
        }

        self.last = Classification {
            label: output.label,
            confidence: output.confidence,
            locked: output.locked,
            verification_progress: output.verification_progress,
            mode: self.selector.mode(),
            status,
        };
        self.last.clone()
    }

    fn hand_lost(&mut self, timestamp_ms: f64) {
        if !self.stabilizer.is_idle() {
            let held_label = self.stabilizer.state().locked_label().map(str::to_string);
            debug!(
                "Hand lost at {:.1}ms (held {:?}, {} motion samples dropped)",
                timestamp_ms,
                held_label,
                self.selector.motion_samples()
            );
            self.metrics.inc(&self.metrics.hand_lost);
            self.events.publish(RecognitionEvent::HandLost {
                timestamp_ms,
                held_label,
            });
        }
        self.stabilizer.reset();
        self.selector.reset_motion();
        self.last = Classification::idle(self.selector.mode());
    }

    /// Record the frame as a wrist-relative training sample. `None` if the
    /// frame is not a full 21-point hand.
    pub fn capture_sample(&mut self, label: &str, frame: &HandFrame) -> Option<TrainingSample> {
        if frame.landmarks.len() != LANDMARK_COUNT {
            warn!(
                "Cannot capture '{}': expected {} landmarks, got {}",
                label,
                LANDMARK_COUNT,
                frame.landmarks.len()
            );
            return None;
        }

        let sample = TrainingSample::new(
            label,
            FeatureVector::wrist_relative(&frame.landmarks).into_inner(),
        );
        let samples = self.selector.add_samples(std::iter::once(sample.clone()));
        info!("📸 Captured sample '{}' ({} total)", label, samples);
        self.events
            .publish(RecognitionEvent::TrainingSetChanged { samples });
        Some(sample)
    }

    pub fn mode(&self) -> ClassifierMode {
        self.selector.mode()
    }

    /// Switching classifiers also clears the stabilizer: labels from the
    /// two branches do not vote together.
    pub fn set_mode(&mut self, mode: ClassifierMode) {
        let from = self.selector.mode();
        if self.selector.set_mode(mode) {
            self.stabilizer.reset();
            self.last = Classification::idle(mode);
            self.events
                .publish(RecognitionEvent::ModeChanged { from, to: mode });
        }
    }

    /// Replace the training set. In neighbor mode the stabilizer is cleared
    /// too: the window holds labels voted from the old samples.
    pub fn load_training_set(&mut self, samples: Vec<TrainingSample>) {
        let samples_len = samples.len();
        self.selector.load_training_set(samples);
        if self.selector.mode() == ClassifierMode::Neighbor {
            self.stabilizer.reset();
            self.last = Classification::idle(ClassifierMode::Neighbor);
        }
        self.events.publish(RecognitionEvent::TrainingSetChanged {
            samples: samples_len,
        });
    }

    pub fn add_samples(&mut self, samples: Vec<TrainingSample>) -> usize {
        let total = self.selector.add_samples(samples);
        self.events
            .publish(RecognitionEvent::TrainingSetChanged { samples: total });
        total
    }

    /// Empty the training set; the engine falls back to geometric mode.
    pub fn clear_training(&mut self) {
        let from = self.selector.mode();
        self.selector.clear();
        self.events
            .publish(RecognitionEvent::TrainingSetChanged { samples: 0 });
        if from != ClassifierMode::Geometric {
            self.stabilizer.reset();
            self.last = Classification::idle(ClassifierMode::Geometric);
            self.events.publish(RecognitionEvent::ModeChanged {
                from,
                to: ClassifierMode::Geometric,
            });
        }
    }

    pub fn sample_count(&self) -> usize {
        self.selector.sample_count()
    }

    pub fn samples(&self) -> Vec<TrainingSample> {
        self.selector.samples()
    }

    pub fn training_set(&self) -> SharedTrainingSet {
        self.selector.training_set()
    }

    pub fn phase(&self) -> StabilizerPhase {
        match self.last_timestamp_ms {
            Some(now) => self.stabilizer.phase(now),
            None => StabilizerPhase::Idle,
        }
    }

    pub fn drain_events(&mut self) -> Vec<RecognitionEvent> {
        self.events.drain()
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }
}
