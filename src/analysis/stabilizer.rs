// src/analysis/stabilizer.rs
//
// Turns noisy per-frame candidates into a stable decision: a sliding
// window of recent labels, a modal vote over it, and a lock that can only
// be replaced once its hysteresis delay has run out.
//
//   Idle ──candidate──▶ Accumulating ──freq/conf met──▶ Locked
//    ▲                      ▲                             │
//    │                      └──── hysteresis elapsed ─────┘
//    └──────────────── hand lost (reset) ◀──────────────── any

use crate::detection::GestureCandidate;
use crate::types::{DropoutPolicy, StabilizerConfig};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::info;

const RAW_WEIGHT: f64 = 0.4;
const FREQUENCY_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilizerPhase {
    Idle,
    Accumulating,
    /// Lock held and still inside its hysteresis delay.
    Locked,
}

impl StabilizerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Accumulating => "ACCUMULATING",
            Self::Locked => "LOCKED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HeldLock {
    label: String,
    locked_at_ms: f64,
}

/// Everything the stabilizer remembers between frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StabilizerState {
    window: VecDeque<String>,
    last_raw_confidence: f64,
    lock: Option<HeldLock>,
}

impl StabilizerState {
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn locked_label(&self) -> Option<&str> {
        self.lock.as_ref().map(|l| l.label.as_str())
    }

    pub fn locked_at_ms(&self) -> Option<f64> {
        self.lock.as_ref().map(|l| l.locked_at_ms)
    }

    /// Most frequent label and its count. Ties go to the most recent label.
    pub fn modal_label(&self) -> Option<(&str, usize)> {
        // (label, count, index of latest occurrence)
        let mut tally: Vec<(&str, usize, usize)> = Vec::new();
        for (i, label) in self.window.iter().enumerate() {
            match tally.iter_mut().find(|(l, _, _)| *l == label.as_str()) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 = i;
                }
                None => tally.push((label.as_str(), 1, i)),
            }
        }
        tally
            .into_iter()
            .max_by_key(|(_, count, latest)| (*count, *latest))
            .map(|(label, count, _)| (label, count))
    }

    pub(crate) fn phase(&self, now_ms: f64, hysteresis_ms: f64) -> StabilizerPhase {
        match &self.lock {
            Some(lock) if now_ms - lock.locked_at_ms < hysteresis_ms => StabilizerPhase::Locked,
            Some(_) => StabilizerPhase::Accumulating,
            None if self.window.is_empty() => StabilizerPhase::Idle,
            None => StabilizerPhase::Accumulating,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LockTransition {
    Acquired { label: String },
    Replaced { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StabilizerOutput {
    /// Locked label if one is held, otherwise the current modal label.
    pub label: Option<String>,
    /// Combined confidence of the modal label. While a lock is held inside
    /// its hysteresis delay this can describe a different label than `label`.
    pub confidence: f64,
    pub locked: bool,
    /// Progress of the modal label towards `required_frames`.
    pub verification_progress: f64,
    pub phase: StabilizerPhase,
    /// Set on the frame a lock is taken or replaced.
    pub transition: Option<LockTransition>,
}

/// One stabilizer transition. `candidate == None` means a hand was visible
/// but nothing was classified; hand loss is `StabilizerState::default()`.
pub fn step(
    mut state: StabilizerState,
    candidate: Option<&GestureCandidate>,
    now_ms: f64,
    config: &StabilizerConfig,
) -> (StabilizerState, StabilizerOutput) {
    let window_size = config.window_size.max(1);
    // More than the window can hold would never lock.
    let required_frames = config.required_frames.clamp(1, window_size);

    match candidate {
        Some(c) => {
            state.window.push_back(c.label.clone());
            while state.window.len() > window_size {
                state.window.pop_front();
            }
            state.last_raw_confidence = c.raw_confidence;
        }
        None => {
            if config.dropout_policy == DropoutPolicy::Shrink {
                state.window.pop_front();
            }
        }
    }

    let (modal, frequency) = match state.modal_label() {
        Some((label, count)) => (Some(label.to_string()), count),
        None => (None, 0),
    };

    let confidence = if frequency == 0 {
        0.0
    } else {
        let share = frequency as f64 / window_size as f64 * 100.0;
        (state.last_raw_confidence * RAW_WEIGHT + share * FREQUENCY_WEIGHT).min(100.0)
    };
    let verification_progress = (frequency as f64 / required_frames as f64 * 100.0).min(100.0);

    // Locks are only decided on frames that carried a candidate.
    let mut transition = None;
    if let (Some(_), Some(label)) = (candidate, modal.as_ref()) {
        if frequency >= required_frames && confidence > config.lock_confidence {
            match state.lock.take() {
                None => {
                    transition = Some(LockTransition::Acquired {
                        label: label.clone(),
                    });
                    state.lock = Some(HeldLock {
                        label: label.clone(),
                        locked_at_ms: now_ms,
                    });
                }
                Some(held)
                    if held.label != *label
                        && now_ms - held.locked_at_ms >= config.hysteresis_ms =>
                {
                    transition = Some(LockTransition::Replaced {
                        from: held.label,
                        to: label.clone(),
                    });
                    state.lock = Some(HeldLock {
                        label: label.clone(),
                        locked_at_ms: now_ms,
                    });
                }
                held => state.lock = held,
            }
        }
    }

    let phase = state.phase(now_ms, config.hysteresis_ms);
    let output = StabilizerOutput {
        label: state.locked_label().map(str::to_string).or(modal),
        confidence,
        locked: state.lock.is_some(),
        verification_progress,
        phase,
        transition,
    };

    (state, output)
}

/// Owns a `StabilizerState` and threads it through `step`.
pub struct Stabilizer {
    config: StabilizerConfig,
    state: StabilizerState,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            state: StabilizerState::default(),
        }
    }

    pub fn update(&mut self, candidate: Option<&GestureCandidate>, now_ms: f64) -> StabilizerOutput {
        let state = std::mem::take(&mut self.state);
        let (state, output) = step(state, candidate, now_ms, &self.config);
        self.state = state;

        match &output.transition {
            Some(LockTransition::Acquired { label }) => {
                info!(
                    "🔒 Locked '{}' (confidence {:.1}%) at {:.0}ms",
                    label, output.confidence, now_ms
                );
            }
            Some(LockTransition::Replaced { from, to }) => {
                info!("🔁 Lock replaced '{}' → '{}' at {:.0}ms", from, to, now_ms);
            }
            None => {}
        }

        output
    }

    /// Hand lost: clear the window and any lock.
    pub fn reset(&mut self) {
        self.state = StabilizerState::default();
    }

    pub fn state(&self) -> &StabilizerState {
        &self.state
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    pub fn phase(&self, now_ms: f64) -> StabilizerPhase {
        self.state.phase(now_ms, self.config.hysteresis_ms)
    }

    pub fn is_idle(&self) -> bool {
        self.state.window.is_empty() && self.state.lock.is_none()
    }
}
