// src/pipeline/event_bus.rs
//
// Decision events for whoever sits downstream (UI, speech output, replay
// log). The engine publishes; consumers drain between frames.

use crate::analysis::ClassifierMode;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    Locked {
        label: String,
        confidence: f64,
        timestamp_ms: f64,
    },

    LockReplaced {
        from: String,
        to: String,
        confidence: f64,
        timestamp_ms: f64,
    },

    HandLost {
        timestamp_ms: f64,
        /// Label that was locked when the hand disappeared.
        held_label: Option<String>,
    },

    ModeChanged {
        from: ClassifierMode,
        to: ClassifierMode,
    },

    TrainingSetChanged {
        samples: usize,
    },
}

impl RecognitionEvent {
    /// Label newly committed by this event, if any.
    pub fn committed_label(&self) -> Option<&str> {
        match self {
            Self::Locked { label, .. } => Some(label),
            Self::LockReplaced { to, .. } => Some(to),
            _ => None,
        }
    }
}

pub struct EventBus {
    events: VecDeque<RecognitionEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        let max_pending = max_pending.max(1);
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: RecognitionEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<RecognitionEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}
