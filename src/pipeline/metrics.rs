// src/pipeline/metrics.rs
//
// Counters for the recognition loop. Cheap to clone; clones share the
// same atomics so a reporter thread can read while the engine runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct EngineMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub frames_with_hand: Arc<AtomicU64>,
    pub invalid_frames: Arc<AtomicU64>,
    pub hand_lost: Arc<AtomicU64>,
    pub candidates: Arc<AtomicU64>,
    pub locks: Arc<AtomicU64>,
    pub lock_replacements: Arc<AtomicU64>,
    pub motion_overrides: Arc<AtomicU64>,
    pub neighbor_abstentions: Arc<AtomicU64>,
    pub classify_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_with_hand: Arc::new(AtomicU64::new(0)),
            invalid_frames: Arc::new(AtomicU64::new(0)),
            hand_lost: Arc::new(AtomicU64::new(0)),
            candidates: Arc::new(AtomicU64::new(0)),
            locks: Arc::new(AtomicU64::new(0)),
            lock_replacements: Arc::new(AtomicU64::new(0)),
            motion_overrides: Arc::new(AtomicU64::new(0)),
            neighbor_abstentions: Arc::new(AtomicU64::new(0)),
            classify_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            fps: self.fps(),
            frames_with_hand: self.frames_with_hand.load(Ordering::Relaxed),
            invalid_frames: self.invalid_frames.load(Ordering::Relaxed),
            hand_lost: self.hand_lost.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            locks: self.locks.load(Ordering::Relaxed),
            lock_replacements: self.lock_replacements.load(Ordering::Relaxed),
            motion_overrides: self.motion_overrides.load(Ordering::Relaxed),
            neighbor_abstentions: self.neighbor_abstentions.load(Ordering::Relaxed),
            last_classify_us: self.classify_time_us.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub frames_with_hand: u64,
    pub invalid_frames: u64,
    pub hand_lost: u64,
    pub candidates: u64,
    pub locks: u64,
    pub lock_replacements: u64,
    pub motion_overrides: u64,
    pub neighbor_abstentions: u64,
    pub last_classify_us: u64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counters() {
        let metrics = EngineMetrics::new();
        let reporter = metrics.clone();

        metrics.inc(&metrics.total_frames);
        metrics.inc(&metrics.total_frames);
        metrics.inc(&metrics.locks);

        let summary = reporter.summary();
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.locks, 1);
        assert_eq!(summary.hand_lost, 0);
    }
}
