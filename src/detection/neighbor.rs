// src/detection/neighbor.rs
//
// Distance-weighted k-nearest-neighbor vote over user-trained samples.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Neighbors consulted per vote. Fixed.
pub const NEIGHBOR_K: usize = 5;

const DEFAULT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub label: String,
    pub vector: Vec<f64>,
}

impl TrainingSample {
    pub fn new(label: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            vector,
        }
    }
}

/// Candidate label with a raw confidence in 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureCandidate {
    pub label: String,
    pub raw_confidence: f64,
}

impl GestureCandidate {
    pub fn new(label: impl Into<String>, raw_confidence: f64) -> Self {
        Self {
            label: label.into(),
            raw_confidence,
        }
    }
}

/// Euclidean distance; vectors of different length are infinitely far apart.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Weighted vote among the `k` nearest samples (or all of them if fewer).
///
/// Neighbors are ordered by `(distance, label)`, so the result does not
/// depend on the order of `samples`. Ties in summed weight go to the label
/// that appears first in that nearest-first order.
pub fn nearest_vote(query: &[f64], samples: &[TrainingSample], k: usize) -> Option<GestureCandidate> {
    nearest_vote_with(query, samples, k, DEFAULT_EPSILON)
}

pub fn nearest_vote_with(
    query: &[f64],
    samples: &[TrainingSample],
    k: usize,
    epsilon: f64,
) -> Option<GestureCandidate> {
    if samples.is_empty() || k == 0 {
        return None;
    }

    let mut ranked: Vec<(f64, &str)> = samples
        .iter()
        .map(|s| (euclidean_distance(query, &s.vector), s.label.as_str()))
        .collect();
    ranked.sort_by(|a, b| match a.0.total_cmp(&b.0) {
        Ordering::Equal => a.1.cmp(b.1),
        other => other,
    });
    ranked.truncate(k);

    // Labels kept in first-seen order for the tie-break.
    let mut votes: Vec<(&str, f64)> = Vec::new();
    let mut total = 0.0;
    for &(distance, label) in &ranked {
        let weight = 1.0 / (distance + epsilon);
        total += weight;
        match votes.iter_mut().find(|(l, _)| *l == label) {
            Some((_, w)) => *w += weight,
            None => votes.push((label, weight)),
        }
    }

    if !(total > 0.0) {
        return None;
    }

    let mut best: Option<(&str, f64)> = None;
    for (label, weight) in votes {
        match best {
            Some((_, w)) if weight <= w => {}
            _ => best = Some((label, weight)),
        }
    }

    best.map(|(label, weight)| {
        GestureCandidate::new(label, (weight / total * 100.0).min(100.0))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum NeighborOutcome {
    Candidate(GestureCandidate),
    /// Fewer training samples than `k`.
    InsufficientSamples { have: usize, need: usize },
    /// Enough samples, but none comparable to the query.
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct NeighborClassifier {
    k: usize,
    epsilon: f64,
}

impl NeighborClassifier {
    pub fn new(epsilon: f64) -> Self {
        Self {
            k: NEIGHBOR_K,
            epsilon,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn classify(&self, query: &[f64], samples: &[TrainingSample]) -> NeighborOutcome {
        if samples.len() < self.k {
            return NeighborOutcome::InsufficientSamples {
                have: samples.len(),
                need: self.k,
            };
        }
        match nearest_vote_with(query, samples, self.k, self.epsilon) {
            Some(candidate) => NeighborOutcome::Candidate(candidate),
            None => NeighborOutcome::NoMatch,
        }
    }
}

impl Default for NeighborClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(label: &str, v: &[f64]) -> TrainingSample {
        TrainingSample::new(label, v.to_vec())
    }

    #[test]
    fn test_documented_example() {
        let samples = vec![
            sample("A", &[0.0, 0.0, 0.0]),
            sample("A", &[0.0, 0.0, 0.0]),
            sample("B", &[10.0, 10.0, 10.0]),
        ];
        let result = nearest_vote(&[0.0, 0.0, 0.0], &samples, 5).unwrap();
        assert_eq!(result.label, "A");
        assert!(result.raw_confidence > 99.99);
        assert!(result.raw_confidence <= 100.0);
    }

    #[test]
    fn test_length_mismatch_is_infinite() {
        assert_eq!(euclidean_distance(&[1.0, 2.0], &[1.0]), f64::INFINITY);
        assert_eq!(euclidean_distance(&[3.0, 4.0], &[0.0, 0.0]), 5.0);
    }

    #[test]
    fn test_mismatched_samples_never_win() {
        let samples = vec![
            sample("short", &[0.0]),
            sample("short", &[0.0]),
            sample("short", &[0.0]),
            sample("far", &[50.0, 50.0]),
        ];
        let result = nearest_vote(&[0.0, 0.0], &samples, 5).unwrap();
        assert_eq!(result.label, "far");
        assert!((result.raw_confidence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_mismatched_is_none() {
        let samples = vec![sample("x", &[0.0]), sample("y", &[1.0])];
        assert!(nearest_vote(&[0.0, 0.0, 0.0], &samples, 5).is_none());
    }

    #[test]
    fn test_only_k_nearest_vote() {
        // Five close "A" samples outvote any number of distant "B" samples.
        let mut samples: Vec<_> = (0..5).map(|i| sample("A", &[i as f64 * 0.1])).collect();
        samples.extend((0..20).map(|_| sample("B", &[100.0])));
        let result = nearest_vote(&[0.0], &samples, NEIGHBOR_K).unwrap();
        assert_eq!(result.label, "A");
        assert!((result.raw_confidence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_reordering_samples_does_not_change_result() {
        let samples = vec![
            sample("A", &[1.0, 0.0]),
            sample("B", &[0.0, 1.0]),
            sample("A", &[2.0, 0.0]),
            sample("B", &[0.0, 2.0]),
            sample("C", &[1.0, 1.0]),
            sample("C", &[-1.0, 0.0]),
        ];
        let query = [0.0, 0.0];
        let expected = nearest_vote(&query, &samples, 5);

        let mut reversed = samples.clone();
        reversed.reverse();
        assert_eq!(nearest_vote(&query, &reversed, 5), expected);

        let mut rotated = samples.clone();
        rotated.rotate_left(2);
        assert_eq!(nearest_vote(&query, &rotated, 5), expected);
    }

    #[test]
    fn test_weight_tie_goes_to_first_enumerated_label() {
        // Equidistant: sorted by label, so "A" is enumerated first.
        let samples = vec![sample("B", &[0.0, 1.0]), sample("A", &[1.0, 0.0])];
        let result = nearest_vote(&[0.0, 0.0], &samples, 5).unwrap();
        assert_eq!(result.label, "A");
        assert!((result.raw_confidence - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_classifier_requires_k_samples() {
        let classifier = NeighborClassifier::default();
        let samples: Vec<_> = (0..4).map(|_| sample("A", &[0.0])).collect();
        assert_eq!(
            classifier.classify(&[0.0], &samples),
            NeighborOutcome::InsufficientSamples { have: 4, need: 5 }
        );

        let mut samples = samples;
        samples.push(sample("A", &[0.0]));
        match classifier.classify(&[0.0], &samples) {
            NeighborOutcome::Candidate(c) => assert_eq!(c.label, "A"),
            other => panic!("expected candidate, got {:?}", other),
        }
    }
}
