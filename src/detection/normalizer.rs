// src/detection/normalizer.rs
//
// Scale reference for a single frame. Every geometric threshold is a
// ratio of distances divided by this scale, so a hand close to the
// camera and one far away produce the same measurements.

use super::landmarks::{MIDDLE_MCP, WRIST};
use crate::types::Landmark;
use tracing::debug;

/// Below this the wrist→middle-MCP distance is treated as degenerate.
pub const SCALE_EPSILON: f64 = 1e-6;

/// Substituted for a degenerate scale.
pub const SCALE_FLOOR: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandScale {
    value: f64,
    degenerate: bool,
}

impl HandScale {
    /// Expects a full 21-point hand; callers validate the count first.
    pub fn from_landmarks(landmarks: &[Landmark]) -> Self {
        let raw = match (landmarks.get(WRIST), landmarks.get(MIDDLE_MCP)) {
            (Some(wrist), Some(mcp)) => wrist.distance(mcp),
            _ => 0.0,
        };

        if raw < SCALE_EPSILON || !raw.is_finite() {
            debug!(
                "Degenerate hand scale {:.2e}, substituting floor {:.0e}",
                raw, SCALE_FLOOR
            );
            Self {
                value: SCALE_FLOOR,
                degenerate: true,
            }
        } else {
            Self {
                value: raw,
                degenerate: false,
            }
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn normalized_distance(&self, p1: &Landmark, p2: &Landmark) -> f64 {
        p1.distance(p2) / self.value
    }

    /// Signed `to.x - from.x` in scale units.
    pub fn normalized_dx(&self, from: &Landmark, to: &Landmark) -> f64 {
        (to.x - from.x) / self.value
    }

    /// Signed `to.y - from.y` in scale units (positive = lower in the image).
    pub fn normalized_dy(&self, from: &Landmark, to: &Landmark) -> f64 {
        (to.y - from.y) / self.value
    }
}

/// Borrowed view of one frame's landmarks together with its scale.
pub struct NormalizedHand<'a> {
    landmarks: &'a [Landmark],
    scale: HandScale,
}

impl<'a> NormalizedHand<'a> {
    pub fn new(landmarks: &'a [Landmark]) -> Self {
        Self {
            landmarks,
            scale: HandScale::from_landmarks(landmarks),
        }
    }

    pub fn scale(&self) -> HandScale {
        self.scale
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks.get(index).copied().unwrap_or_default()
    }

    /// Distance between two landmark indices in scale units.
    pub fn dist(&self, a: usize, b: usize) -> f64 {
        self.scale
            .normalized_distance(&self.point(a), &self.point(b))
    }

    pub fn dx(&self, from: usize, to: usize) -> f64 {
        self.scale.normalized_dx(&self.point(from), &self.point(to))
    }

    pub fn dy(&self, from: usize, to: usize) -> f64 {
        self.scale.normalized_dy(&self.point(from), &self.point(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::landmarks::{INDEX_TIP, LANDMARK_COUNT};

    fn hand_with(wrist: Landmark, mcp: Landmark) -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
        landmarks[WRIST] = wrist;
        landmarks[MIDDLE_MCP] = mcp;
        landmarks
    }

    #[test]
    fn test_scale_is_wrist_to_middle_mcp() {
        let landmarks = hand_with(Landmark::new(0.5, 0.8, 0.0), Landmark::new(0.5, 0.6, 0.0));
        let scale = HandScale::from_landmarks(&landmarks);
        assert!((scale.value() - 0.2).abs() < 1e-12);
        assert!(!scale.is_degenerate());
    }

    #[test]
    fn test_degenerate_scale_uses_floor() {
        let p = Landmark::new(0.4, 0.4, 0.0);
        let landmarks = hand_with(p, p);
        let scale = HandScale::from_landmarks(&landmarks);
        assert!(scale.is_degenerate());
        assert_eq!(scale.value(), SCALE_FLOOR);

        let d = scale.normalized_distance(&p, &Landmark::new(0.4, 0.401, 0.0));
        assert!(d.is_finite());
        assert!((d - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_distance_is_scale_invariant() {
        let near = hand_with(Landmark::new(0.5, 0.8, 0.0), Landmark::new(0.5, 0.6, 0.0));
        let far = hand_with(Landmark::new(0.5, 0.8, 0.0), Landmark::new(0.5, 0.7, 0.0));

        let mut near = near;
        let mut far = far;
        near[INDEX_TIP] = Landmark::new(0.5, 0.4, 0.0);
        far[INDEX_TIP] = Landmark::new(0.5, 0.6, 0.0);

        let a = NormalizedHand::new(&near).dist(WRIST, INDEX_TIP);
        let b = NormalizedHand::new(&far).dist(WRIST, INDEX_TIP);
        assert!((a - 2.0).abs() < 1e-9);
        assert!((a - b).abs() < 1e-9);
    }
}
