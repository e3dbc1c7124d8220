// src/detection/test_hands.rs
//
// Synthetic hand poses for tests. Canonical right hand seen from the
// camera: wrist at the bottom, fingers pointing up (negative y), index
// MCP left of the pinky MCP. Wrist → middle MCP is 0.2 image units.

use super::landmarks::{Finger, LANDMARK_COUNT, THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST};
use crate::types::Landmark;

const MCPS: [(Finger, f64, f64); 4] = [
    (Finger::Index, 0.44, 0.61),
    (Finger::Middle, 0.50, 0.60),
    (Finger::Ring, 0.56, 0.61),
    (Finger::Pinky, 0.61, 0.63),
];

const THUMB_OUT: (f64, f64) = (0.32, 0.60);
const THUMB_BESIDE_INDEX: (f64, f64) = (0.41, 0.62);

pub(crate) struct HandBuilder {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandBuilder {
    fn base() -> Self {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(0.5, 0.8, 0.0);
        points[THUMB_CMC] = Landmark::new(0.45, 0.75, 0.0);
        points[THUMB_MCP] = Landmark::new(0.40, 0.70, 0.0);
        points[THUMB_IP] = Landmark::new(0.36, 0.65, 0.0);
        for (finger, x, y) in MCPS {
            points[finger.mcp()] = Landmark::new(x, y, 0.0);
        }
        Self { points }
    }

    /// All four fingers extended, thumb out to the side.
    pub fn open_palm() -> Self {
        Finger::ALL
            .iter()
            .fold(Self::base(), |hand, f| hand.extend(*f))
            .thumb_out()
    }

    /// All four fingers curled, thumb resting beside the index.
    pub fn fist() -> Self {
        Finger::ALL
            .iter()
            .fold(Self::base(), |hand, f| hand.curl(*f))
            .thumb_tip(THUMB_BESIDE_INDEX.0, THUMB_BESIDE_INDEX.1)
    }

    pub fn extend(mut self, finger: Finger) -> Self {
        let mcp = self.points[finger.mcp()];
        self.points[finger.mcp() + 1] = Landmark::new(mcp.x, mcp.y - 0.06, 0.0);
        self.points[finger.mcp() + 2] = Landmark::new(mcp.x, mcp.y - 0.11, 0.0);
        self.points[finger.mcp() + 3] = Landmark::new(mcp.x, mcp.y - 0.15, 0.0);
        self
    }

    pub fn curl(mut self, finger: Finger) -> Self {
        let mcp = self.points[finger.mcp()];
        self.points[finger.mcp() + 1] = Landmark::new(mcp.x, mcp.y - 0.05, 0.0);
        self.points[finger.mcp() + 2] = Landmark::new(mcp.x, mcp.y - 0.01, 0.0);
        self.points[finger.mcp() + 3] = Landmark::new(mcp.x, mcp.y + 0.03, 0.0);
        self
    }

    pub fn pip(mut self, finger: Finger, x: f64, y: f64) -> Self {
        self.points[finger.pip()] = Landmark::new(x, y, 0.0);
        self
    }

    pub fn tip(mut self, finger: Finger, x: f64, y: f64) -> Self {
        self.points[finger.tip()] = Landmark::new(x, y, 0.0);
        self
    }

    pub fn thumb_out(self) -> Self {
        self.thumb_tip(THUMB_OUT.0, THUMB_OUT.1)
    }

    pub fn thumb_tip(mut self, x: f64, y: f64) -> Self {
        self.points[THUMB_TIP] = Landmark::new(x, y, 0.0);
        self
    }

    pub fn build(self) -> Vec<Landmark> {
        self.points.to_vec()
    }
}

/// Uniformly scale a hand about its wrist.
pub(crate) fn scaled_about_wrist(landmarks: &[Landmark], k: f64) -> Vec<Landmark> {
    let wrist = landmarks[WRIST];
    landmarks
        .iter()
        .map(|l| {
            Landmark::new(
                wrist.x + (l.x - wrist.x) * k,
                wrist.y + (l.y - wrist.y) * k,
                wrist.z + (l.z - wrist.z) * k,
            )
        })
        .collect()
}

/// Flip horizontally (the other hand, or a mirrored camera).
pub(crate) fn mirrored(landmarks: &[Landmark]) -> Vec<Landmark> {
    landmarks
        .iter()
        .map(|l| Landmark::new(1.0 - l.x, l.y, l.z))
        .collect()
}

/// Translate every landmark by `(dx, dy)`.
pub(crate) fn shifted(landmarks: &[Landmark], dx: f64, dy: f64) -> Vec<Landmark> {
    landmarks
        .iter()
        .map(|l| Landmark::new(l.x + dx, l.y + dy, l.z))
        .collect()
}
