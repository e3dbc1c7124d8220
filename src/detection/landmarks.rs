// src/detection/landmarks.rs
//
// Hand skeleton layout (21 points) and the flat feature encoding used
// by the neighbor classifier and the training set.

use crate::types::Landmark;

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const LANDMARK_COUNT: usize = 21;
pub const FEATURE_LEN: usize = LANDMARK_COUNT * 3;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// The four non-thumb fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn mcp(&self) -> usize {
        match self {
            Self::Index => INDEX_MCP,
            Self::Middle => MIDDLE_MCP,
            Self::Ring => RING_MCP,
            Self::Pinky => PINKY_MCP,
        }
    }

    pub fn pip(&self) -> usize {
        self.mcp() + 1
    }

    pub fn tip(&self) -> usize {
        self.mcp() + 3
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Flattened `[x0, y0, z0, x1, y1, z1, ...]` encoding of a hand pose.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Raw image-space coordinates.
    pub fn raw(landmarks: &[Landmark]) -> Self {
        Self(
            landmarks
                .iter()
                .flat_map(|l| [l.x, l.y, l.z])
                .collect(),
        )
    }

    /// Coordinates translated so the wrist sits at the origin. Falls back to
    /// the raw encoding for an empty slice.
    pub fn wrist_relative(landmarks: &[Landmark]) -> Self {
        let Some(wrist) = landmarks.get(WRIST).copied() else {
            return Self::raw(landmarks);
        };
        Self(
            landmarks
                .iter()
                .flat_map(|l| [l.x - wrist.x, l.y - wrist.y, l.z - wrist.z])
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
