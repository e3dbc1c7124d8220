// src/detection/geometric.rs
//
// Hierarchical geometric sign classifier.
//
// 1. Per-finger extension state from scale-normalized distances.
// 2. Count extended non-thumb fingers (0-4) and pick the matching bucket.
// 3. Walk the bucket's rule table in order; the first predicate that
//    holds decides the sign.
//
// Several loose geometric tests can hold for one pose at the same time,
// so the order inside each table is part of the classifier's behavior.
// Do not reorder rules to "fix" a single misclassification.

use super::landmarks::{
    Finger, INDEX_MCP, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_MCP, MIDDLE_PIP,
    MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};
use super::normalizer::NormalizedHand;
use crate::types::{GeometryConfig, Landmark};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// SIGNS
// ============================================================================

/// Signs the geometric classifier can produce, including the motion
/// variants produced by the override stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sign {
    A,
    B,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    One,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    ILoveYou,
}

impl Sign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::H => "H",
            Self::I => "I",
            Self::J => "J",
            Self::K => "K",
            Self::L => "L",
            Self::M => "M",
            Self::N => "N",
            Self::R => "R",
            Self::S => "S",
            Self::T => "T",
            Self::U => "U",
            Self::V => "V",
            Self::W => "W",
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::One => "1",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::ILoveYou => "ILY",
        }
    }
}

// ============================================================================
// FINGER STATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    /// Index, middle, ring, pinky.
    pub extended: [bool; 4],
    pub thumb: bool,
}

impl FingerStates {
    pub fn measure(hand: &NormalizedHand<'_>, config: &GeometryConfig) -> Self {
        let mut extended = [false; 4];
        for (slot, finger) in extended.iter_mut().zip(Finger::ALL) {
            let tip = hand.dist(WRIST, finger.tip());
            let pip = hand.dist(WRIST, finger.pip());
            *slot = tip > pip * config.finger_extension_ratio;
        }

        let far_from_palm =
            hand.dist(THUMB_TIP, PINKY_MCP) > hand.dist(THUMB_MCP, PINKY_MCP) * config.thumb_far_ratio;
        let straight =
            hand.dist(THUMB_TIP, THUMB_MCP) > hand.dist(THUMB_IP, THUMB_MCP) * config.thumb_straight_ratio;

        Self {
            extended,
            thumb: far_from_palm && straight,
        }
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.extended[finger as usize]
    }

    pub fn count(&self) -> usize {
        self.extended.iter().filter(|e| **e).count()
    }

    /// True when exactly `fingers` are extended.
    pub fn only(&self, fingers: &[Finger]) -> bool {
        Finger::ALL
            .iter()
            .all(|f| self.is_extended(*f) == fingers.contains(f))
    }
}

// ============================================================================
// RULE TABLES
// ============================================================================

/// Measurements shared by every rule of one frame.
pub struct Pose<'a> {
    hand: NormalizedHand<'a>,
    fingers: FingerStates,
    config: &'a GeometryConfig,
    /// +1 when the pinky MCP lies to the right of the index MCP in the image.
    handedness: f64,
    knuckle_row_y: f64,
}

impl<'a> Pose<'a> {
    fn new(landmarks: &'a [Landmark], config: &'a GeometryConfig) -> Self {
        let hand = NormalizedHand::new(landmarks);
        let fingers = FingerStates::measure(&hand, config);
        let handedness = if hand.point(PINKY_MCP).x >= hand.point(INDEX_MCP).x {
            1.0
        } else {
            -1.0
        };
        let knuckle_row_y = Finger::ALL
            .iter()
            .map(|f| hand.point(f.mcp()).y)
            .sum::<f64>()
            / 4.0;

        Self {
            hand,
            fingers,
            config,
            handedness,
            knuckle_row_y,
        }
    }

    /// Position of a landmark along the index→pinky knuckle direction,
    /// in scale units, with the index MCP at 0.
    fn across(&self, index: usize) -> f64 {
        self.hand.dx(INDEX_MCP, index) * self.handedness
    }

    /// How far below the knuckle row a landmark sits, in scale units.
    fn drop(&self, index: usize) -> f64 {
        (self.hand.point(index).y - self.knuckle_row_y) / self.hand.scale().value()
    }

    fn touching(&self, a: usize, b: usize) -> bool {
        self.hand.dist(a, b) < self.config.thumb_touch_distance
    }

    fn horizontal(&self, finger: Finger) -> bool {
        self.hand.dx(finger.mcp(), finger.tip()).abs() > self.hand.dy(finger.mcp(), finger.tip()).abs()
    }
}

pub struct Rule {
    pub name: &'static str,
    pub sign: Sign,
    pub test: fn(&Pose<'_>) -> bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Match { sign: Sign, rule: &'static str },
    NoMatch,
}

impl RuleOutcome {
    pub fn sign(&self) -> Option<Sign> {
        match self {
            Self::Match { sign, .. } => Some(*sign),
            Self::NoMatch => None,
        }
    }
}

fn evaluate(table: &[Rule], pose: &Pose<'_>) -> RuleOutcome {
    table
        .iter()
        .find(|rule| (rule.test)(pose))
        .map(|rule| RuleOutcome::Match {
            sign: rule.sign,
            rule: rule.name,
        })
        .unwrap_or(RuleOutcome::NoMatch)
}

// ── 4 fingers ─────────────────────────────────────────────

fn thumb_out(p: &Pose<'_>) -> bool {
    p.fingers.thumb
}

fn thumb_at_index_knuckle(p: &Pose<'_>) -> bool {
    p.touching(THUMB_TIP, INDEX_MCP)
}

fn always(_: &Pose<'_>) -> bool {
    true
}

const FOUR_FINGER_RULES: &[Rule] = &[
    Rule { name: "thumb-out", sign: Sign::Five, test: thumb_out },
    Rule { name: "thumb-at-index-knuckle", sign: Sign::Four, test: thumb_at_index_knuckle },
    Rule { name: "flat-hand", sign: Sign::B, test: always },
];

// ── 3 fingers ─────────────────────────────────────────────

fn index_middle_ring(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Index, Finger::Middle, Finger::Ring])
}

fn thumb_on_pinky(p: &Pose<'_>) -> bool {
    index_middle_ring(p) && p.touching(THUMB_TIP, PINKY_TIP)
}

fn index_middle_pinky(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Index, Finger::Middle, Finger::Pinky])
}

fn index_ring_pinky(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Index, Finger::Ring, Finger::Pinky])
}

fn middle_ring_pinky(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Middle, Finger::Ring, Finger::Pinky])
}

const THREE_FINGER_RULES: &[Rule] = &[
    Rule { name: "thumb-on-pinky", sign: Sign::Six, test: thumb_on_pinky },
    Rule { name: "three-up", sign: Sign::W, test: index_middle_ring },
    Rule { name: "ring-down", sign: Sign::Seven, test: index_middle_pinky },
    Rule { name: "middle-down", sign: Sign::Eight, test: index_ring_pinky },
    Rule { name: "index-circle", sign: Sign::F, test: middle_ring_pinky },
];

// ── 2 fingers ─────────────────────────────────────────────

fn index_middle(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Index, Finger::Middle])
}

fn fingers_crossed(p: &Pose<'_>) -> bool {
    if !index_middle(p) {
        return false;
    }
    let knuckles = p.hand.point(INDEX_MCP).x - p.hand.point(MIDDLE_MCP).x;
    let tips = p.hand.point(INDEX_TIP).x - p.hand.point(MIDDLE_TIP).x;
    knuckles * tips < 0.0
}

fn two_with_thumb(p: &Pose<'_>) -> bool {
    index_middle(p) && p.fingers.thumb
}

fn two_horizontal(p: &Pose<'_>) -> bool {
    index_middle(p) && p.horizontal(Finger::Index)
}

fn thumb_between_fingers(p: &Pose<'_>) -> bool {
    index_middle(p) && p.touching(THUMB_TIP, MIDDLE_PIP)
}

fn fingers_spread(p: &Pose<'_>) -> bool {
    index_middle(p)
        && p.hand.dist(INDEX_TIP, MIDDLE_TIP)
            > p.hand.dist(INDEX_MCP, MIDDLE_MCP) * p.config.spread_ratio
}

fn horns_with_thumb(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Index, Finger::Pinky]) && p.fingers.thumb
}

const TWO_FINGER_RULES: &[Rule] = &[
    Rule { name: "crossed", sign: Sign::R, test: fingers_crossed },
    Rule { name: "thumb-out", sign: Sign::Three, test: two_with_thumb },
    Rule { name: "horizontal", sign: Sign::H, test: two_horizontal },
    Rule { name: "thumb-between", sign: Sign::K, test: thumb_between_fingers },
    Rule { name: "spread", sign: Sign::V, test: fingers_spread },
    Rule { name: "adjacent", sign: Sign::U, test: index_middle },
    Rule { name: "horns-thumb-out", sign: Sign::ILoveYou, test: horns_with_thumb },
];

// ── 1 finger ──────────────────────────────────────────────

fn index_only(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Index])
}

fn index_with_thumb(p: &Pose<'_>) -> bool {
    index_only(p) && p.fingers.thumb
}

fn index_horizontal(p: &Pose<'_>) -> bool {
    index_only(p) && p.horizontal(Finger::Index)
}

fn index_thumb_on_middle(p: &Pose<'_>) -> bool {
    index_only(p) && p.touching(THUMB_TIP, MIDDLE_TIP)
}

fn pinky_only(p: &Pose<'_>) -> bool {
    p.fingers.only(&[Finger::Pinky])
}

fn pinky_with_thumb(p: &Pose<'_>) -> bool {
    pinky_only(p) && p.fingers.thumb
}

const ONE_FINGER_RULES: &[Rule] = &[
    Rule { name: "index-thumb-out", sign: Sign::L, test: index_with_thumb },
    Rule { name: "index-horizontal", sign: Sign::G, test: index_horizontal },
    Rule { name: "index-thumb-on-middle", sign: Sign::D, test: index_thumb_on_middle },
    Rule { name: "index-up", sign: Sign::One, test: index_only },
    Rule { name: "pinky-thumb-out", sign: Sign::Y, test: pinky_with_thumb },
    Rule { name: "pinky-up", sign: Sign::I, test: pinky_only },
];

// ── 0 fingers (closed fist) ───────────────────────────────

fn hook(p: &Pose<'_>) -> bool {
    let rise = -p.hand.dy(INDEX_MCP, INDEX_PIP);
    let tip_below_pip = p.hand.point(INDEX_TIP).y > p.hand.point(INDEX_PIP).y;
    rise > p.config.hook_rise && tip_below_pip
}

fn thumb_crossed(p: &Pose<'_>) -> bool {
    p.across(THUMB_TIP) > p.across(MIDDLE_MCP) && p.drop(THUMB_TIP) > p.config.thumb_cross_drop
}

fn thumb_sandwiched(p: &Pose<'_>) -> bool {
    let u = p.across(THUMB_TIP);
    u > 0.0 && u < p.across(MIDDLE_MCP) && p.drop(THUMB_TIP).abs() < p.config.thumb_cross_drop
}

fn thumb_low(p: &Pose<'_>) -> bool {
    p.drop(THUMB_TIP) > p.config.thumb_low_drop
}

fn thumb_past_ring(p: &Pose<'_>) -> bool {
    p.across(THUMB_TIP) > p.across(RING_MCP)
}

fn thumb_past_middle(p: &Pose<'_>) -> bool {
    p.across(THUMB_TIP) > p.across(MIDDLE_MCP)
}

const FIST_RULES: &[Rule] = &[
    Rule { name: "hook", sign: Sign::X, test: hook },
    Rule { name: "thumb-crossed", sign: Sign::S, test: thumb_crossed },
    Rule { name: "thumb-sandwiched", sign: Sign::T, test: thumb_sandwiched },
    Rule { name: "thumb-low", sign: Sign::E, test: thumb_low },
    Rule { name: "thumb-past-ring", sign: Sign::M, test: thumb_past_ring },
    Rule { name: "thumb-past-middle", sign: Sign::N, test: thumb_past_middle },
    Rule { name: "fist", sign: Sign::A, test: always },
];

fn bucket(extended_count: usize) -> &'static [Rule] {
    match extended_count {
        0 => FIST_RULES,
        1 => ONE_FINGER_RULES,
        2 => TWO_FINGER_RULES,
        3 => THREE_FINGER_RULES,
        _ => FOUR_FINGER_RULES,
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeometricClassifier {
    config: GeometryConfig,
}

impl GeometricClassifier {
    pub fn new(config: GeometryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Evaluate the rule table for one frame. Anything other than a full
    /// 21-point hand is `NoMatch`.
    pub fn evaluate(&self, landmarks: &[Landmark]) -> RuleOutcome {
        if landmarks.len() != LANDMARK_COUNT {
            return RuleOutcome::NoMatch;
        }

        let pose = Pose::new(landmarks, &self.config);
        let count = pose.fingers.count();
        let outcome = evaluate(bucket(count), &pose);

        if let RuleOutcome::Match { sign, rule } = outcome {
            debug!(
                "Geometric match {} via '{}' ({} fingers, thumb={})",
                sign.as_str(),
                rule,
                count,
                pose.fingers.thumb
            );
        }
        outcome
    }

    pub fn classify(&self, landmarks: &[Landmark]) -> Option<Sign> {
        self.evaluate(landmarks).sign()
    }

    pub fn finger_states(&self, landmarks: &[Landmark]) -> Option<FingerStates> {
        if landmarks.len() != LANDMARK_COUNT {
            return None;
        }
        let hand = NormalizedHand::new(landmarks);
        Some(FingerStates::measure(&hand, &self.config))
    }
}

impl Default for GeometricClassifier {
    fn default() -> Self {
        Self::new(GeometryConfig::default())
    }
}
