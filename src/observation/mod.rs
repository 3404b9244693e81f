//! Hand-pose observation types — the upstream contract of the pipeline.
//!
//! An upstream producer (camera + landmark extractor) delivers one
//! [`ObservationFrame`] per camera frame, holding 0–2 [`HandObservation`]s
//! tagged by [`Chirality`].  Each observation maps the fixed [`JointName`]
//! set to a normalized 2D point plus a confidence in `[0, 1]`.
//!
//! Points use a bottom-left origin with both axes in `0..1`, so "the hand
//! moved up" means wrist `y` increased.
//!
//! Observations are ephemeral: the classifier consumes them and they are
//! never retained past the frame they arrived in.

pub mod replay;

pub use replay::{read_frames, ReplayError};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chirality
// ---------------------------------------------------------------------------

/// Which hand an observation (or a classified state) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chirality {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// PerHand
// ---------------------------------------------------------------------------

/// A pair of values, one per hand.
///
/// Used for classifier output (`PerHand<Option<HandState>>`) and for any
/// per-hand bookkeeping that must never accidentally share state between
/// the two hands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerHand<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerHand<T> {
    pub fn get(&self, hand: Chirality) -> &T {
        match hand {
            Chirality::Left => &self.left,
            Chirality::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, hand: Chirality) -> &mut T {
        match hand {
            Chirality::Left => &mut self.left,
            Chirality::Right => &mut self.right,
        }
    }
}

// ---------------------------------------------------------------------------
// JointName
// ---------------------------------------------------------------------------

/// The fixed joint set delivered by the upstream pose extractor.
///
/// Serde names match the upstream wire format (camelCase with the PIP/MCP
/// abbreviations upper-cased, e.g. `"indexPIP"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointName {
    #[serde(rename = "wrist")]
    Wrist,
    #[serde(rename = "thumbTip")]
    ThumbTip,
    #[serde(rename = "indexTip")]
    IndexTip,
    #[serde(rename = "indexPIP")]
    IndexPip,
    #[serde(rename = "middleTip")]
    MiddleTip,
    #[serde(rename = "middlePIP")]
    MiddlePip,
    #[serde(rename = "middleMCP")]
    MiddleMcp,
    #[serde(rename = "ringTip")]
    RingTip,
    #[serde(rename = "ringPIP")]
    RingPip,
    #[serde(rename = "littleTip")]
    LittleTip,
    #[serde(rename = "littlePIP")]
    LittlePip,
}

// ---------------------------------------------------------------------------
// Joint
// ---------------------------------------------------------------------------

/// One recognized joint: a normalized 2D location plus the extractor's
/// confidence for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Normalized horizontal position, `0..1`, origin bottom-left.
    pub x: f32,
    /// Normalized vertical position, `0..1`, origin bottom-left.
    pub y: f32,
    /// Extractor confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Joint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Euclidean distance between two joint locations (confidence ignored).
    pub fn distance_to(&self, other: &Joint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ---------------------------------------------------------------------------
// HandObservation
// ---------------------------------------------------------------------------

/// One hand as seen in one camera frame.
///
/// Joints the extractor could not recognize are simply absent from the map;
/// the classifier degrades to `Unknown`/`Neutral`/`Stationary` rather than
/// treating a missing joint as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub chirality: Chirality,
    pub joints: HashMap<JointName, Joint>,
}

impl HandObservation {
    pub fn new(chirality: Chirality) -> Self {
        Self {
            chirality,
            joints: HashMap::new(),
        }
    }

    /// Look up a joint by name.
    pub fn joint(&self, name: JointName) -> Option<&Joint> {
        self.joints.get(&name)
    }

    /// Look up a joint, returning it only when its confidence is strictly
    /// above `min_confidence`.
    pub fn confident_joint(&self, name: JointName, min_confidence: f32) -> Option<&Joint> {
        self.joints
            .get(&name)
            .filter(|j| j.confidence > min_confidence)
    }
}

// ---------------------------------------------------------------------------
// ObservationFrame
// ---------------------------------------------------------------------------

/// One camera frame's worth of hand observations.
///
/// `timestamp` is seconds since an arbitrary epoch (pipeline start for a
/// live source; the recording clock for replayed frames).  All dispatcher
/// cooldown and grace-period arithmetic runs on these timestamps, never on
/// wall-clock reads inside the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationFrame {
    /// Seconds since the stream epoch.
    pub timestamp: f64,
    /// 0–2 observations; at most one per chirality is meaningful.
    pub hands: Vec<HandObservation>,
}

impl ObservationFrame {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            hands: Vec::new(),
        }
    }

    /// The observation for `hand` in this frame, if any.
    ///
    /// When a malformed producer sends two observations with the same
    /// chirality, the last one wins.
    pub fn hand(&self, hand: Chirality) -> Option<&HandObservation> {
        self.hands.iter().rev().find(|h| h.chirality == hand)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Joint::new(0.0, 0.0, 1.0);
        let b = Joint::new(3.0, 4.0, 1.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn confident_joint_filters_on_strictly_greater() {
        let mut obs = HandObservation::new(Chirality::Left);
        obs.joints
            .insert(JointName::Wrist, Joint::new(0.5, 0.5, 0.3));

        // Confidence exactly at the threshold is rejected.
        assert!(obs.confident_joint(JointName::Wrist, 0.3).is_none());
        assert!(obs.confident_joint(JointName::Wrist, 0.2).is_some());
    }

    #[test]
    fn frame_lookup_by_chirality() {
        let mut frame = ObservationFrame::new(0.0);
        frame.hands.push(HandObservation::new(Chirality::Right));

        assert!(frame.hand(Chirality::Right).is_some());
        assert!(frame.hand(Chirality::Left).is_none());
    }

    #[test]
    fn duplicate_chirality_last_wins() {
        let mut first = HandObservation::new(Chirality::Left);
        first
            .joints
            .insert(JointName::Wrist, Joint::new(0.1, 0.1, 0.9));

        let mut second = HandObservation::new(Chirality::Left);
        second
            .joints
            .insert(JointName::Wrist, Joint::new(0.9, 0.9, 0.9));

        let mut frame = ObservationFrame::new(0.0);
        frame.hands.push(first);
        frame.hands.push(second);

        let wrist = frame.hand(Chirality::Left).unwrap().joint(JointName::Wrist);
        assert_eq!(wrist.unwrap().x, 0.9);
    }

    #[test]
    fn joint_names_serialize_with_upstream_spelling() {
        let json = serde_json::to_string(&JointName::IndexPip).unwrap();
        assert_eq!(json, "\"indexPIP\"");
        let json = serde_json::to_string(&JointName::MiddleMcp).unwrap();
        assert_eq!(json, "\"middleMCP\"");
    }

    #[test]
    fn per_hand_indexing() {
        let mut pair = PerHand {
            left: 1,
            right: 2,
        };
        assert_eq!(*pair.get(Chirality::Left), 1);
        *pair.get_mut(Chirality::Right) = 7;
        assert_eq!(pair.right, 7);
    }
}
