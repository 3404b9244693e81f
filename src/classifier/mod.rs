//! Gesture classification — noisy per-frame joints → stable labels.
//!
//! Three independent classifications per hand per frame:
//!
//! | Label            | Kind      | Input                                  |
//! |------------------|-----------|----------------------------------------|
//! | [`StaticGesture`]| stateless | current joint geometry                 |
//! | [`DynamicGesture`]| stateful | rolling window of wrist-Y positions    |
//! | [`PalmOrientation`]| stateless | wrist → middle-MCP vector            |
//!
//! The classifier's only cross-frame state is the pair of per-hand
//! [`MotionWindow`]s.  A hand that is absent from a frame produces no
//! [`HandState`] at all (an `Option::None`, distinct from a present hand
//! classified `Unknown`) and its motion window is wiped on the spot.
//!
//! All thresholds come from [`GestureConfig`]; nothing is hard-coded.

pub mod motion;

pub use motion::MotionWindow;

use crate::config::GestureConfig;
use crate::observation::{
    Chirality, HandObservation, JointName, ObservationFrame, PerHand,
};

// ---------------------------------------------------------------------------
// Classification labels
// ---------------------------------------------------------------------------

/// Single-frame hand-shape classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticGesture {
    Fist,
    Open,
    Pinch,
    /// Hand present but joints missing or below the confidence floor.
    Unknown,
}

impl StaticGesture {
    /// Short display label for debug overlays and logs.
    pub fn label(&self) -> &'static str {
        match self {
            StaticGesture::Fist => "Fist",
            StaticGesture::Open => "Open",
            StaticGesture::Pinch => "Pinch",
            StaticGesture::Unknown => "---",
        }
    }
}

/// Windowed vertical-motion classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicGesture {
    Up,
    Down,
    Stationary,
}

impl DynamicGesture {
    pub fn label(&self) -> &'static str {
        match self {
            DynamicGesture::Up => "Up",
            DynamicGesture::Down => "Down",
            DynamicGesture::Stationary => "---",
        }
    }
}

/// Which way the palm is turned relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalmOrientation {
    FacingScreen,
    FacingAway,
    Neutral,
}

impl PalmOrientation {
    pub fn label(&self) -> &'static str {
        match self {
            PalmOrientation::FacingScreen => "Screen",
            PalmOrientation::FacingAway => "Away",
            PalmOrientation::Neutral => "---",
        }
    }
}

// ---------------------------------------------------------------------------
// HandState
// ---------------------------------------------------------------------------

/// The classified state of one hand for one frame.
///
/// Immutable; superseded every frame.  A hand that was not observed this
/// frame has no `HandState` — callers receive `Option<HandState>` and must
/// not collapse absence into [`StaticGesture::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandState {
    pub chirality: Chirality,
    pub static_gesture: StaticGesture,
    pub dynamic_gesture: DynamicGesture,
    pub palm_orientation: PalmOrientation,
}

// ---------------------------------------------------------------------------
// GestureClassifier
// ---------------------------------------------------------------------------

/// The non-thumb fingers checked by the curl and extension tests.
const FINGERS: [(JointName, JointName); 4] = [
    (JointName::IndexTip, JointName::IndexPip),
    (JointName::MiddleTip, JointName::MiddlePip),
    (JointName::RingTip, JointName::RingPip),
    (JointName::LittleTip, JointName::LittlePip),
];

/// Finger indices into the curl/extension distance arrays.
const MIDDLE: usize = 1;
const RING: usize = 2;

/// Per-frame gesture classifier.
///
/// Owns the per-hand motion windows; everything else is pure functions of
/// the current frame.  Must be driven from a single serialized context — it
/// has no interior locking and relies on the pipeline's one-frame-at-a-time
/// processing model.
pub struct GestureClassifier {
    config: GestureConfig,
    history: PerHand<MotionWindow>,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        let history = PerHand {
            left: MotionWindow::new(config.history_size),
            right: MotionWindow::new(config.history_size),
        };
        Self { config, history }
    }

    /// Classify one frame, producing zero or one [`HandState`] per
    /// chirality.
    ///
    /// Side effect: updates the motion windows, and clears the window of any
    /// hand absent from this frame.
    pub fn classify(&mut self, frame: &ObservationFrame) -> PerHand<Option<HandState>> {
        let mut out: PerHand<Option<HandState>> = PerHand::default();

        for hand in [Chirality::Left, Chirality::Right] {
            match frame.hand(hand) {
                Some(obs) => {
                    let state = HandState {
                        chirality: hand,
                        static_gesture: self.classify_static(obs),
                        dynamic_gesture: self.classify_motion(hand, obs),
                        palm_orientation: self.classify_palm(obs),
                    };
                    *out.get_mut(hand) = Some(state);
                }
                None => {
                    // Absent hand: wipe its history so stale motion can
                    // never be reported when it reappears.
                    self.history.get_mut(hand).clear();
                }
            }
        }

        out
    }

    // -----------------------------------------------------------------------
    // Static gesture
    // -----------------------------------------------------------------------

    /// Pure function of the current joints: pinch, then fist, then open.
    ///
    /// Requires the wrist, the thumb tip, and the tip + PIP of every
    /// non-thumb finger, all above the confidence floor; otherwise
    /// `Unknown`.  Pinch is checked before fist so a pinch shape is never
    /// misread as a fist even when the curl ratios coincidentally also pass
    /// the fist test.
    fn classify_static(&self, obs: &HandObservation) -> StaticGesture {
        let floor = self.config.min_joint_confidence;

        let Some(wrist) = obs.confident_joint(JointName::Wrist, floor) else {
            return StaticGesture::Unknown;
        };
        let Some(thumb) = obs.confident_joint(JointName::ThumbTip, floor) else {
            return StaticGesture::Unknown;
        };
        let Some(index) = obs.confident_joint(JointName::IndexTip, floor) else {
            return StaticGesture::Unknown;
        };

        // Tip-to-wrist and PIP-to-wrist distances per finger.
        let mut tip_dist = [0.0f32; 4];
        let mut pip_dist = [0.0f32; 4];
        for (i, &(tip, pip)) in FINGERS.iter().enumerate() {
            let (Some(t), Some(p)) = (
                obs.confident_joint(tip, floor),
                obs.confident_joint(pip, floor),
            ) else {
                return StaticGesture::Unknown;
            };
            tip_dist[i] = t.distance_to(wrist);
            pip_dist[i] = p.distance_to(wrist);
        }

        let extended =
            |i: usize| tip_dist[i] >= pip_dist[i] * self.config.extension_ratio;

        // -- Pinch -----------------------------------------------------------
        let pinch_conf = self.config.pinch_min_confidence;
        if thumb.distance_to(index) < self.config.pinch_max_distance
            && thumb.confidence > pinch_conf
            && index.confidence > pinch_conf
            && extended(MIDDLE)
            && extended(RING)
        {
            return StaticGesture::Pinch;
        }

        // -- Fist ------------------------------------------------------------
        let all_curled = (0..FINGERS.len())
            .all(|i| tip_dist[i] < pip_dist[i] * self.config.fist_curl_ratio);
        if all_curled {
            return StaticGesture::Fist;
        }

        StaticGesture::Open
    }

    // -----------------------------------------------------------------------
    // Dynamic gesture
    // -----------------------------------------------------------------------

    /// Push the wrist-Y sample (when confident) and evaluate the window.
    ///
    /// Stays `Stationary` until `min_history` samples have accumulated since
    /// the last wipe, so a reappearing hand cannot report motion off stale
    /// or thin data.
    fn classify_motion(&mut self, hand: Chirality, obs: &HandObservation) -> DynamicGesture {
        let window = self.history.get_mut(hand);

        if let Some(wrist) = obs.confident_joint(JointName::Wrist, self.config.min_joint_confidence)
        {
            window.push(wrist.y);
        }

        if window.len() < self.config.min_history {
            return DynamicGesture::Stationary;
        }

        match window.delta(self.config.averaging_window) {
            Some(delta) if delta > self.config.motion_threshold => DynamicGesture::Up,
            Some(delta) if delta < -self.config.motion_threshold => DynamicGesture::Down,
            _ => DynamicGesture::Stationary,
        }
    }

    // -----------------------------------------------------------------------
    // Palm orientation
    // -----------------------------------------------------------------------

    /// Stateless orientation from the wrist → middle-MCP vector.
    fn classify_palm(&self, obs: &HandObservation) -> PalmOrientation {
        let floor = self.config.min_joint_confidence;

        let (wrist, mcp) = match (
            obs.confident_joint(JointName::Wrist, floor),
            obs.confident_joint(JointName::MiddleMcp, floor),
        ) {
            (Some(w), Some(m)) => (w, m),
            _ => return PalmOrientation::Neutral,
        };

        let vy = mcp.y - wrist.y;
        if vy > self.config.palm_y_threshold {
            PalmOrientation::FacingScreen
        } else if vy < -self.config.palm_y_threshold {
            PalmOrientation::FacingAway
        } else {
            PalmOrientation::Neutral
        }
    }

    /// Number of motion samples currently buffered for `hand` (debug/tests).
    pub fn history_len(&self, hand: Chirality) -> usize {
        self.history.get(hand).len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
