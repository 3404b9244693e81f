//! Action dispatch — classified hand states → debounced application commands.
//!
//! [`ActionDispatcher`] is the only stateful mapper in the pipeline.  Per
//! update it receives at most one [`HandState`] per chirality (or `None` for
//! an unseen hand) and emits zero or more [`AppAction`]s, protected by:
//!
//! - **Cooldowns** — an action is eligible only when `now − lastEmit[action,
//!   hand] > cooldown`; emission stamps the table.
//! - **Edge-triggering** — `Confirm` fires strictly on the false→true
//!   transition of the per-hand fist flag, never while the fist is held.
//! - **Hysteresis** — the app-switcher machine in [`switcher`], with its
//!   activation delay and drop grace period.
//!
//! Mappings are gated on the global switcher state: pinch-cycle only while
//! `Active`; confirm and scroll only while `Inactive`, so a switcher
//! interaction can never race normal commands.
//!
//! An absent hand is handled as: dynamic gesture stationary, not a fist
//! (which resets the edge trigger), and — for the switcher — identical to a
//! palm turned away.

pub mod switcher;

pub use switcher::{SwitcherMachine, SwitcherState};

use std::time::Duration;

use crate::classifier::{DynamicGesture, HandState, PalmOrientation, StaticGesture};
use crate::config::DispatchConfig;
use crate::observation::{Chirality, PerHand};

// ---------------------------------------------------------------------------
// AppAction
// ---------------------------------------------------------------------------

/// A discrete, fully-debounced application command.
///
/// Emitted, executed by the sink, and forgotten — actions are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppAction {
    /// Press-and-release of the confirm key (Return).
    Confirm,
    /// Begin an app-switcher interaction (hold the modifier, first Tab).
    AppSwitcherStart,
    /// Advance the app switcher by one entry (Tab while held).
    AppSwitcherCycle,
    /// End the app-switcher interaction (release the modifier).
    AppSwitcherDrop,
    /// One scroll-wheel tick upward.
    ScrollUp,
    /// One scroll-wheel tick downward.
    ScrollDown,
}

impl AppAction {
    /// Short human-readable name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            AppAction::Confirm => "confirm",
            AppAction::AppSwitcherStart => "switcher-start",
            AppAction::AppSwitcherCycle => "switcher-cycle",
            AppAction::AppSwitcherDrop => "switcher-drop",
            AppAction::ScrollUp => "scroll-up",
            AppAction::ScrollDown => "scroll-down",
        }
    }
}

// ---------------------------------------------------------------------------
// HandRecord
// ---------------------------------------------------------------------------

/// Per-hand dispatcher bookkeeping: the previous update's fist flag and the
/// last-emission timestamp per action kind.
#[derive(Debug, Default)]
struct HandRecord {
    fist_down: bool,
    last_confirm: Option<Duration>,
    last_cycle: Option<Duration>,
    last_scroll_up: Option<Duration>,
    last_scroll_down: Option<Duration>,
}

/// The uniform rate-limiting rule: eligible when no prior emission, or when
/// strictly more than `cooldown` has elapsed since it.
fn cooled_down(last: Option<Duration>, now: Duration, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(t) => now.saturating_sub(t) > cooldown,
    }
}

// ---------------------------------------------------------------------------
// ActionDispatcher
// ---------------------------------------------------------------------------

/// Stateful mapper from per-hand [`HandState`] streams to [`AppAction`]s.
///
/// All timing is caller-supplied (`now` = seconds since the stream epoch, as
/// a `Duration`); the dispatcher never reads a clock itself, which keeps
/// every rule deterministic under test.
pub struct ActionDispatcher {
    config: DispatchConfig,
    switcher: SwitcherMachine,
    hands: PerHand<HandRecord>,
}

impl ActionDispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        let switcher = SwitcherMachine::new(&config);
        Self {
            config,
            switcher,
            hands: PerHand::default(),
        }
    }

    /// Current switcher phase (read by the published pipeline snapshot).
    pub fn switcher_state(&self) -> SwitcherState {
        self.switcher.state()
    }

    /// Process one update.  Hands are evaluated left first, then right, the
    /// order the upstream publisher delivers them; switcher transitions made
    /// by the right hand therefore gate the left hand from the *next* update
    /// onward, never retroactively within the same one.
    pub fn update(
        &mut self,
        now: Duration,
        states: &PerHand<Option<HandState>>,
    ) -> Vec<AppAction> {
        let mut out = Vec::new();
        self.handle_left(now, states.left.as_ref(), &mut out);
        self.handle_right(now, states.right.as_ref(), &mut out);
        out
    }

    // -----------------------------------------------------------------------
    // Left hand: confirm (edge-triggered) and cycle, plus scroll
    // -----------------------------------------------------------------------

    fn handle_left(&mut self, now: Duration, state: Option<&HandState>, out: &mut Vec<AppAction>) {
        // Absent hand counts as "not a fist" so the edge trigger re-arms.
        let is_fist = state.is_some_and(|s| s.static_gesture == StaticGesture::Fist);

        if self.switcher.is_active() {
            if state.is_some_and(|s| s.static_gesture == StaticGesture::Pinch) {
                let rec = self.hands.get_mut(Chirality::Left);
                if cooled_down(rec.last_cycle, now, self.config.cycle_cooldown()) {
                    log::debug!("dispatch: left pinch -> cycle");
                    rec.last_cycle = Some(now);
                    out.push(AppAction::AppSwitcherCycle);
                }
            }
        } else if self.switcher.is_inactive() {
            let rec = self.hands.get_mut(Chirality::Left);
            let was_down = rec.fist_down;
            if is_fist
                && !was_down
                && cooled_down(rec.last_confirm, now, self.config.confirm_cooldown())
            {
                log::debug!("dispatch: left fist edge -> confirm");
                rec.last_confirm = Some(now);
                out.push(AppAction::Confirm);
            }

            self.scroll(now, Chirality::Left, state, out);
        }

        // The flag tracks reality every update, cooldown or not, so a held
        // fist can never re-fire when the cooldown expires.
        self.hands.get_mut(Chirality::Left).fist_down = is_fist;
    }

    // -----------------------------------------------------------------------
    // Right hand: switcher palm tracking, plus scroll
    // -----------------------------------------------------------------------

    fn handle_right(&mut self, now: Duration, state: Option<&HandState>, out: &mut Vec<AppAction>) {
        // Absence and palm-away land in the same grace-period arithmetic but
        // stay separate inputs to the machine.
        let emitted = match state {
            None => self.switcher.palm_lost(now),
            Some(s) if s.palm_orientation == PalmOrientation::FacingScreen => {
                self.switcher.palm_facing(now)
            }
            Some(_) => self.switcher.palm_away(now),
        };
        if let Some(action) = emitted {
            log::debug!("dispatch: right palm -> {}", action.label());
            out.push(action);
        }

        if self.switcher.is_inactive() {
            self.scroll(now, Chirality::Right, state, out);
        }
    }

    // -----------------------------------------------------------------------
    // Scroll (either hand, switcher inactive only)
    // -----------------------------------------------------------------------

    /// Motion → scroll, with the mapping inverted on purpose: raising the
    /// hand scrolls content down, the "drag the page" reading.
    fn scroll(
        &mut self,
        now: Duration,
        hand: Chirality,
        state: Option<&HandState>,
        out: &mut Vec<AppAction>,
    ) {
        let motion = state.map_or(DynamicGesture::Stationary, |s| s.dynamic_gesture);
        let cooldown = self.config.scroll_cooldown();
        let rec = self.hands.get_mut(hand);

        match motion {
            DynamicGesture::Up => {
                if cooled_down(rec.last_scroll_down, now, cooldown) {
                    log::debug!("dispatch: {hand:?} up -> scroll down");
                    rec.last_scroll_down = Some(now);
                    out.push(AppAction::ScrollDown);
                }
            }
            DynamicGesture::Down => {
                if cooled_down(rec.last_scroll_up, now, cooldown) {
                    log::debug!("dispatch: {hand:?} down -> scroll up");
                    rec.last_scroll_up = Some(now);
                    out.push(AppAction::ScrollUp);
                }
            }
            DynamicGesture::Stationary => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> ActionDispatcher {
        ActionDispatcher::new(DispatchConfig::default())
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn hand(
        chirality: Chirality,
        static_gesture: StaticGesture,
        dynamic_gesture: DynamicGesture,
        palm_orientation: PalmOrientation,
    ) -> HandState {
        HandState {
            chirality,
            static_gesture,
            dynamic_gesture,
            palm_orientation,
        }
    }

    fn left_only(state: HandState) -> PerHand<Option<HandState>> {
        PerHand {
            left: Some(state),
            right: None,
        }
    }

    fn right_only(state: HandState) -> PerHand<Option<HandState>> {
        PerHand {
            left: None,
            right: Some(state),
        }
    }

    fn left_fist() -> PerHand<Option<HandState>> {
        left_only(hand(
            Chirality::Left,
            StaticGesture::Fist,
            DynamicGesture::Stationary,
            PalmOrientation::Neutral,
        ))
    }

    fn right_facing() -> PerHand<Option<HandState>> {
        right_only(hand(
            Chirality::Right,
            StaticGesture::Open,
            DynamicGesture::Stationary,
            PalmOrientation::FacingScreen,
        ))
    }

    /// Drive the dispatcher to `Active` (switcher up) by t = 0.3 s.
    fn activate(d: &mut ActionDispatcher) {
        for t in [0.0, 0.1, 0.2, 0.3] {
            d.update(secs(t), &right_facing());
        }
        assert!(matches!(d.switcher_state(), SwitcherState::Active));
    }

    // -- confirm -----------------------------------------------------------

    #[test]
    fn held_fist_confirms_exactly_once() {
        let mut d = dispatcher();
        let mut confirms = 0;
        for i in 0..10 {
            let actions = d.update(secs(i as f64 * 0.033), &left_fist());
            confirms += actions
                .iter()
                .filter(|a| **a == AppAction::Confirm)
                .count();
            if i == 0 {
                assert_eq!(actions, vec![AppAction::Confirm]);
            }
        }
        assert_eq!(confirms, 1);
    }

    #[test]
    fn refist_within_cooldown_does_not_confirm() {
        let mut d = dispatcher();
        assert_eq!(d.update(secs(0.0), &left_fist()), vec![AppAction::Confirm]);

        // Open, then fist again 0.2 s later — edge is there, cooldown is not.
        let open = left_only(hand(
            Chirality::Left,
            StaticGesture::Open,
            DynamicGesture::Stationary,
            PalmOrientation::Neutral,
        ));
        assert!(d.update(secs(0.1), &open).is_empty());
        assert!(d.update(secs(0.2), &left_fist()).is_empty());

        // Open then fist again past the 0.5 s cooldown — fires.
        assert!(d.update(secs(0.55), &open).is_empty());
        assert_eq!(d.update(secs(0.7), &left_fist()), vec![AppAction::Confirm]);
    }

    #[test]
    fn hand_absence_resets_the_fist_edge() {
        let mut d = dispatcher();
        assert_eq!(d.update(secs(0.0), &left_fist()), vec![AppAction::Confirm]);

        // Hand vanishes while the fist would still be held…
        assert!(d.update(secs(0.2), &PerHand::default()).is_empty());

        // …and a fresh fist after the cooldown is a fresh edge.
        assert_eq!(d.update(secs(0.6), &left_fist()), vec![AppAction::Confirm]);
    }

    // -- scroll ------------------------------------------------------------

    #[test]
    fn motion_maps_to_inverted_scroll() {
        let mut d = dispatcher();
        let up = left_only(hand(
            Chirality::Left,
            StaticGesture::Open,
            DynamicGesture::Up,
            PalmOrientation::Neutral,
        ));
        let down = left_only(hand(
            Chirality::Left,
            StaticGesture::Open,
            DynamicGesture::Down,
            PalmOrientation::Neutral,
        ));

        assert_eq!(d.update(secs(0.0), &up), vec![AppAction::ScrollDown]);
        assert_eq!(d.update(secs(0.2), &down), vec![AppAction::ScrollUp]);
    }

    #[test]
    fn scroll_respects_per_hand_cooldown() {
        let mut d = dispatcher();
        let up = left_only(hand(
            Chirality::Left,
            StaticGesture::Open,
            DynamicGesture::Up,
            PalmOrientation::Neutral,
        ));

        assert_eq!(d.update(secs(0.00), &up), vec![AppAction::ScrollDown]);
        assert!(d.update(secs(0.05), &up).is_empty());
        assert!(d.update(secs(0.10), &up).is_empty());
        // 0.16 − 0.00 > 0.15 — eligible again.
        assert_eq!(d.update(secs(0.16), &up), vec![AppAction::ScrollDown]);
    }

    #[test]
    fn both_hands_scroll_independently_in_one_update() {
        let mut d = dispatcher();
        let both = PerHand {
            left: Some(hand(
                Chirality::Left,
                StaticGesture::Open,
                DynamicGesture::Up,
                PalmOrientation::Neutral,
            )),
            right: Some(hand(
                Chirality::Right,
                StaticGesture::Open,
                DynamicGesture::Up,
                PalmOrientation::Neutral,
            )),
        };
        let actions = d.update(secs(0.0), &both);
        assert_eq!(actions, vec![AppAction::ScrollDown, AppAction::ScrollDown]);
    }

    // -- switcher gating ---------------------------------------------------

    #[test]
    fn switcher_start_emitted_once_at_activation() {
        let mut d = dispatcher();
        let mut starts = 0;
        for t in [0.0, 0.1, 0.2, 0.3, 0.4] {
            let actions = d.update(secs(t), &right_facing());
            starts += actions
                .iter()
                .filter(|a| **a == AppAction::AppSwitcherStart)
                .count();
        }
        assert_eq!(starts, 1);
    }

    #[test]
    fn drop_fires_once_at_first_update_past_grace() {
        let mut d = dispatcher();
        activate(&mut d);
        d.update(secs(0.40), &right_facing()); // palm last seen at 0.40

        let mut drops = Vec::new();
        for t in [0.42, 0.45, 0.48, 0.55, 0.62, 0.71] {
            // Right hand absent throughout.
            let actions = d.update(secs(t), &PerHand::default());
            if actions.contains(&AppAction::AppSwitcherDrop) {
                drops.push(t);
            }
        }
        assert_eq!(drops, vec![0.71]);
        assert!(matches!(d.switcher_state(), SwitcherState::Inactive));
    }

    #[test]
    fn pinch_cycles_only_while_active() {
        let mut d = dispatcher();
        let pinch = left_only(hand(
            Chirality::Left,
            StaticGesture::Pinch,
            DynamicGesture::Stationary,
            PalmOrientation::Neutral,
        ));

        // Inactive: pinch does nothing.
        assert!(d.update(secs(0.0), &pinch).is_empty());

        activate(&mut d);

        // Keep the right palm facing so the switcher stays up.
        let mut frame = right_facing();
        frame.left = pinch.left;

        assert_eq!(
            d.update(secs(0.5), &frame),
            vec![AppAction::AppSwitcherCycle]
        );
        // Within the 0.4 s cycle cooldown — suppressed.
        assert!(d.update(secs(0.7), &frame).is_empty());
        // 0.95 − 0.5 > 0.4 — eligible again.
        assert_eq!(
            d.update(secs(0.95), &frame),
            vec![AppAction::AppSwitcherCycle]
        );
    }

    #[test]
    fn confirm_and_scroll_suppressed_while_active() {
        let mut d = dispatcher();
        activate(&mut d);

        let mut frame = right_facing();
        frame.left = Some(hand(
            Chirality::Left,
            StaticGesture::Fist,
            DynamicGesture::Up,
            PalmOrientation::Neutral,
        ));

        let actions = d.update(secs(0.5), &frame);
        assert!(!actions.contains(&AppAction::Confirm));
        assert!(!actions.contains(&AppAction::ScrollDown));
    }

    #[test]
    fn pending_activation_also_suppresses_confirm_and_scroll() {
        let mut d = dispatcher();
        // One facing frame arms the pending timer.
        d.update(secs(0.0), &right_facing());
        assert!(matches!(
            d.switcher_state(),
            SwitcherState::PendingActivation { .. }
        ));

        let mut frame = right_facing();
        frame.left = Some(hand(
            Chirality::Left,
            StaticGesture::Fist,
            DynamicGesture::Up,
            PalmOrientation::Neutral,
        ));
        let actions = d.update(secs(0.1), &frame);
        assert!(!actions.contains(&AppAction::Confirm));
        assert!(!actions.contains(&AppAction::ScrollDown));
    }

    #[test]
    fn cycle_on_activation_frame_waits_for_next_update() {
        let mut d = dispatcher();
        // Left pinch present on the very frame the switcher activates: the
        // left hand was evaluated before the right flipped the state, so the
        // cycle lands on the following update.
        let mut frame = right_facing();
        frame.left = Some(hand(
            Chirality::Left,
            StaticGesture::Pinch,
            DynamicGesture::Stationary,
            PalmOrientation::Neutral,
        ));

        for t in [0.0, 0.1, 0.2] {
            d.update(secs(t), &frame);
        }
        let at_activation = d.update(secs(0.3), &frame);
        assert_eq!(at_activation, vec![AppAction::AppSwitcherStart]);

        let next = d.update(secs(0.35), &frame);
        assert_eq!(next, vec![AppAction::AppSwitcherCycle]);
    }
}
