//! App-switcher hysteresis state machine.
//!
//! One global instance (never per-hand).  Transitions:
//!
//! ```text
//! Inactive ──palm facing──▶ PendingActivation(since)
//! PendingActivation ──palm away / hand lost──▶ Inactive        (no grace)
//! PendingActivation ──facing ≥ activation_delay──▶ Active      (emit Start)
//! Active ──palm away / hand lost > drop_grace──▶ Inactive      (emit Drop)
//! ```
//!
//! There are no timers: every transition is timestamp arithmetic evaluated
//! when the next frame arrives.  If the frame stream stalls, the machine
//! freezes in place — accepted, since frames are continuous in normal
//! operation.

use std::time::Duration;

use crate::config::DispatchConfig;

use super::AppAction;

// ---------------------------------------------------------------------------
// SwitcherState
// ---------------------------------------------------------------------------

/// The three phases of an app-switcher interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitcherState {
    /// No interaction; normal confirm/scroll mappings apply.
    Inactive,
    /// The palm turned toward the screen at `since`; waiting out the
    /// activation delay.  Cancelled immediately if the palm turns away.
    PendingActivation { since: Duration },
    /// The switcher overlay is up (the sink holds the modifier down).
    Active,
}

// ---------------------------------------------------------------------------
// SwitcherMachine
// ---------------------------------------------------------------------------

/// State machine plus the palm-visibility clock that drives the drop grace
/// period.
#[derive(Debug)]
pub struct SwitcherMachine {
    state: SwitcherState,
    /// Last timestamp at which the right palm was seen facing the screen.
    palm_last_seen: Option<Duration>,
    activation_delay: Duration,
    drop_grace: Duration,
}

impl SwitcherMachine {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            state: SwitcherState::Inactive,
            palm_last_seen: None,
            activation_delay: config.activation_delay(),
            drop_grace: config.drop_grace(),
        }
    }

    pub fn state(&self) -> SwitcherState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SwitcherState::Active
    }

    pub fn is_inactive(&self) -> bool {
        self.state == SwitcherState::Inactive
    }

    /// The right palm is facing the screen at `now`.
    ///
    /// Refreshes the palm clock, arms the pending timer from `Inactive`, and
    /// activates once the delay has fully elapsed.
    pub fn palm_facing(&mut self, now: Duration) -> Option<AppAction> {
        self.palm_last_seen = Some(now);

        match self.state {
            SwitcherState::Inactive => {
                self.state = SwitcherState::PendingActivation { since: now };
                None
            }
            SwitcherState::PendingActivation { since } => {
                if now.saturating_sub(since) >= self.activation_delay {
                    log::debug!("switcher: palm held {:?} -> Active", now - since);
                    self.state = SwitcherState::Active;
                    Some(AppAction::AppSwitcherStart)
                } else {
                    None
                }
            }
            SwitcherState::Active => None,
        }
    }

    /// The right hand is present but the palm is not facing the screen.
    pub fn palm_away(&mut self, now: Duration) -> Option<AppAction> {
        self.lapse(now)
    }

    /// The right hand is absent from this frame.
    ///
    /// Counts toward the drop grace period exactly like a palm turned away;
    /// kept as its own entry point so the two inputs stay distinguishable.
    pub fn palm_lost(&mut self, now: Duration) -> Option<AppAction> {
        self.lapse(now)
    }

    /// Shared arithmetic for both not-facing inputs.
    fn lapse(&mut self, now: Duration) -> Option<AppAction> {
        match self.state {
            SwitcherState::Inactive => None,
            // A pending activation has no grace period — cancel on the spot.
            SwitcherState::PendingActivation { .. } => {
                self.state = SwitcherState::Inactive;
                None
            }
            SwitcherState::Active => {
                let seen = self.palm_last_seen?;
                if now.saturating_sub(seen) > self.drop_grace {
                    log::debug!("switcher: palm gone {:?} -> Inactive", now - seen);
                    self.state = SwitcherState::Inactive;
                    self.palm_last_seen = None;
                    Some(AppAction::AppSwitcherDrop)
                } else {
                    None
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
