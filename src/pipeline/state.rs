//! Published pipeline state and the frame-rate meter.
//!
//! [`PipelineSnapshot`] is the immutable value the runner publishes after
//! every processed frame — debug overlays and other observers read it from a
//! `tokio::sync::watch` receiver without ever touching pipeline internals.

use std::time::{Duration, Instant};

use crate::classifier::HandState;
use crate::dispatcher::SwitcherState;

// ---------------------------------------------------------------------------
// PipelineSnapshot
// ---------------------------------------------------------------------------

/// What the pipeline most recently saw and decided.
///
/// `left`/`right` are `None` when that hand was absent from the frame —
/// observers must preserve that distinction instead of substituting an
/// "unknown" state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSnapshot {
    pub left: Option<HandState>,
    pub right: Option<HandState>,
    pub switcher: SwitcherState,
    /// Processed frames per second over the last measuring window.
    pub fps: f64,
}

impl Default for PipelineSnapshot {
    fn default() -> Self {
        Self {
            left: None,
            right: None,
            switcher: SwitcherState::Inactive,
            fps: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// FrameRate
// ---------------------------------------------------------------------------

/// Simple frames-per-second meter over one-second wall-clock windows.
#[derive(Debug)]
pub struct FrameRate {
    count: u32,
    window_start: Instant,
    fps: f64,
}

impl FrameRate {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
            fps: 0.0,
        }
    }

    /// Record one processed frame.  Returns the fresh figure whenever a
    /// measuring window closes.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.count += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Self::WINDOW {
            self.fps = self.count as f64 / elapsed.as_secs_f64();
            self.count = 0;
            self.window_start = now;
            Some(self.fps)
        } else {
            None
        }
    }

    /// The most recently completed window's figure (0.0 before the first).
    pub fn current(&self) -> f64 {
        self.fps
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_figure_before_a_window_closes() {
        let t0 = Instant::now();
        let mut fr = FrameRate::new(t0);
        for i in 1..10 {
            assert_eq!(fr.tick(t0 + Duration::from_millis(i * 33)), None);
        }
        assert_eq!(fr.current(), 0.0);
    }

    #[test]
    fn figure_reported_when_window_closes() {
        let t0 = Instant::now();
        let mut fr = FrameRate::new(t0);
        for i in 1..=29 {
            assert_eq!(fr.tick(t0 + Duration::from_millis(i * 33)), None);
        }
        // 30th frame lands past the one-second mark.
        let fps = fr.tick(t0 + Duration::from_millis(30 * 33 + 20)).unwrap();
        assert!(fps > 25.0 && fps < 35.0, "fps = {fps}");
        assert_eq!(fr.current(), fps);
    }

    #[test]
    fn default_snapshot_is_empty_and_inactive() {
        let snap = PipelineSnapshot::default();
        assert!(snap.left.is_none());
        assert!(snap.right.is_none());
        assert_eq!(snap.switcher, SwitcherState::Inactive);
    }
}
