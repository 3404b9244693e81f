//! Bounded wrist-Y history used by the vertical-motion detector.
//!
//! One [`MotionWindow`] exists per hand.  It keeps at most `capacity` of the
//! most recent samples; pushing into a full window drops the oldest sample.
//! The window is **cleared entirely** the instant its hand disappears from a
//! frame, so motion can only be reported again after enough fresh samples
//! reaccumulate.

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// MotionWindow
// ---------------------------------------------------------------------------

/// Fixed-capacity FIFO of wrist-Y samples, oldest first.
#[derive(Debug, Clone)]
pub struct MotionWindow {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl MotionWindow {
    /// Create a window holding at most `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "MotionWindow capacity must be > 0");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest one when the window is full.
    pub fn push(&mut self, y: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(y);
    }

    /// Discard all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples currently stored.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Average of the last `window` samples minus the average of the first
    /// `window` samples.
    ///
    /// Returns `None` when fewer than `window` samples are stored (the two
    /// windows would otherwise overlap into nonsense).
    pub fn delta(&self, window: usize) -> Option<f32> {
        if window == 0 || self.samples.len() < window {
            return None;
        }

        let first: f32 = self.samples.iter().take(window).sum();
        let last: f32 = self.samples.iter().rev().take(window).sum();
        Some((last - first) / window as f32)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
