//! Pipeline runner — drives the full observation → classify → dispatch →
//! sink loop.
//!
//! [`PipelineRunner`] owns the classifier, the dispatcher and the sink, and
//! consumes frames from a capacity-1 newest-wins `tokio::sync::watch`
//! channel.
//!
//! # Pipeline flow
//!
//! ```text
//! ObservationFrame (watch, newest wins)
//!   └─▶ GestureClassifier::classify       per-hand Option<HandState>
//!         └─▶ ActionDispatcher::update    Vec<AppAction>
//!               ├─▶ ActionSink::execute   (errors logged, never retried)
//!               ├─▶ broadcast<AppAction>  (observers; lagging ones drop)
//!               └─▶ watch<PipelineSnapshot>
//! ```
//!
//! Everything per frame runs on one serialized task, so the motion windows
//! and dispatcher state are never touched concurrently — the design relies
//! on that serialization, not on locks.  If frames arrive faster than they
//! are processed, the watch channel silently discards the stale ones:
//! newest-frame-wins is the accepted backpressure policy.

use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch};

use crate::classifier::GestureClassifier;
use crate::config::AppConfig;
use crate::dispatcher::{ActionDispatcher, AppAction};
use crate::observation::ObservationFrame;
use crate::sink::ActionSink;

use super::state::{FrameRate, PipelineSnapshot};

// ---------------------------------------------------------------------------
// Frame channel
// ---------------------------------------------------------------------------

/// Producer half of the frame channel.
pub type FrameSender = watch::Sender<Option<ObservationFrame>>;
/// Consumer half of the frame channel.
pub type FrameReceiver = watch::Receiver<Option<ObservationFrame>>;

/// Create the capacity-1 drop-oldest channel between the sensor-facing
/// producer and the pipeline.  The producer `send`s every frame; a slow
/// consumer only ever sees the most recent one.
pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    watch::channel(None)
}

// ---------------------------------------------------------------------------
// PipelineRunner
// ---------------------------------------------------------------------------

/// Drives the complete gesture pipeline.
///
/// Create with [`PipelineRunner::new`], grab observer handles via
/// [`snapshots`](Self::snapshots) / [`actions`](Self::actions), then call
/// [`run`](Self::run) inside a tokio task.
///
/// ```rust,no_run
/// use handwave::config::AppConfig;
/// use handwave::pipeline::{frame_channel, PipelineRunner};
/// use handwave::sink::LogSink;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let runner = PipelineRunner::new(&config, Box::new(LogSink));
/// let mut snapshots = runner.snapshots();
///
/// let (frame_tx, frame_rx) = frame_channel();
/// tokio::spawn(runner.run(frame_rx));
///
/// // frame_tx.send(Some(frame)) from the capture callback …
/// # }
/// ```
pub struct PipelineRunner {
    classifier: GestureClassifier,
    dispatcher: ActionDispatcher,
    sink: Box<dyn ActionSink>,
    snapshot_tx: watch::Sender<PipelineSnapshot>,
    action_tx: broadcast::Sender<AppAction>,
    fps: FrameRate,
}

impl PipelineRunner {
    /// Observer broadcast depth.  Lagging observers lose the oldest actions
    /// rather than ever blocking the processing step.
    const ACTION_CHANNEL_DEPTH: usize = 32;

    pub fn new(config: &AppConfig, sink: Box<dyn ActionSink>) -> Self {
        let (snapshot_tx, _) = watch::channel(PipelineSnapshot::default());
        let (action_tx, _) = broadcast::channel(Self::ACTION_CHANNEL_DEPTH);
        Self {
            classifier: GestureClassifier::new(config.gesture.clone()),
            dispatcher: ActionDispatcher::new(config.dispatch.clone()),
            sink,
            snapshot_tx,
            action_tx,
            fps: FrameRate::new(Instant::now()),
        }
    }

    /// Register a snapshot observer.  The receiver always holds the most
    /// recently published state.
    pub fn snapshots(&self) -> watch::Receiver<PipelineSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Register an action observer.  Delivery is best-effort: a receiver
    /// that falls behind misses actions instead of stalling the pipeline.
    pub fn actions(&self) -> broadcast::Receiver<AppAction> {
        self.action_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the pipeline until the frame sender is dropped.
    ///
    /// This is an `async fn` and should be spawned as a tokio task from
    /// `main()`.  It never returns while the channel is open.
    pub async fn run(mut self, mut frames: FrameReceiver) {
        while frames.changed().await.is_ok() {
            let frame = frames.borrow_and_update().clone();
            if let Some(frame) = frame {
                self.step(&frame);
            }
        }

        log::info!("pipeline: frame channel closed, runner shutting down");
    }

    // -----------------------------------------------------------------------
    // One synchronous, complete step
    // -----------------------------------------------------------------------

    /// Process a single frame: classify, dispatch, execute, publish.
    ///
    /// Public so embedders sharing an execution context with the producer
    /// can call the pipeline directly instead of going through the channel.
    pub fn step(&mut self, frame: &ObservationFrame) {
        if !frame.timestamp.is_finite() || frame.timestamp < 0.0 {
            log::warn!("pipeline: discarding frame with bad timestamp {}", frame.timestamp);
            // Re-publish the current state so producers that pace themselves
            // on snapshot changes still make progress past the bad frame.
            let current = *self.snapshot_tx.borrow();
            self.snapshot_tx.send_replace(current);
            return;
        }
        let now = Duration::from_secs_f64(frame.timestamp);

        let states = self.classifier.classify(frame);
        let actions = self.dispatcher.update(now, &states);

        for action in actions {
            log::debug!("pipeline: {} @ {:.3}s", action.label(), frame.timestamp);

            // Fire-and-forget: a failed synthesis is superseded by the next
            // frame's evaluation, never retried.
            if let Err(e) = self.sink.execute(action) {
                log::warn!("pipeline: sink failed for {}: {e}", action.label());
            }

            // Err here only means "no observers" — fine.
            let _ = self.action_tx.send(action);
        }

        if let Some(fps) = self.fps.tick(Instant::now()) {
            log::debug!("pipeline: {fps:.1} fps");
        }

        self.snapshot_tx.send_replace(PipelineSnapshot {
            left: states.left,
            right: states.right,
            switcher: self.dispatcher.switcher_state(),
            fps: self.fps.current(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
