//! Pipeline module — wires observations through classification and dispatch
//! to the action sink, and publishes state to observers.
//!
//! # Architecture
//!
//! ```text
//! ObservationFrame (watch channel, newest wins)
//!        │
//!        ▼
//! PipelineRunner::run()            ← async tokio task, one frame at a time
//!        │
//!        ├─ GestureClassifier      per-hand Option<HandState>
//!        ├─ ActionDispatcher       Vec<AppAction>
//!        ├─ ActionSink::execute    fire-and-forget OS input
//!        │
//!        ├─▶ watch<PipelineSnapshot>   ← debug overlays, embedders
//!        └─▶ broadcast<AppAction>      ← action observers (best-effort)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use handwave::config::AppConfig;
//! use handwave::pipeline::{frame_channel, PipelineRunner};
//! use handwave::sink::LogSink;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let runner = PipelineRunner::new(&config, Box::new(LogSink));
//!     let mut snapshots = runner.snapshots();
//!
//!     let (frame_tx, frame_rx) = frame_channel();
//!     tokio::spawn(runner.run(frame_rx));
//!
//!     // frame_tx.send(Some(frame)) once per camera frame …
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{frame_channel, FrameReceiver, FrameSender, PipelineRunner};
pub use state::{FrameRate, PipelineSnapshot};
