//! Action sinks — execute dispatched commands as OS input effects.
//!
//! The dispatcher is fire-and-forget: a sink failure is logged by the
//! pipeline and never retried, because the next frame's evaluation will
//! naturally re-attempt an equivalent action if the gesture persists.
//!
//! Two implementations:
//!
//! | Sink            | Effect                                          |
//! |-----------------|--------------------------------------------------|
//! | [`KeyboardSink`]| real key/scroll events via `enigo`               |
//! | [`LogSink`]     | log lines only — dry runs and headless tests     |

pub mod keyboard;

pub use keyboard::KeyboardSink;

use thiserror::Error;

use crate::dispatcher::AppAction;

// ---------------------------------------------------------------------------
// SinkError
// ---------------------------------------------------------------------------

/// All errors that can surface while synthesizing input events.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The input backend could not be initialised.
    #[error("cannot initialise input backend: {0}")]
    Backend(String),

    /// A key press/release event failed to be delivered.
    #[error("cannot simulate key event: {0}")]
    KeySimulation(String),

    /// A scroll-wheel event failed to be delivered.
    #[error("cannot simulate scroll event: {0}")]
    ScrollSimulation(String),
}

// ---------------------------------------------------------------------------
// ActionSink
// ---------------------------------------------------------------------------

/// Downstream consumer of dispatched actions.
///
/// `execute` is called synchronously from the pipeline's processing step and
/// must return quickly; heavyweight sinks should hand off internally.
pub trait ActionSink: Send {
    fn execute(&mut self, action: AppAction) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// LogSink
// ---------------------------------------------------------------------------

/// A sink that only logs.  Used by `--dry-run` replays and anywhere real
/// input synthesis is unwanted.
#[derive(Debug, Default)]
pub struct LogSink;

impl ActionSink for LogSink {
    fn execute(&mut self, action: AppAction) -> Result<(), SinkError> {
        log::info!("action: {}", action.label());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
