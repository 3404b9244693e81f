//! handwave — hand-gesture control for the desktop.
//!
//! Turns a live stream of per-frame hand-pose observations into discrete,
//! debounced application commands: key presses, scroll ticks, and a
//! press-hold-release app-switcher sequence.
//!
//! # Pipeline
//!
//! ```text
//! upstream pose extractor          (camera + ML, external)
//!        │  ObservationFrame
//!        ▼
//! GestureClassifier                static / dynamic / palm labels per hand
//!        ▼
//! ActionDispatcher                 cooldowns, edge triggers, hysteresis
//!        ▼
//! ActionSink                       OS key / scroll synthesis (enigo)
//! ```
//!
//! The crate deliberately excludes camera capture and landmark extraction:
//! any producer that can deliver [`observation::ObservationFrame`]s — a
//! live tracker or the bundled JSONL replay reader — can drive the
//! pipeline.

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod observation;
pub mod pipeline;
pub mod sink;
