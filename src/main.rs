//! Application entry point — handwave replay frontend.
//!
//! Feeds a recorded observation stream (JSON lines, one frame per line)
//! through the gesture pipeline and executes the resulting actions as real
//! OS input events.
//!
//! ```text
//! handwave [--dry-run] [--no-delay] [RECORDING]
//!
//!   RECORDING    path to a .jsonl recording, or "-" / omitted for stdin;
//!                a bare name that does not exist locally is looked up in
//!                the shared recordings directory
//!   --dry-run    log actions instead of synthesizing input
//!   --no-delay   replay as fast as possible instead of honoring the
//!                recorded timestamps (late frames get dropped, which is
//!                the pipeline's normal backpressure behavior)
//! ```
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Read the recording.
//! 4. Create tokio runtime (multi-thread, 2 workers).
//! 5. Spawn the pipeline runner, pick the sink.
//! 6. Feed frames, pacing by recorded timestamps.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

use handwave::config::{AppConfig, AppPaths};
use handwave::observation::{read_frames, ObservationFrame};
use handwave::pipeline::{frame_channel, PipelineRunner};
use handwave::sink::{ActionSink, KeyboardSink, LogSink};

// ---------------------------------------------------------------------------
// CLI options
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Options {
    dry_run: bool,
    no_delay: bool,
    recording: Option<String>,
}

fn parse_args() -> Result<Options> {
    let mut opts = Options::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" => opts.dry_run = true,
            "--no-delay" => opts.no_delay = true,
            "--help" | "-h" => {
                println!("usage: handwave [--dry-run] [--no-delay] [RECORDING]");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') && flag != "-" => {
                bail!("unknown flag: {flag}");
            }
            path => {
                if opts.recording.is_some() {
                    bail!("multiple recordings given");
                }
                opts.recording = Some(path.to_string());
            }
        }
    }
    Ok(opts)
}

// ---------------------------------------------------------------------------
// Recording loader
// ---------------------------------------------------------------------------

/// Where to look for a named recording: an absolute or locally existing
/// path is taken as given, anything else falls back to the shared
/// recordings directory.
fn resolve_recording(name: &str, recordings_dir: &Path) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.is_absolute() || direct.exists() {
        direct
    } else {
        recordings_dir.join(name)
    }
}

fn load_recording(opts: &Options) -> Result<Vec<ObservationFrame>> {
    let frames = match opts.recording.as_deref() {
        None | Some("-") => {
            log::info!("reading recording from stdin");
            read_frames(io::stdin().lock())?
        }
        Some(name) => {
            let path = resolve_recording(name, &AppPaths::new().recordings_dir);
            let file = File::open(&path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            read_frames(BufReader::new(file))?
        }
    };

    if frames.is_empty() {
        bail!("recording contains no frames");
    }
    check_timestamps(&frames)?;
    Ok(frames)
}

/// Reject a recording whose frames could never be dispatched.  The pipeline
/// would discard such frames one by one; failing up front gives the user a
/// line to fix instead of a replay that silently does less than the file
/// suggests.
fn check_timestamps(frames: &[ObservationFrame]) -> Result<()> {
    for (i, frame) in frames.iter().enumerate() {
        if !frame.timestamp.is_finite() || frame.timestamp < 0.0 {
            bail!(
                "recording frame {} has invalid timestamp {}",
                i + 1,
                frame.timestamp
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("handwave starting up");

    let opts = parse_args()?;

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Recording
    let frames = load_recording(&opts)?;
    log::info!(
        "loaded {} frames spanning {:.2}s",
        frames.len(),
        frames.last().map(|f| f.timestamp).unwrap_or(0.0)
    );

    // 4. Tokio runtime (runner + feeder each take a worker)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Pipeline
    let sink: Box<dyn ActionSink> = if opts.dry_run {
        log::info!("dry run: actions will only be logged");
        Box::new(LogSink)
    } else {
        Box::new(KeyboardSink::new(config.sink.clone()))
    };

    let runner = PipelineRunner::new(&config, sink);
    let mut snapshots = runner.snapshots();
    let (frame_tx, frame_rx) = frame_channel();

    let no_delay = opts.no_delay;
    rt.block_on(async move {
        let pump = tokio::spawn(runner.run(frame_rx));

        // 6. Feed frames at their recorded cadence.
        let mut previous_ts: Option<f64> = None;
        for frame in frames {
            if !no_delay {
                if let Some(prev) = previous_ts {
                    let gap = (frame.timestamp - prev).max(0.0);
                    tokio::time::sleep(Duration::from_secs_f64(gap)).await;
                }
                previous_ts = Some(frame.timestamp);
            }

            if frame_tx.send(Some(frame)).is_err() {
                break;
            }

            // Paced replay waits for the frame to be consumed so the demo
            // processes every frame; --no-delay skips this and accepts the
            // newest-wins drops a saturated live pipeline would see.
            if !no_delay && snapshots.changed().await.is_err() {
                break;
            }
        }

        drop(frame_tx);
        let _ = pump.await;
        log::info!("replay finished");
    });

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_relative_recording_falls_back_to_recordings_dir() {
        let dir = tempdir().expect("temp dir");
        let resolved = resolve_recording("session.jsonl", dir.path());
        assert_eq!(resolved, dir.path().join("session.jsonl"));
    }

    #[test]
    fn absolute_recording_path_is_taken_as_given() {
        let dir = tempdir().expect("temp dir");
        let file = dir.path().join("local.jsonl");
        std::fs::write(&file, "").expect("write");

        let resolved = resolve_recording(file.to_str().unwrap(), Path::new("/elsewhere"));
        assert_eq!(resolved, file);
    }

    #[test]
    fn recording_with_invalid_timestamp_is_rejected() {
        let frames = vec![ObservationFrame::new(0.0), ObservationFrame::new(-1.0)];
        let err = check_timestamps(&frames).unwrap_err();
        assert!(err.to_string().contains("frame 2"));

        let frames = vec![ObservationFrame::new(f64::NAN)];
        assert!(check_timestamps(&frames).is_err());

        let frames = vec![ObservationFrame::new(0.0), ObservationFrame::new(0.033)];
        assert!(check_timestamps(&frames).is_ok());
    }
}
