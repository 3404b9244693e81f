//! Replay reader — observation frames as JSON lines.
//!
//! The demo binary feeds the pipeline from a recording: one
//! [`ObservationFrame`](super::ObservationFrame) per line, e.g.
//!
//! ```text
//! {"timestamp":0.033,"hands":[{"chirality":"right","joints":{"wrist":{"x":0.5,"y":0.4,"confidence":0.92}}}]}
//! ```
//!
//! Blank lines and `#`-prefixed comment lines are skipped, so recordings can
//! be annotated by hand.

use std::io::BufRead;

use thiserror::Error;

use super::ObservationFrame;

// ---------------------------------------------------------------------------
// ReplayError
// ---------------------------------------------------------------------------

/// Errors that can surface while reading a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The underlying reader failed.
    #[error("cannot read recording: {0}")]
    Io(#[from] std::io::Error),

    /// A line was not a valid frame.  Carries the 1-based line number so the
    /// user can find the offending entry.
    #[error("invalid frame on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// read_frames
// ---------------------------------------------------------------------------

/// Read all frames from `reader`, in order.
///
/// # Errors
///
/// Fails on the first I/O error or unparseable line.  A recording with a
/// single corrupt frame is rejected whole rather than silently truncated.
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<ObservationFrame>, ReplayError> {
    let mut frames = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let frame: ObservationFrame =
            serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
                line: idx + 1,
                source,
            })?;
        frames.push(frame);
    }

    Ok(frames)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Chirality;
    use std::io::Cursor;

    const GOOD: &str = r#"
# two frames, right hand only
{"timestamp":0.0,"hands":[{"chirality":"right","joints":{"wrist":{"x":0.5,"y":0.4,"confidence":0.9}}}]}

{"timestamp":0.033,"hands":[]}
"#;

    #[test]
    fn reads_frames_skipping_blanks_and_comments() {
        let frames = read_frames(Cursor::new(GOOD)).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].hands.len(), 1);
        assert_eq!(frames[0].hands[0].chirality, Chirality::Right);
        assert!(frames[1].hands.is_empty());
    }

    #[test]
    fn reports_line_number_on_parse_error() {
        let input = "{\"timestamp\":0.0,\"hands\":[]}\nnot json\n";
        let err = read_frames(Cursor::new(input)).unwrap_err();
        match err {
            ReplayError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_an_empty_recording() {
        let frames = read_frames(Cursor::new("")).unwrap();
        assert!(frames.is_empty());
    }
}
