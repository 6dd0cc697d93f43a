//! Landmark feed adapters.
//!
//! The controller never touches pixels.  A hand-landmark detector runs as a
//! separate process, owns the camera device, and prints one JSON object per
//! frame on its standard output:
//!
//! ```text
//! READY
//! {"hands":[{"handedness":"Right","score":0.93,"landmarks":[{"x":0.51,"y":0.82,"z":0.0}, ...]}]}
//! {"hands":[]}
//! {"error":"camera read failed"}
//! ```
//!
//! - [`detector::DetectorCamera`] spawns the detector and reads its output.
//! - [`replay::ReplayCamera`] reads the same lines from a recorded file.
//! - [`mock::ScriptedCamera`] serves canned frames to tests.
//!
//! A [`Camera`] is opened once per mode; the returned [`FrameFeed`] releases
//! the device when it is dropped at mode exit.

use std::io::BufRead;

use robohand_core::{Frame, HandLandmarks, Landmark};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub mod detector;
pub mod mock;
pub mod replay;

pub use detector::DetectorCamera;
pub use replay::ReplayCamera;

/// Errors raised while opening or reading a landmark feed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The camera (or the detector process) could not be started.
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    /// The detector reported a capture failure, or its pipe broke.
    #[error("frame capture failed: {0}")]
    Capture(String),

    /// The feed closed normally (detector exited, replay file exhausted).
    #[error("landmark feed ended")]
    Ended,

    /// A line could not be parsed as a frame.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Something that can be opened to yield frames.
pub trait Camera: Send {
    /// Opens the device.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Unavailable`] if no frames can be produced.
    fn open(&self) -> Result<Box<dyn FrameFeed>, FeedError>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}

/// An open stream of detector results.
pub trait FrameFeed {
    /// Blocks until the next frame is available.
    ///
    /// # Errors
    ///
    /// Any error ends the mode that is reading the feed.
    fn next_frame(&mut self) -> Result<Frame, FeedError>;
}

// ── JSON wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    #[serde(default = "default_score")]
    score: f32,
    landmarks: Vec<Landmark>,
}

#[derive(Debug, Deserialize)]
struct FrameJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

fn default_score() -> f32 {
    1.0
}

/// Parses one detector line into a [`Frame`].
///
/// Hands scoring below `min_confidence` or with a landmark count other than
/// 21 are dropped with a warning; the frame itself is still returned.
///
/// # Errors
///
/// Returns [`FeedError::Malformed`] for invalid JSON and
/// [`FeedError::Capture`] when the detector reports an error.
pub fn parse_frame_line(line: &str, min_confidence: f32) -> Result<Frame, FeedError> {
    let parsed: FrameJson =
        serde_json::from_str(line.trim()).map_err(|e| FeedError::Malformed(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(FeedError::Capture(error));
    }

    let mut hands = Vec::with_capacity(parsed.hands.len());
    for hand in parsed.hands {
        if hand.score < min_confidence {
            warn!(
                score = hand.score,
                min_confidence, "hand below detection confidence dropped"
            );
            continue;
        }
        match HandLandmarks::from_points(&hand.landmarks) {
            Ok(mut landmarks) => {
                landmarks.score = hand.score;
                landmarks.handedness = hand.handedness;
                hands.push(landmarks);
            }
            Err(e) => warn!("hand dropped: {e}"),
        }
    }

    Ok(Frame { hands })
}

/// Reads frames from any line-oriented source.  Blank lines are skipped.
pub(crate) struct LineFeed<R> {
    reader: R,
    min_confidence: f32,
    line: String,
}

impl<R: BufRead> LineFeed<R> {
    pub(crate) fn new(reader: R, min_confidence: f32) -> Self {
        Self {
            reader,
            min_confidence,
            line: String::new(),
        }
    }

    /// Reads a single raw line, without parsing.  `None` at end of input.
    pub(crate) fn read_raw_line(&mut self) -> Result<Option<&str>, FeedError> {
        self.line.clear();
        let n = self
            .reader
            .read_line(&mut self.line)
            .map_err(|e| FeedError::Capture(e.to_string()))?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(self.line.trim_end()))
        }
    }

    /// The most recent line read, without its terminator.
    pub(crate) fn last_line(&self) -> &str {
        self.line.trim()
    }
}

impl<R: BufRead> FrameFeed for LineFeed<R> {
    fn next_frame(&mut self) -> Result<Frame, FeedError> {
        loop {
            let min_confidence = self.min_confidence;
            match self.read_raw_line()? {
                None => return Err(FeedError::Ended),
                Some("") => continue,
                Some(line) => return parse_frame_line(line, min_confidence),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn hand_json(score: f32, count: usize) -> String {
        let points = vec![r#"{"x":0.5,"y":0.5,"z":0.0}"#; count].join(",");
        format!(r#"{{"handedness":"Right","score":{score},"landmarks":[{points}]}}"#)
    }

    #[test]
    fn test_parse_frame_with_one_hand() {
        // Arrange
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.9, 21));

        // Act
        let frame = parse_frame_line(&line, 0.7).unwrap();

        // Assert
        assert_eq!(frame.hands.len(), 1);
        let hand = frame.primary_hand().unwrap();
        assert_eq!(hand.handedness, "Right");
        assert!((hand.score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_frame_without_hands_is_empty() {
        let frame = parse_frame_line(r#"{"hands":[]}"#, 0.7).unwrap();
        assert!(frame.primary_hand().is_none());
    }

    #[test]
    fn test_low_confidence_hand_is_dropped() {
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.5, 21));
        let frame = parse_frame_line(&line, 0.7).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn test_wrong_landmark_count_is_dropped_but_others_kept() {
        let line = format!(
            r#"{{"hands":[{},{}]}}"#,
            hand_json(0.9, 20),
            hand_json(0.8, 21)
        );
        let frame = parse_frame_line(&line, 0.7).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert!((frame.hands[0].score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_detector_error_is_capture_failure() {
        let result = parse_frame_line(r#"{"error":"camera read failed"}"#, 0.7);
        assert_eq!(result, Err(FeedError::Capture("camera read failed".to_string())));
    }

    #[test]
    fn test_garbage_line_is_malformed() {
        assert!(matches!(
            parse_frame_line("not json", 0.7),
            Err(FeedError::Malformed(_))
        ));
    }

    #[test]
    fn test_line_feed_skips_blank_lines_and_ends_at_eof() {
        // Arrange
        let input = "\n{\"hands\":[]}\n\n";
        let mut feed = LineFeed::new(Cursor::new(input), 0.7);

        // Act / Assert
        assert_eq!(feed.next_frame(), Ok(Frame::empty()));
        assert_eq!(feed.next_frame(), Err(FeedError::Ended));
    }
}
