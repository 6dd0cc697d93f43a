//! Mirror mode: the robotic hand copies the operator's fingers.
//!
//! Every frame with a hand is turned into one finger-state token and sent.
//! Frames without a hand send nothing, so the hand holds its last pose.

use std::thread;
use std::time::Duration;

use robohand_core::domain::fingers::DEFAULT_ANGLE_TOLERANCE;
use robohand_core::protocol::messages::DEFAULT_WRIST_DEGREES;
use robohand_core::{DeviceMessage, FingerAngles, FingerStates, HandLandmarks};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::transmit::Transmitter;
use super::{ModeError, SessionEnd};
use crate::infrastructure::camera::Camera;
use crate::infrastructure::console::Console;

/// Pause after each sent frame.
pub const DEFAULT_SEND_INTERVAL: Duration = Duration::from_millis(100);

/// How the finger state is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorEncoding {
    /// Each finger open (90) or closed (0), plus a fixed wrist angle.
    Binary,
    /// Each finger straight (0), half bent (90) or folded (180).
    #[default]
    Angles,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorSettings {
    pub encoding: MirrorEncoding,
    /// Wrist angle appended to binary frames.
    pub wrist_degrees: u16,
    pub send_interval: Duration,
    /// Half-bent band for [`MirrorEncoding::Angles`].
    pub angle_tolerance: f32,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            encoding: MirrorEncoding::default(),
            wrist_degrees: DEFAULT_WRIST_DEGREES,
            send_interval: DEFAULT_SEND_INTERVAL,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
        }
    }
}

impl MirrorSettings {
    /// The message mirrored for `hand`.
    pub fn encode(&self, hand: &HandLandmarks) -> DeviceMessage {
        match self.encoding {
            MirrorEncoding::Binary => DeviceMessage::FingerStates {
                fingers: FingerStates::from_hand(hand),
                wrist: self.wrist_degrees,
            },
            MirrorEncoding::Angles => {
                DeviceMessage::FingerAngles(FingerAngles::from_hand(hand, self.angle_tolerance))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Frames read from the feed.
    pub frames: u64,
    /// Tokens sent.
    pub sent: u64,
    pub end: SessionEnd,
}

/// Streams finger states until the operator quits or the feed fails.
///
/// # Errors
///
/// Returns [`ModeError::Transmit`] if a write fails.  Camera problems are
/// not errors: they end the session and are reported in
/// [`MirrorSummary::end`].
pub fn run_mirror_mode(
    settings: &MirrorSettings,
    camera: &dyn Camera,
    tx: &mut Transmitter,
    console: &mut dyn Console,
) -> Result<MirrorSummary, ModeError> {
    let mut summary = MirrorSummary {
        frames: 0,
        sent: 0,
        end: SessionEnd::Completed,
    };

    let mut feed = match camera.open() {
        Ok(feed) => feed,
        Err(e) => {
            warn!(camera = %camera.describe(), error = %e, "camera open failed");
            console.say("Error: webcam not detected.");
            summary.end = SessionEnd::CameraUnavailable;
            return Ok(summary);
        }
    };

    console.say("Mirroring your hand. Type q and Enter to stop.");
    info!(encoding = ?settings.encoding, "mirror started");

    summary.end = loop {
        if console.quit_requested() {
            break SessionEnd::OperatorQuit;
        }

        let frame = match feed.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "frame read failed");
                console.say("Error: failed to capture frame.");
                break SessionEnd::FeedLost(e.to_string());
            }
        };
        summary.frames += 1;

        let Some(hand) = frame.primary_hand() else {
            continue;
        };
        tx.send(&settings.encode(hand))?;
        summary.sent += 1;

        if !settings.send_interval.is_zero() {
            thread::sleep(settings.send_interval);
        }
    };

    info!(frames = summary.frames, sent = summary.sent, end = ?summary.end, "mirror stopped");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::camera::mock::{hand_with_fingers, ScriptedCamera};
    use crate::infrastructure::camera::FeedError;
    use crate::infrastructure::console::mock::ScriptedConsole;
    use crate::infrastructure::serial::mock::RecordingLink;
    use robohand_core::{Frame, Framing};

    fn settings(encoding: MirrorEncoding) -> MirrorSettings {
        MirrorSettings {
            encoding,
            send_interval: Duration::ZERO,
            ..MirrorSettings::default()
        }
    }

    fn hand_frame(extended: [bool; 5]) -> Frame {
        Frame::with_hand(hand_with_fingers(extended))
    }

    #[test]
    fn test_binary_frames_are_mirrored_until_feed_ends() {
        // Arrange
        let camera = ScriptedCamera::new(vec![
            hand_frame([true, false, false, true, true]),
            hand_frame([false; 5]),
        ]);
        let link = RecordingLink::new();
        let mut tx = Transmitter::new(Box::new(link.clone()), Framing::Newline);
        let mut console = ScriptedConsole::default();

        // Act
        let summary =
            run_mirror_mode(&settings(MirrorEncoding::Binary), &camera, &mut tx, &mut console)
                .unwrap();

        // Assert
        assert_eq!(link.trimmed_tokens(), vec!["90,0,0,90,90,90", "0,0,0,0,0,90"]);
        assert_eq!(summary.sent, 2);
        assert!(matches!(summary.end, SessionEnd::FeedLost(_)));
    }

    #[test]
    fn test_angle_encoding_sends_five_buckets() {
        let camera = ScriptedCamera::new(vec![hand_frame([false, true, true, false, false])]);
        let link = RecordingLink::new();
        let mut tx = Transmitter::new(Box::new(link.clone()), Framing::Newline);
        let mut console = ScriptedConsole::default();

        run_mirror_mode(&settings(MirrorEncoding::Angles), &camera, &mut tx, &mut console).unwrap();

        // Thumb angles are read on the vertical axis like every other finger;
        // the thumb tip sits level with its joint, so it reads half bent.
        assert_eq!(link.trimmed_tokens(), vec!["90,0,0,180,180"]);
    }

    #[test]
    fn test_frames_without_hand_send_nothing() {
        let camera = ScriptedCamera::new(vec![Frame::empty(), Frame::empty()]);
        let link = RecordingLink::new();
        let mut tx = Transmitter::new(Box::new(link.clone()), Framing::Newline);
        let mut console = ScriptedConsole::default();

        let summary =
            run_mirror_mode(&settings(MirrorEncoding::Binary), &camera, &mut tx, &mut console)
                .unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.sent, 0);
        assert!(link.writes().is_empty());
    }

    #[test]
    fn test_quit_stops_before_next_frame() {
        // Arrange: the second poll sees `q`.
        let camera = ScriptedCamera::new(vec![hand_frame([true; 5]); 5]);
        let link = RecordingLink::new();
        let mut tx = Transmitter::new(Box::new(link.clone()), Framing::Newline);
        let mut console = ScriptedConsole::default().quit_after_polls(2);

        // Act
        let summary =
            run_mirror_mode(&settings(MirrorEncoding::Binary), &camera, &mut tx, &mut console)
                .unwrap();

        // Assert
        assert_eq!(summary.end, SessionEnd::OperatorQuit);
        assert_eq!(link.writes().len(), 1);
    }

    #[test]
    fn test_unavailable_camera_returns_early() {
        let camera = ScriptedCamera::unavailable();
        let link = RecordingLink::new();
        let mut tx = Transmitter::new(Box::new(link.clone()), Framing::Newline);
        let mut console = ScriptedConsole::default();

        let summary =
            run_mirror_mode(&settings(MirrorEncoding::Binary), &camera, &mut tx, &mut console)
                .unwrap();

        assert_eq!(summary.end, SessionEnd::CameraUnavailable);
        assert!(console.printed("webcam not detected"));
        assert_eq!(console.polls(), 0);
        assert!(link.writes().is_empty());
    }

    #[test]
    fn test_capture_failure_ends_session_with_reason() {
        let camera = ScriptedCamera::with_results(vec![Err(FeedError::Capture(
            "device busy".to_string(),
        ))]);
        let link = RecordingLink::new();
        let mut tx = Transmitter::new(Box::new(link), Framing::Newline);
        let mut console = ScriptedConsole::default();

        let summary =
            run_mirror_mode(&settings(MirrorEncoding::Binary), &camera, &mut tx, &mut console)
                .unwrap();

        assert!(
            matches!(summary.end, SessionEnd::FeedLost(reason) if reason.contains("device busy"))
        );
        assert!(console.printed("failed to capture frame"));
    }

    #[test]
    fn test_write_failure_is_an_error() {
        let camera = ScriptedCamera::new(vec![hand_frame([true; 5])]);
        let mut tx = Transmitter::new(Box::new(RecordingLink::failing()), Framing::Newline);
        let mut console = ScriptedConsole::default();

        let result =
            run_mirror_mode(&settings(MirrorEncoding::Binary), &camera, &mut tx, &mut console);

        assert!(matches!(result, Err(ModeError::Transmit(_))));
    }
}
