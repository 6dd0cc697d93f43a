//! Scripted camera for unit and integration tests.
//!
//! Also provides [`pose`] and [`hand_with_fingers`], which build landmark
//! sets that the classifiers read unambiguously.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use robohand_core::{Finger, Frame, Gesture, HandLandmarks, Landmark};

use super::{Camera, FeedError, FrameFeed};

/// A [`Camera`] that serves a fixed list of frames, then
/// [`FeedError::Ended`].
///
/// Every [`open`](Camera::open) replays the script from the start.  Clones
/// share the open counter.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    script: Vec<Result<Frame, FeedError>>,
    available: bool,
    opens: Arc<Mutex<usize>>,
}

impl ScriptedCamera {
    /// A camera that yields `frames` in order.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self::with_results(frames.into_iter().map(Ok).collect())
    }

    /// A camera whose script may include read failures.
    pub fn with_results(script: Vec<Result<Frame, FeedError>>) -> Self {
        Self {
            script,
            available: true,
            opens: Arc::new(Mutex::new(0)),
        }
    }

    /// A camera that cannot be opened, like an unplugged webcam.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    /// Number of successful or attempted opens.
    pub fn open_count(&self) -> usize {
        *self.opens.lock().expect("lock poisoned")
    }
}

impl Camera for ScriptedCamera {
    fn open(&self) -> Result<Box<dyn FrameFeed>, FeedError> {
        *self.opens.lock().expect("lock poisoned") += 1;
        if !self.available {
            return Err(FeedError::Unavailable("scripted camera unplugged".to_string()));
        }
        Ok(Box::new(ScriptedFeed {
            remaining: self.script.iter().cloned().collect(),
        }))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

struct ScriptedFeed {
    remaining: VecDeque<Result<Frame, FeedError>>,
}

impl FrameFeed for ScriptedFeed {
    fn next_frame(&mut self) -> Result<Frame, FeedError> {
        self.remaining.pop_front().unwrap_or(Err(FeedError::Ended))
    }
}

// ── Pose builders ─────────────────────────────────────────────────────────────

const CENTRE: f32 = 0.5;
const RAISED: f32 = 0.2;
const LOWERED: f32 = 0.8;

/// A hand with each finger (thumb first) extended or folded.
///
/// Every joint sits at the centre of the image; only fingertips move.  An
/// extended long finger has its tip well above its joints, a folded one well
/// below, so the binary states, the angle buckets and the gesture classifier
/// (default margin, either reference) all agree.
pub fn hand_with_fingers(extended: [bool; 5]) -> HandLandmarks {
    let mut hand = HandLandmarks::uniform(Landmark::new(CENTRE, CENTRE));
    for (finger, up) in Finger::ALL.into_iter().zip(extended) {
        let tip = match finger {
            Finger::Thumb if up => Landmark::new(RAISED, CENTRE),
            Finger::Thumb => Landmark::new(LOWERED, CENTRE),
            _ if up => Landmark::new(CENTRE, RAISED),
            _ => Landmark::new(CENTRE, LOWERED),
        };
        hand = hand.with_point(finger.tip(), tip);
    }
    hand
}

/// A hand showing `gesture`.
pub fn pose(gesture: Gesture) -> HandLandmarks {
    match gesture {
        Gesture::Rock => hand_with_fingers([false; 5]),
        Gesture::Paper => hand_with_fingers([true; 5]),
        Gesture::Scissors => hand_with_fingers([false, true, true, false, false]),
    }
}

/// A frame holding a single hand showing `gesture`.
pub fn gesture_frame(gesture: Gesture) -> Frame {
    Frame::with_hand(pose(gesture))
}

#[cfg(test)]
mod tests {
    use super::*;
    use robohand_core::{FingerStates, GestureClassifier, Reference};

    #[test]
    fn test_poses_classify_as_their_gesture() {
        for reference in [Reference::FingerBase, Reference::Wrist] {
            let classifier = GestureClassifier::new(0.1, reference);
            for gesture in Gesture::ALL {
                assert_eq!(classifier.classify(&pose(gesture)), Some(gesture), "{gesture}");
            }
        }
    }

    #[test]
    fn test_hand_with_fingers_round_trips_through_finger_states() {
        let flags = [true, false, true, false, true];
        assert_eq!(FingerStates::from_hand(&hand_with_fingers(flags)), FingerStates(flags));
    }

    #[test]
    fn test_script_is_replayed_on_every_open() {
        // Arrange
        let camera = ScriptedCamera::new(vec![Frame::empty()]);

        // Act / Assert
        for _ in 0..2 {
            let mut feed = camera.open().unwrap();
            assert_eq!(feed.next_frame(), Ok(Frame::empty()));
            assert_eq!(feed.next_frame(), Err(FeedError::Ended));
        }
        assert_eq!(camera.open_count(), 2);
    }

    #[test]
    fn test_unavailable_camera_counts_attempts() {
        let camera = ScriptedCamera::unavailable();
        assert!(camera.open().is_err());
        assert_eq!(camera.open_count(), 1);
    }
}
