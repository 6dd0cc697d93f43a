//! # robohand-core
//!
//! Shared library for the RoboHand controller containing hand-landmark
//! geometry, gesture classification, the rock-paper-scissors rules, the ASL
//! letter encoder, and the ASCII token protocol spoken to the microcontroller.
//!
//! It has zero dependencies on cameras, serial ports, or the terminal.
//!
//! # Architecture overview (for beginners)
//!
//! RoboHand watches a hand through a camera and makes a robotic hand copy it,
//! spell words, or play rock-paper-scissors.  A third-party detector turns
//! each camera frame into 21 hand landmarks; everything after that lives here:
//!
//! - **`domain`** – Pure rules.  Landmarks in, a discrete state out: a finger
//!   on/off vector, joint-angle buckets, or a rock/paper/scissors gesture.
//!   The game scoreboard, the majority vote, and the mode selector are here
//!   too.
//!
//! - **`protocol`** – How states travel over the serial wire.  Each message is
//!   a short ASCII token such as `A`, `0,90,90,0,0,90`, or `SCORE:1,2`.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `robohand_core::Gesture` instead of `robohand_core::domain::gesture::Gesture`.
pub use domain::asl::{encode_word, AslPlan};
pub use domain::fingers::{FingerAngles, FingerStates, JointAngle};
pub use domain::game::{resolve, GameError, MoveSource, Outcome, RandomOpponent, Scoreboard, Side};
pub use domain::gesture::{Gesture, GestureClassifier, Reference};
pub use domain::landmarks::{Finger, Frame, HandLandmarks, Landmark, LandmarkError};
pub use domain::mode::{parse_menu_choice, parse_round_prompt, MenuChoice, Mode, RoundPrompt};
pub use domain::vote::{majority, VoteWindow};
pub use protocol::codec::{decode_token, encode_message, Framing, ProtocolError};
pub use protocol::messages::DeviceMessage;
