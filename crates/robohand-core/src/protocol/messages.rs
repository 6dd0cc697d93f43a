//! Every message the controller sends to the microcontroller.
//!
//! The firmware reads short ASCII tokens with no checksum and no
//! acknowledgment.  The token for each variant is fixed by
//! [`crate::protocol::codec`]:
//!
//! | Variant          | Token              |
//! |------------------|--------------------|
//! | `Letter`         | `A`                |
//! | `FingerStates`   | `90,0,0,90,90,90`  |
//! | `FingerAngles`   | `0,90,180,0,0`     |
//! | `Gesture`        | `rock`             |
//! | `UserGesture`    | `USER:rock`        |
//! | `Score`          | `SCORE:1,2`        |
//! | `Mode`           | `MIRROR`           |


use crate::domain::fingers::{FingerAngles, FingerStates};
use crate::domain::gesture::Gesture;
use crate::domain::mode::Mode;

/// Wrist servo angle sent with every binary finger-state frame.
pub const DEFAULT_WRIST_DEGREES: u16 = 90;

/// A message for the microcontroller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    /// One letter of an ASL word, always `'A'..='Z'`.
    Letter(char),
    /// Binary finger state (0 or 90 per finger) followed by the wrist angle.
    FingerStates { fingers: FingerStates, wrist: u16 },
    /// Bucketed bend (0, 90, or 180) per finger.
    FingerAngles(FingerAngles),
    /// The hand's own rock-paper-scissors move.
    Gesture(Gesture),
    /// The move the player was seen making.
    UserGesture(Gesture),
    /// Game score after a round.
    Score { user: u8, opponent: u8 },
    /// Mode change announcement.
    Mode(Mode),
}

impl DeviceMessage {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceMessage::Letter(_) => "letter",
            DeviceMessage::FingerStates { .. } => "finger_states",
            DeviceMessage::FingerAngles(_) => "finger_angles",
            DeviceMessage::Gesture(_) => "gesture",
            DeviceMessage::UserGesture(_) => "user_gesture",
            DeviceMessage::Score { .. } => "score",
            DeviceMessage::Mode(_) => "mode",
        }
    }
}
