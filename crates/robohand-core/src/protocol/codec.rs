//! ASCII token codec for device messages.
//!
//! Wire format:
//! ```text
//! <token>[\n]
//! ```
//! A token is printable ASCII with no embedded newline.  With
//! [`Framing::Newline`] every token is followed by `\n`; with
//! [`Framing::Bare`] tokens are written back to back, which is what the
//! oldest firmware builds expect for single letters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::asl::is_spellable;
use crate::domain::fingers::{FingerAngles, FingerStates, JointAngle, EXTENDED_DEGREES};
use crate::domain::gesture::Gesture;
use crate::domain::mode::Mode;
use crate::protocol::messages::DeviceMessage;

const USER_PREFIX: &str = "USER:";
const SCORE_PREFIX: &str = "SCORE:";

/// Errors that can occur while encoding or decoding a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The token was empty (or only a line terminator).
    #[error("empty token")]
    Empty,

    /// A letter outside `A`..=`Z` was handed to the encoder.
    #[error("letter {0:?} has no hand pose")]
    InvalidLetter(char),

    /// The token matches none of the known shapes.
    #[error("unknown token: {0:?}")]
    UnknownToken(String),

    /// A numeric field could not be parsed.
    #[error("bad number in token: {0:?}")]
    BadNumber(String),

    /// A finger field held an angle the firmware does not know.
    #[error("unsupported finger angle: {0}")]
    BadAngle(u16),

    /// A comma-separated token had the wrong number of fields.
    #[error("expected {expected} fields, got {got}")]
    WrongArity { expected: &'static str, got: usize },
}

/// How tokens are terminated on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Token followed by `\n`.
    #[default]
    Newline,
    /// Token only.
    Bare,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`DeviceMessage`] into the bytes written to the serial port.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidLetter`] for a `Letter` outside `A`..=`Z`.
///
/// # Examples
///
/// ```rust
/// use robohand_core::{encode_message, DeviceMessage, Framing};
///
/// let msg = DeviceMessage::Score { user: 1, opponent: 2 };
/// let bytes = encode_message(&msg, Framing::Newline).unwrap();
/// assert_eq!(bytes, b"SCORE:1,2\n");
/// ```
pub fn encode_message(msg: &DeviceMessage, framing: Framing) -> Result<Vec<u8>, ProtocolError> {
    let mut token = encode_token(msg)?;
    if framing == Framing::Newline {
        token.push('\n');
    }
    Ok(token.into_bytes())
}

/// Renders a message as its bare token (no terminator).
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidLetter`] for a `Letter` outside `A`..=`Z`.
pub fn encode_token(msg: &DeviceMessage) -> Result<String, ProtocolError> {
    let token = match msg {
        DeviceMessage::Letter(c) => {
            if !is_spellable(*c) {
                return Err(ProtocolError::InvalidLetter(*c));
            }
            c.to_string()
        }
        DeviceMessage::FingerStates { fingers, wrist } => {
            let mut fields: Vec<u16> = fingers.servo_degrees().to_vec();
            fields.push(*wrist);
            join_numbers(&fields)
        }
        DeviceMessage::FingerAngles(angles) => join_numbers(&angles.degrees()),
        DeviceMessage::Gesture(g) => g.as_str().to_string(),
        DeviceMessage::UserGesture(g) => format!("{USER_PREFIX}{g}"),
        DeviceMessage::Score { user, opponent } => format!("{SCORE_PREFIX}{user},{opponent}"),
        DeviceMessage::Mode(m) => m.as_str().to_string(),
    };
    Ok(token)
}

/// Decodes one token, tolerating a trailing `\n` or `\r\n`.
///
/// Used by the dry-run link to show what the device would have received.
///
/// # Errors
///
/// Returns [`ProtocolError`] when the token matches no known shape.
///
/// # Examples
///
/// ```rust
/// use robohand_core::{decode_token, DeviceMessage, Gesture};
///
/// assert_eq!(decode_token("USER:paper\n").unwrap(), DeviceMessage::UserGesture(Gesture::Paper));
/// ```
pub fn decode_token(raw: &str) -> Result<DeviceMessage, ProtocolError> {
    let token = raw.trim_end_matches(['\n', '\r']);
    if token.is_empty() {
        return Err(ProtocolError::Empty);
    }

    if let Some(rest) = token.strip_prefix(USER_PREFIX) {
        return exact_gesture(rest)
            .map(DeviceMessage::UserGesture)
            .ok_or_else(|| ProtocolError::UnknownToken(token.to_string()));
    }

    if let Some(rest) = token.strip_prefix(SCORE_PREFIX) {
        return decode_score(rest);
    }

    if token.contains(',') {
        return decode_fingers(token);
    }

    if let Some(mode) = decode_mode(token) {
        return Ok(DeviceMessage::Mode(mode));
    }

    if let Some(gesture) = exact_gesture(token) {
        return Ok(DeviceMessage::Gesture(gesture));
    }

    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_spellable(c) => Ok(DeviceMessage::Letter(c)),
        _ => Err(ProtocolError::UnknownToken(token.to_string())),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn join_numbers<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Gesture names go on the wire in lower case only.
fn exact_gesture(token: &str) -> Option<Gesture> {
    Gesture::from_str(token)
        .ok()
        .filter(|gesture| gesture.as_str() == token)
}

fn parse_fields(token: &str) -> Result<Vec<u16>, ProtocolError> {
    token
        .split(',')
        .map(|field| {
            field
                .trim()
                .parse::<u16>()
                .map_err(|_| ProtocolError::BadNumber(field.to_string()))
        })
        .collect()
}

fn decode_score(rest: &str) -> Result<DeviceMessage, ProtocolError> {
    let fields: Vec<&str> = rest.split(',').collect();
    let [user, opponent] = fields.as_slice() else {
        return Err(ProtocolError::WrongArity {
            expected: "2",
            got: fields.len(),
        });
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<u8>()
            .map_err(|_| ProtocolError::BadNumber(s.to_string()))
    };
    Ok(DeviceMessage::Score {
        user: parse(*user)?,
        opponent: parse(*opponent)?,
    })
}

fn decode_fingers(token: &str) -> Result<DeviceMessage, ProtocolError> {
    let fields = parse_fields(token)?;
    match fields.len() {
        // Five binary fingers plus the wrist.
        6 => {
            let mut flags = [false; 5];
            for (flag, degrees) in flags.iter_mut().zip(&fields[..5]) {
                *flag = match *degrees {
                    0 => false,
                    EXTENDED_DEGREES => true,
                    other => return Err(ProtocolError::BadAngle(other)),
                };
            }
            Ok(DeviceMessage::FingerStates {
                fingers: FingerStates(flags),
                wrist: fields[5],
            })
        }
        5 => {
            let mut angles = [JointAngle::Straight; 5];
            for (angle, degrees) in angles.iter_mut().zip(&fields) {
                *angle =
                    JointAngle::from_degrees(*degrees).ok_or(ProtocolError::BadAngle(*degrees))?;
            }
            Ok(DeviceMessage::FingerAngles(FingerAngles(angles)))
        }
        got => Err(ProtocolError::WrongArity {
            expected: "5 or 6",
            got,
        }),
    }
}

fn decode_mode(token: &str) -> Option<Mode> {
    Mode::ALL.into_iter().find(|m| m.as_str() == token)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(msg: DeviceMessage) -> String {
        String::from_utf8(encode_message(&msg, Framing::Newline).expect("encode")).expect("ascii")
    }

    #[test]
    fn test_letter_is_single_character() {
        assert_eq!(encode(DeviceMessage::Letter('Q')), "Q\n");
    }

    #[test]
    fn test_lowercase_letter_is_rejected() {
        let result = encode_message(&DeviceMessage::Letter('q'), Framing::Bare);
        assert_eq!(result, Err(ProtocolError::InvalidLetter('q')));
    }

    #[test]
    fn test_bare_framing_has_no_terminator() {
        let bytes = encode_message(&DeviceMessage::Gesture(Gesture::Rock), Framing::Bare).unwrap();
        assert_eq!(bytes, b"rock");
    }

    #[test]
    fn test_finger_states_append_wrist() {
        let msg = DeviceMessage::FingerStates {
            fingers: FingerStates([true, false, false, true, true]),
            wrist: 90,
        };
        assert_eq!(encode(msg), "90,0,0,90,90,90\n");
    }

    #[test]
    fn test_finger_angles_are_five_fields() {
        let msg = DeviceMessage::FingerAngles(FingerAngles([
            JointAngle::Straight,
            JointAngle::Half,
            JointAngle::Folded,
            JointAngle::Straight,
            JointAngle::Straight,
        ]));
        assert_eq!(encode(msg), "0,90,180,0,0\n");
    }

    #[test]
    fn test_structured_game_tokens() {
        assert_eq!(encode(DeviceMessage::UserGesture(Gesture::Scissors)), "USER:scissors\n");
        assert_eq!(encode(DeviceMessage::Score { user: 2, opponent: 3 }), "SCORE:2,3\n");
        assert_eq!(encode(DeviceMessage::Mode(Mode::Mirror)), "MIRROR\n");
    }

    #[test]
    fn test_decode_distinguishes_mode_from_letter() {
        assert_eq!(decode_token("ASL").unwrap(), DeviceMessage::Mode(Mode::Asl));
        assert_eq!(decode_token("A").unwrap(), DeviceMessage::Letter('A'));
    }

    #[test]
    fn test_decode_accepts_crlf() {
        assert_eq!(
            decode_token("paper\r\n").unwrap(),
            DeviceMessage::Gesture(Gesture::Paper)
        );
    }

    #[test]
    fn test_decode_rejects_out_of_range_angle() {
        assert_eq!(decode_token("0,45,0,0,0"), Err(ProtocolError::BadAngle(45)));
        // Binary frames only allow 0 or 90 for fingers.
        assert_eq!(decode_token("180,0,0,0,0,90"), Err(ProtocolError::BadAngle(180)));
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        assert!(matches!(
            decode_token("0,90,0"),
            Err(ProtocolError::WrongArity { got: 3, .. })
        ));
        assert!(matches!(
            decode_token("SCORE:1"),
            Err(ProtocolError::WrongArity { got: 1, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_token(""), Err(ProtocolError::Empty));
        assert_eq!(decode_token("\n"), Err(ProtocolError::Empty));
        assert!(matches!(decode_token("Rock"), Err(ProtocolError::UnknownToken(_))));
        assert!(matches!(decode_token("USER:lizard"), Err(ProtocolError::UnknownToken(_))));
        assert!(matches!(decode_token("0,x,0,0,0"), Err(ProtocolError::BadNumber(_))));
    }

    #[test]
    fn test_user_gesture_is_case_sensitive_like_bare_gesture() {
        assert_eq!(
            decode_token("USER:rock"),
            Ok(DeviceMessage::UserGesture(Gesture::Rock))
        );
        assert_eq!(
            decode_token("USER:Rock"),
            Err(ProtocolError::UnknownToken("USER:Rock".to_string()))
        );
        assert_eq!(
            decode_token("Rock"),
            Err(ProtocolError::UnknownToken("Rock".to_string()))
        );
    }

    #[test]
    fn test_decode_finger_states_keeps_wrist() {
        let decoded = decode_token("0,90,90,0,0,45\n").unwrap();
        assert_eq!(
            decoded,
            DeviceMessage::FingerStates {
                fingers: FingerStates([false, true, true, false, false]),
                wrist: 45,
            }
        );
    }
}
