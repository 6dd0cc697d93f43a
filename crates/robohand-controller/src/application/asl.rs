//! ASL spelling mode.
//!
//! The operator types a word; each letter `A`–`Z` is sent to the hand as its
//! own token, with a pause between letters so the servos can settle into
//! each pose.  Characters with no pose are reported and skipped.
//!
//! Input is spelled as typed: only `A`–`Z` have a pose, so `AB1c` sends `A`
//! and `B` and reports both `1` and `c`.  Setting
//! [`AslSettings::uppercase_input`] folds the word to upper case first, the
//! way the old Python scripts did, and then `c` is sent as `C`.

use std::thread;
use std::time::Duration;

use robohand_core::{encode_word, DeviceMessage};
use tracing::{info, warn};

use super::transmit::Transmitter;
use super::ModeError;
use crate::infrastructure::console::Console;

/// Pause after each letter.
pub const DEFAULT_LETTER_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AslSettings {
    pub letter_delay: Duration,
    /// Upper-case the typed word before encoding, so `hello` spells HELLO.
    /// Off by default.
    pub uppercase_input: bool,
}

impl Default for AslSettings {
    fn default() -> Self {
        Self {
            letter_delay: DEFAULT_LETTER_DELAY,
            uppercase_input: false,
        }
    }
}

/// What one ASL run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AslReport {
    /// The word as encoded (after optional upper-casing).
    pub word: String,
    pub sent: Vec<char>,
    pub skipped: Vec<char>,
}

/// Prompts for one word and spells it.
///
/// # Errors
///
/// Returns [`ModeError::Console`] if input is closed before a word arrives,
/// and [`ModeError::Transmit`] if a letter cannot be written; letters sent
/// before the failure stay sent.
pub fn run_asl_mode(
    settings: &AslSettings,
    tx: &mut Transmitter,
    console: &mut dyn Console,
) -> Result<AslReport, ModeError> {
    let input = console.prompt("Enter a word to spell: ")?;
    let word = if settings.uppercase_input {
        input.trim().to_uppercase()
    } else {
        input.trim().to_string()
    };

    let plan = encode_word(&word);
    for c in &plan.skipped {
        warn!(character = %c, "no hand pose for character");
        console.say(&format!("Invalid character skipped: {c}"));
    }
    if plan.is_empty() {
        console.say("Nothing to spell.");
        return Ok(AslReport {
            word,
            sent: Vec::new(),
            skipped: plan.skipped,
        });
    }

    info!(%word, letters = plan.letters.len(), "spelling");
    let mut sent = Vec::with_capacity(plan.letters.len());
    for &letter in &plan.letters {
        tx.send(&DeviceMessage::Letter(letter))?;
        console.say(&format!("Sent: {letter}"));
        sent.push(letter);
        if !settings.letter_delay.is_zero() {
            thread::sleep(settings.letter_delay);
        }
    }

    Ok(AslReport {
        word,
        sent,
        skipped: plan.skipped,
    })
}
