//! Operating modes and the operator's menu tokens.
//!
//! The controller is always in exactly one of three modes.  Between modes the
//! operator types a selector at the menu prompt; between game rounds they
//! confirm with "next" or bail out with "q".

use std::fmt;
use std::str::FromStr;


/// What the controller is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Spell a typed word letter by letter.
    Asl,
    /// Mirror the live finger state.
    Mirror,
    /// Play rock-paper-scissors.
    Game,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Asl, Mode::Mirror, Mode::Game];

    /// Upper-case name, as announced to the device.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Asl => "ASL",
            Mode::Mirror => "MIRROR",
            Mode::Game => "GAME",
        }
    }

    /// Digit the menu accepts for this mode.
    pub const fn menu_key(self) -> char {
        match self {
            Mode::Asl => '0',
            Mode::Mirror => '1',
            Mode::Game => '2',
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match parse_menu_choice(s) {
            Some(MenuChoice::Enter(mode)) => Ok(mode),
            _ => Err(()),
        }
    }
}

/// A recognised answer at the mode menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Enter(Mode),
    Quit,
}

/// Parses a menu answer.  Digits, initials, and full names are accepted in
/// any case; anything else is `None` and the caller should ask again.
pub fn parse_menu_choice(input: &str) -> Option<MenuChoice> {
    let choice = match input.trim().to_ascii_lowercase().as_str() {
        "0" | "a" | "asl" => MenuChoice::Enter(Mode::Asl),
        "1" | "m" | "mirror" => MenuChoice::Enter(Mode::Mirror),
        "2" | "g" | "game" => MenuChoice::Enter(Mode::Game),
        "q" | "quit" => MenuChoice::Quit,
        _ => return None,
    };
    Some(choice)
}

/// Answer to the between-rounds confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPrompt {
    Continue,
    Quit,
}

/// Parses the between-rounds answer: `next`, `n`, or just Enter continue;
/// `q` or `quit` stops the game.
pub fn parse_round_prompt(input: &str) -> Option<RoundPrompt> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "n" | "next" => Some(RoundPrompt::Continue),
        "q" | "quit" => Some(RoundPrompt::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_accepts_digits_initials_and_names() {
        for (input, mode) in [
            ("0", Mode::Asl),
            ("a", Mode::Asl),
            ("ASL", Mode::Asl),
            ("1", Mode::Mirror),
            (" m ", Mode::Mirror),
            ("2", Mode::Game),
            ("Game", Mode::Game),
        ] {
            assert_eq!(parse_menu_choice(input), Some(MenuChoice::Enter(mode)), "{input:?}");
        }
    }

    #[test]
    fn test_menu_quit_tokens() {
        assert_eq!(parse_menu_choice("q"), Some(MenuChoice::Quit));
        assert_eq!(parse_menu_choice("QUIT"), Some(MenuChoice::Quit));
    }

    #[test]
    fn test_menu_rejects_unknown_input() {
        assert_eq!(parse_menu_choice("3"), None);
        assert_eq!(parse_menu_choice(""), None);
        assert_eq!(parse_menu_choice("mirror mode"), None);
    }

    #[test]
    fn test_menu_key_round_trips_through_parser() {
        for mode in Mode::ALL {
            let key = mode.menu_key().to_string();
            assert_eq!(key.parse::<Mode>(), Ok(mode));
        }
    }

    #[test]
    fn test_round_prompt() {
        assert_eq!(parse_round_prompt("next"), Some(RoundPrompt::Continue));
        assert_eq!(parse_round_prompt(""), Some(RoundPrompt::Continue));
        assert_eq!(parse_round_prompt("Q"), Some(RoundPrompt::Quit));
        assert_eq!(parse_round_prompt("maybe"), None);
    }
}
