//! Letter filtering for the ASL spelling mode.
//!
//! The hand's firmware holds one finger pose per letter `A`–`Z`, so a word
//! is spelled by sending its letters one at a time.  Anything outside that
//! range (digits, punctuation, lower-case letters, accented characters) has
//! no pose and is skipped rather than aborting the word.

/// A word split into transmittable letters and skipped characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AslPlan {
    /// Letters to transmit, in order.
    pub letters: Vec<char>,
    /// Characters that have no pose, in order of appearance.
    pub skipped: Vec<char>,
}

impl AslPlan {
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// `true` for the 26 upper-case ASCII letters.
pub fn is_spellable(c: char) -> bool {
    c.is_ascii_uppercase()
}

/// Splits `word` into the letters to send and the characters to skip.
///
/// The word is taken as-is: callers that want case-insensitive input must
/// upper-case it first.
///
/// # Examples
///
/// ```rust
/// use robohand_core::encode_word;
///
/// let plan = encode_word("AB1c");
/// assert_eq!(plan.letters, vec!['A', 'B']);
/// assert_eq!(plan.skipped, vec!['1', 'c']);
/// ```
pub fn encode_word(word: &str) -> AslPlan {
    let (letters, skipped) = word.chars().partition(|c| is_spellable(*c));
    AslPlan { letters, skipped }
}
