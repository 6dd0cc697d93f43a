//! Rock-paper-scissors rules, scoreboard, and opponent.
//!
//! A game is a run of rounds against the robotic hand.  Each round the player
//! shows a gesture, the hand picks one uniformly at random, and
//! [`resolve`] decides the round.  The first side to reach the target score
//! (3 by default) wins; draws score nothing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::domain::gesture::Gesture;

/// Rounds a side must win to take the game.
pub const DEFAULT_TARGET_SCORE: u8 = 3;

/// Result of a single round, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    UserWins,
    OpponentWins,
    Draw,
}

/// The two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    User,
    Opponent,
}

/// Decides one round with the cyclic table rock > scissors > paper > rock.
///
/// # Examples
///
/// ```rust
/// use robohand_core::{resolve, Gesture, Outcome};
///
/// assert_eq!(resolve(Gesture::Rock, Gesture::Scissors), Outcome::UserWins);
/// assert_eq!(resolve(Gesture::Rock, Gesture::Paper), Outcome::OpponentWins);
/// assert_eq!(resolve(Gesture::Paper, Gesture::Paper), Outcome::Draw);
/// ```
pub fn resolve(user: Gesture, opponent: Gesture) -> Outcome {
    if user == opponent {
        Outcome::Draw
    } else if user.beats() == opponent {
        Outcome::UserWins
    } else {
        Outcome::OpponentWins
    }
}

/// Errors raised by the scoreboard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// A round was recorded after one side had already reached the target.
    #[error("game is already over ({user}-{opponent})")]
    AlreadyOver { user: u8, opponent: u8 },
}

/// Running score of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    user: u8,
    opponent: u8,
    target: u8,
    rounds: u32,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_SCORE)
    }
}

impl Scoreboard {
    /// A fresh scoreboard.  A target of zero is bumped to one so a game
    /// always needs at least one decisive round.
    pub fn new(target: u8) -> Self {
        Self {
            user: 0,
            opponent: 0,
            target: target.max(1),
            rounds: 0,
        }
    }

    pub fn user(&self) -> u8 {
        self.user
    }

    pub fn opponent(&self) -> u8 {
        self.opponent
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    /// Rounds played so far, draws included.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }

    /// The side that reached the target, if any.
    pub fn winner(&self) -> Option<Side> {
        if self.user >= self.target {
            Some(Side::User)
        } else if self.opponent >= self.target {
            Some(Side::Opponent)
        } else {
            None
        }
    }

    /// Records a round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyOver`] once either side has reached the
    /// target; the score is left untouched so it never exceeds the target.
    pub fn record(&mut self, outcome: Outcome) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::AlreadyOver {
                user: self.user,
                opponent: self.opponent,
            });
        }
        self.rounds += 1;
        match outcome {
            Outcome::UserWins => self.user += 1,
            Outcome::OpponentWins => self.opponent += 1,
            Outcome::Draw => {}
        }
        Ok(())
    }
}

/// Anything that can pick the robotic hand's move.
#[cfg_attr(test, mockall::automock)]
pub trait MoveSource {
    fn next_move(&mut self) -> Gesture;
}

/// Opponent drawing each move uniformly at random.
pub struct RandomOpponent {
    rng: StdRng,
}

impl RandomOpponent {
    /// Seeds from the operating system's entropy source.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible move sequence, for replays and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSource for RandomOpponent {
    fn next_move(&mut self) -> Gesture {
        Gesture::ALL[self.rng.gen_range(0..Gesture::ALL.len())]
    }
}
