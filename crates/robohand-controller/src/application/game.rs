//! Rock-paper-scissors against the robotic hand.
//!
//! Each round:
//!
//! 1. The player's move is read from the camera (smoothed over a vote
//!    window) or typed at the keyboard.
//! 2. The hand's move is drawn from the injected [`MoveSource`] and sent.
//! 3. The round is resolved, the score printed and, optionally, sent.
//! 4. Unless the game is over, the operator confirms the next round.
//!
//! The scoreboard is created fresh on every entry; first to the target
//! score (3 by default) wins.

use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use robohand_core::domain::game::DEFAULT_TARGET_SCORE;
use robohand_core::domain::vote::DEFAULT_WINDOW;
use robohand_core::{
    parse_round_prompt, resolve, DeviceMessage, Gesture, GestureClassifier, MoveSource, Outcome,
    RoundPrompt, Scoreboard, Side, VoteWindow,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::transmit::Transmitter;
use super::{ModeError, SessionEnd};
use crate::infrastructure::camera::{Camera, FrameFeed};
use crate::infrastructure::console::{is_quit_line, Console};

/// Pause after each round so the hand's pose can be seen.
pub const DEFAULT_ROUND_PAUSE: Duration = Duration::from_millis(500);

/// Where the player's move comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveInput {
    #[default]
    Camera,
    Keyboard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    pub input: MoveInput,
    pub target_score: u8,
    /// Capture window for the majority vote.  Zero takes the first frame
    /// that classifies.
    pub vote_window: Duration,
    /// Ask "next or q" between rounds.
    pub confirm_rounds: bool,
    pub round_pause: Duration,
    /// Also send `USER:<gesture>` and `SCORE:<u>,<h>` after each round.
    pub score_tokens: bool,
    pub classifier: GestureClassifier,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            input: MoveInput::default(),
            target_score: DEFAULT_TARGET_SCORE,
            vote_window: DEFAULT_WINDOW,
            confirm_rounds: true,
            round_pause: DEFAULT_ROUND_PAUSE,
            score_tokens: true,
            classifier: GestureClassifier::default(),
        }
    }
}

/// Final state of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub user: u8,
    pub opponent: u8,
    pub rounds: u32,
    pub winner: Option<Side>,
    pub end: SessionEnd,
}

impl GameSummary {
    fn from_board(board: &Scoreboard, end: SessionEnd) -> Self {
        Self {
            user: board.user(),
            opponent: board.opponent(),
            rounds: board.rounds(),
            winner: board.winner(),
            end,
        }
    }
}

/// Result of waiting for the player's move.
enum Capture {
    Move(Gesture),
    /// A vote window closed without a recognised gesture.
    NoGesture,
    Quit,
    Lost(String),
}

/// Plays one game to the target score.
///
/// # Errors
///
/// Returns [`ModeError::Transmit`] if a write fails and
/// [`ModeError::Console`] if input closes at a prompt.
pub fn run_game_mode(
    settings: &GameSettings,
    camera: &dyn Camera,
    opponent: &mut dyn MoveSource,
    tx: &mut Transmitter,
    console: &mut dyn Console,
) -> Result<GameSummary, ModeError> {
    run_game_with_clock(settings, camera, opponent, tx, console, &mut Instant::now)
}

fn run_game_with_clock(
    settings: &GameSettings,
    camera: &dyn Camera,
    opponent: &mut dyn MoveSource,
    tx: &mut Transmitter,
    console: &mut dyn Console,
    clock: &mut dyn FnMut() -> Instant,
) -> Result<GameSummary, ModeError> {
    let mut board = Scoreboard::new(settings.target_score);

    let mut feed = match settings.input {
        MoveInput::Camera => match camera.open() {
            Ok(feed) => Some(feed),
            Err(e) => {
                warn!(camera = %camera.describe(), error = %e, "camera open failed");
                console.say("Error: webcam not detected.");
                return Ok(GameSummary::from_board(&board, SessionEnd::CameraUnavailable));
            }
        },
        MoveInput::Keyboard => None,
    };

    console.say(&format!(
        "Rock, paper, scissors! First to {} wins.",
        board.target()
    ));
    info!(input = ?settings.input, target = board.target(), "game started");

    let end = 'rounds: loop {
        console.say(&format!("Round {}", board.rounds() + 1));
        let user = loop {
            let capture = match feed.as_deref_mut() {
                Some(feed) => capture_from_camera(settings, feed, console, clock),
                None => prompt_move(console)?,
            };
            match capture {
                Capture::Move(gesture) => break gesture,
                Capture::NoGesture => console.say("No gesture detected. Try again."),
                Capture::Quit => break 'rounds SessionEnd::OperatorQuit,
                Capture::Lost(reason) => {
                    console.say("Error: failed to capture frame.");
                    break 'rounds SessionEnd::FeedLost(reason);
                }
            }
        };

        let hand = opponent.next_move();
        tx.send(&DeviceMessage::Gesture(hand))?;

        let outcome = resolve(user, hand);
        board.record(outcome)?;
        debug!(%user, %hand, ?outcome, "round resolved");

        console.say(&format!("You: {user} | Hand: {hand} | {}", round_verdict(outcome)));
        console.say(&format!(
            "Score: You {} - Hand {}",
            board.user(),
            board.opponent()
        ));

        if settings.score_tokens {
            tx.send(&DeviceMessage::UserGesture(user))?;
            tx.send(&DeviceMessage::Score {
                user: board.user(),
                opponent: board.opponent(),
            })?;
        }

        if !settings.round_pause.is_zero() {
            thread::sleep(settings.round_pause);
        }

        if board.is_over() {
            break SessionEnd::Completed;
        }
        if settings.confirm_rounds && confirm_next_round(console)? == RoundPrompt::Quit {
            break SessionEnd::OperatorQuit;
        }
    };

    match board.winner() {
        Some(Side::User) => console.say(&format!(
            "You won the game {}-{}!",
            board.user(),
            board.opponent()
        )),
        Some(Side::Opponent) => console.say(&format!(
            "The hand wins the game {}-{}!",
            board.opponent(),
            board.user()
        )),
        None => console.say(&format!(
            "Game abandoned at {}-{}.",
            board.user(),
            board.opponent()
        )),
    }

    let summary = GameSummary::from_board(&board, end);
    info!(
        user = summary.user,
        opponent = summary.opponent,
        rounds = summary.rounds,
        end = ?summary.end,
        "game finished"
    );
    Ok(summary)
}

fn round_verdict(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::UserWins => "You win this round!",
        Outcome::OpponentWins => "The hand wins this round!",
        Outcome::Draw => "Draw.",
    }
}

/// Reads the player's move from the camera.
///
/// With a vote window, every frame inside the window is classified and the
/// majority wins; a window with no recognised gesture yields
/// [`Capture::NoGesture`] and the caller asks again.
fn capture_from_camera(
    settings: &GameSettings,
    feed: &mut dyn FrameFeed,
    console: &mut dyn Console,
    clock: &mut dyn FnMut() -> Instant,
) -> Capture {
    console.say("Show your move to the camera (q to quit).");
    if settings.vote_window.is_zero() {
        first_recognised(settings, feed, console)
    } else {
        collect_vote(settings, feed, console, clock)
    }
}

fn collect_vote(
    settings: &GameSettings,
    feed: &mut dyn FrameFeed,
    console: &mut dyn Console,
    clock: &mut dyn FnMut() -> Instant,
) -> Capture {
    let mut window = VoteWindow::new(settings.vote_window, clock());
    loop {
        if console.quit_requested() {
            return Capture::Quit;
        }
        let frame = match feed.next_frame() {
            Ok(frame) => frame,
            Err(e) => return Capture::Lost(e.to_string()),
        };
        window.push(frame.primary_hand().and_then(|h| settings.classifier.classify(h)));
        if window.is_complete(clock()) {
            break;
        }
    }

    let verdict = window.verdict();
    debug!(frames = window.len(), ?verdict, "vote window closed");
    match verdict {
        Some(gesture) => Capture::Move(gesture),
        None => Capture::NoGesture,
    }
}

fn first_recognised(
    settings: &GameSettings,
    feed: &mut dyn FrameFeed,
    console: &mut dyn Console,
) -> Capture {
    loop {
        if console.quit_requested() {
            return Capture::Quit;
        }
        match feed.next_frame() {
            Ok(frame) => {
                if let Some(gesture) = frame
                    .primary_hand()
                    .and_then(|h| settings.classifier.classify(h))
                {
                    return Capture::Move(gesture);
                }
            }
            Err(e) => return Capture::Lost(e.to_string()),
        }
    }
}

fn prompt_move(console: &mut dyn Console) -> Result<Capture, ModeError> {
    loop {
        let answer = console.prompt("Your move (rock/paper/scissors, q to quit): ")?;
        if is_quit_line(&answer) {
            return Ok(Capture::Quit);
        }
        match Gesture::from_str(&answer) {
            Ok(gesture) => return Ok(Capture::Move(gesture)),
            Err(()) => console.say("Invalid move. Try again."),
        }
    }
}

fn confirm_next_round(console: &mut dyn Console) -> Result<RoundPrompt, ModeError> {
    loop {
        let answer = console.prompt("Type next for the next round, or q to quit: ")?;
        match parse_round_prompt(&answer) {
            Some(choice) => return Ok(choice),
            None => console.say("Please type next or q."),
        }
    }
}
