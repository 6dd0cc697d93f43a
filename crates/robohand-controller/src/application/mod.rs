//! Application layer use cases for the controller.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules in `robohand-core`) and the infrastructure (serial port,
//! camera process, terminal).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil an operator goal (e.g., "spell
//!   this word on the robotic hand").
//! - **Depend on abstractions** (`SerialLink`, `Camera`, `Console`) rather
//!   than concrete devices, so every mode can be driven by mocks in tests.
//!
//! # Sub-modules
//!
//! - **`transmit`** – Encodes device messages and writes them to the link.
//! - **`asl`**      – Spells a typed word letter by letter.
//! - **`mirror`**   – Streams the live finger state every frame.
//! - **`game`**     – Plays rock-paper-scissors to three.
//! - **`dispatch`** – The outer menu loop that picks the next mode.

use thiserror::Error;

use crate::infrastructure::console::ConsoleError;
use robohand_core::GameError;

pub mod asl;
pub mod dispatch;
pub mod game;
pub mod mirror;
pub mod transmit;

use transmit::TransmitError;

/// Why a camera-driven mode stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The mode ran to its natural end (a game reached its target score).
    Completed,
    /// The operator pressed `q`.
    OperatorQuit,
    /// The camera could not be opened; the mode returned immediately.
    CameraUnavailable,
    /// A frame could not be read; the reason is kept for the log.
    FeedLost(String),
}

/// Errors that abort the current mode.  The dispatcher logs them and
/// returns to the mode menu, except for a closed console which ends the
/// program.
#[derive(Debug, Error)]
pub enum ModeError {
    #[error(transparent)]
    Transmit(#[from] TransmitError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error(transparent)]
    Game(#[from] GameError),
}
