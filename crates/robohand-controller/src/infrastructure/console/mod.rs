//! Operator terminal.
//!
//! Modes talk to the operator through the [`Console`] trait: plain output
//! lines, blocking prompts, and a non-blocking "has `q` been typed?" poll used
//! by the camera-driven loops.
//!
//! # Why a reader thread? (for beginners)
//!
//! Reading standard input blocks until the operator presses Enter.  The
//! mirror loop cannot wait for that; it must keep streaming frames.  So a
//! single background thread owns stdin and pushes every line into an
//! `std::sync::mpsc` channel.  A prompt blocks on `recv()`; the quit poll
//! uses `try_recv()`, which returns at once when nothing was typed.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use thiserror::Error;
use tracing::debug;

pub mod mock;

/// Errors raised by a [`Console`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// Standard input reached end-of-file; no more answers will come.
    #[error("console input closed")]
    Closed,
}

/// The operator's terminal.
pub trait Console: Send {
    /// Prints one line.
    fn say(&mut self, line: &str);

    /// Prints `question` and blocks for one line of input, without its
    /// terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Closed`] at end of input.
    fn prompt(&mut self, question: &str) -> Result<String, ConsoleError>;

    /// `true` if the operator has asked to leave the current mode.
    ///
    /// Never blocks.  A closed input also counts as a quit request.
    fn quit_requested(&mut self) -> bool;
}

/// `true` for the line that stops a running mode.
pub fn is_quit_line(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "q" | "quit")
}

/// [`Console`] on the process's stdin and stdout.
pub struct StdinConsole {
    lines: Receiver<String>,
}

impl StdinConsole {
    /// Starts the stdin reader thread.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the thread cannot be spawned.
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                debug!("stdin closed");
            })?;
        Ok(Self { lines: rx })
    }
}

impl Console for StdinConsole {
    fn say(&mut self, line: &str) {
        println!("{line}");
    }

    fn prompt(&mut self, question: &str) -> Result<String, ConsoleError> {
        print!("{question}");
        // A failed flush only delays the prompt text.
        let _ = io::stdout().flush();
        self.lines.recv().map_err(|_| ConsoleError::Closed)
    }

    fn quit_requested(&mut self) -> bool {
        loop {
            match self.lines.try_recv() {
                Ok(line) if is_quit_line(&line) => return true,
                Ok(line) => debug!(%line, "ignored input while running"),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_line_accepts_q_and_quit() {
        assert!(is_quit_line("q"));
        assert!(is_quit_line(" Q "));
        assert!(is_quit_line("quit"));
        assert!(!is_quit_line("next"));
        assert!(!is_quit_line(""));
    }

    #[test]
    fn test_quit_poll_drains_until_q() {
        // Arrange
        let (tx, rx) = mpsc::channel();
        let mut console = StdinConsole { lines: rx };
        tx.send("hello".to_string()).unwrap();

        // Act / Assert
        assert!(!console.quit_requested());
        tx.send("x".to_string()).unwrap();
        tx.send("q".to_string()).unwrap();
        assert!(console.quit_requested());
    }

    #[test]
    fn test_closed_input_is_quit_and_closed_prompt() {
        let (tx, rx) = mpsc::channel::<String>();
        let mut console = StdinConsole { lines: rx };
        drop(tx);

        assert!(console.quit_requested());
        assert_eq!(console.prompt(""), Err(ConsoleError::Closed));
    }
}
