//! The outer menu loop.
//!
//! Runs the configured start-up mode, then asks the operator for the next
//! one until they quit or stdin closes.  A mode that fails (for example a
//! serial write error) is logged and the menu comes back; only a closed
//! console ends the program.

use robohand_core::{parse_menu_choice, DeviceMessage, MenuChoice, Mode, MoveSource};
use tracing::{error, info};

use super::asl::{run_asl_mode, AslSettings};
use super::game::{run_game_mode, GameSettings};
use super::mirror::{run_mirror_mode, MirrorSettings};
use super::transmit::Transmitter;
use super::ModeError;
use crate::infrastructure::camera::Camera;
use crate::infrastructure::console::{Console, ConsoleError};

const MENU: &str = "Select mode: 0 = ASL, 1 = Mirror, 2 = Game, q = quit: ";

/// Everything the modes need to know, assembled from the config file and CLI.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerSettings {
    /// Mode entered before the first menu.  `None` shows the menu first.
    pub initial_mode: Option<Mode>,
    /// Send a `Mode` token to the device on every mode entry.
    pub announce_modes: bool,
    pub asl: AslSettings,
    pub mirror: MirrorSettings,
    pub game: GameSettings,
}

/// Why the dispatcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The operator chose `q` at the menu.
    Quit,
    /// Standard input reached end-of-file.
    InputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Modes entered, including ones that failed.
    pub modes_run: u32,
    /// Modes that ended with an error.
    pub mode_errors: u32,
    /// Tokens written over the whole run.
    pub sent: u64,
    pub end: RunEnd,
}

/// Owns the adapters and runs modes one after another.
pub struct ModeDispatcher {
    settings: ControllerSettings,
    transmitter: Transmitter,
    camera: Box<dyn Camera>,
    console: Box<dyn Console>,
    opponent: Box<dyn MoveSource>,
}

impl ModeDispatcher {
    pub fn new(
        settings: ControllerSettings,
        transmitter: Transmitter,
        camera: Box<dyn Camera>,
        console: Box<dyn Console>,
        opponent: Box<dyn MoveSource>,
    ) -> Self {
        Self {
            settings,
            transmitter,
            camera,
            console,
            opponent,
        }
    }

    /// Runs until the operator quits or input closes.
    pub fn run(&mut self) -> RunSummary {
        let mut pending = self.settings.initial_mode;
        let mut modes_run = 0;
        let mut mode_errors = 0;

        let end = loop {
            let mode = match pending.take() {
                Some(mode) => mode,
                None => match self.select_mode() {
                    Ok(MenuChoice::Enter(mode)) => mode,
                    Ok(MenuChoice::Quit) => {
                        self.console.say("Exiting program.");
                        break RunEnd::Quit;
                    }
                    Err(ConsoleError::Closed) => break RunEnd::InputClosed,
                },
            };

            modes_run += 1;
            match self.run_mode(mode) {
                Ok(()) => {}
                Err(ModeError::Console(ConsoleError::Closed)) => break RunEnd::InputClosed,
                Err(e) => {
                    mode_errors += 1;
                    error!(%mode, error = %e, "mode aborted");
                    self.console.say(&format!("Error: {e}"));
                }
            }
        };

        let summary = RunSummary {
            modes_run,
            mode_errors,
            sent: self.transmitter.sent_count(),
            end,
        };
        info!(
            modes = summary.modes_run,
            errors = summary.mode_errors,
            sent = summary.sent,
            end = ?summary.end,
            "controller stopped"
        );
        summary
    }

    fn select_mode(&mut self) -> Result<MenuChoice, ConsoleError> {
        loop {
            let answer = self.console.prompt(MENU)?;
            match parse_menu_choice(&answer) {
                Some(choice) => return Ok(choice),
                None => self.console.say("Invalid choice. Try again."),
            }
        }
    }

    fn run_mode(&mut self, mode: Mode) -> Result<(), ModeError> {
        info!(%mode, "entering mode");
        if self.settings.announce_modes {
            self.transmitter.send(&DeviceMessage::Mode(mode))?;
        }

        let console = self.console.as_mut();
        match mode {
            Mode::Asl => {
                let report = run_asl_mode(&self.settings.asl, &mut self.transmitter, console)?;
                info!(
                    word = %report.word,
                    sent = report.sent.len(),
                    skipped = report.skipped.len(),
                    "word spelled"
                );
            }
            Mode::Mirror => {
                run_mirror_mode(
                    &self.settings.mirror,
                    self.camera.as_ref(),
                    &mut self.transmitter,
                    console,
                )?;
            }
            Mode::Game => {
                run_game_mode(
                    &self.settings.game,
                    self.camera.as_ref(),
                    self.opponent.as_mut(),
                    &mut self.transmitter,
                    console,
                )?;
            }
        }
        Ok(())
    }
}
