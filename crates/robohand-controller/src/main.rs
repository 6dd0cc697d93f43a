//! RoboHand controller: entry point.
//!
//! Streams hand states to a robotic hand over a serial link.  The operator
//! picks a mode at the terminal:
//!
//! - **ASL**: type a word, the hand spells it letter by letter.
//! - **Mirror**: the hand copies your fingers as seen by the camera.
//! - **Game**: rock-paper-scissors against the hand, first to three.
//!
//! # Usage
//!
//! ```text
//! robohand [OPTIONS]
//!
//! Options:
//!   --config <FILE>   Config file [default: platform config dir]
//!   --port <PORT>     Serial port [env: ROBOHAND_PORT]
//!   --baud <BAUD>     Baud rate [env: ROBOHAND_BAUD]
//!   --mode <MODE>     Start-up mode: asl, mirror, game, menu
//!   --replay <FILE>   Read landmark frames from a recording
//!   --dry-run         Log tokens instead of opening the serial port
//!   --init-config     Write a default config file and exit
//! ```
//!
//! Command-line values override the config file.  `RUST_LOG` overrides the
//! configured log level.  Logs go to stderr; prompts and results to stdout.
//!
//! # Hand detector
//!
//! Mirror and camera game modes read landmarks from `hand_detect.py` at the
//! repository root, started as `python3 hand_detect.py` from the working
//! directory.  Install its dependencies once:
//!
//! ```text
//! python3 -m pip install -r requirements-detector.txt
//! ```
//!
//! Point `camera.detector_command` / `camera.detector_args` elsewhere to run
//! it from another directory or a virtual environment.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use robohand_controller::application::dispatch::ModeDispatcher;
use robohand_controller::application::transmit::{SerialLink, Transmitter};
use robohand_controller::infrastructure::camera::{Camera, DetectorCamera, ReplayCamera};
use robohand_controller::infrastructure::console::StdinConsole;
use robohand_controller::infrastructure::serial::{DryRunLink, SerialPortLink};
use robohand_controller::infrastructure::storage::config::{
    config_file_path, load_config, save_config_to, AppConfig, CameraSource, ConfigError, StartMode,
};
use robohand_core::RandomOpponent;

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Asl,
    Mirror,
    Game,
    Menu,
}

impl From<ModeArg> for StartMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Asl => StartMode::Asl,
            ModeArg::Mirror => StartMode::Mirror,
            ModeArg::Game => StartMode::Game,
            ModeArg::Menu => StartMode::Menu,
        }
    }
}

/// RoboHand controller.
///
/// Classifies the operator's hand from camera landmarks and drives a robotic
/// hand over a serial link.
#[derive(Debug, Parser)]
#[command(
    name = "robohand",
    about = "Drive a robotic hand from typed words or camera hand gestures",
    version
)]
struct Cli {
    /// Config file to load instead of the platform default.
    #[arg(long, env = "ROBOHAND_CONFIG")]
    config: Option<PathBuf>,

    /// Serial port of the microcontroller (e.g. COM4, /dev/ttyACM0).
    #[arg(long, env = "ROBOHAND_PORT")]
    port: Option<String>,

    /// Serial baud rate.
    #[arg(long, env = "ROBOHAND_BAUD")]
    baud: Option<u32>,

    /// Mode to start in.  `menu` shows the mode menu first.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Read landmark frames from a recorded JSON-lines file instead of
    /// starting the detector.
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Decode and log tokens instead of writing to the serial port.
    #[arg(long)]
    dry_run: bool,

    /// Write a default config file (to `--config` or the platform default)
    /// and exit.
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file config.
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(port) = &self.port {
            cfg.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            cfg.serial.baud = baud;
        }
        if let Some(mode) = self.mode {
            cfg.controller.initial_mode = mode.into();
        }
        if let Some(path) = &self.replay {
            cfg.camera.source = CameraSource::Replay;
            cfg.camera.replay_path = Some(path.clone());
        }
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

fn open_link(cfg: &AppConfig, dry_run: bool) -> anyhow::Result<Box<dyn SerialLink>> {
    if dry_run {
        info!("dry run: tokens are logged, not sent");
        return Ok(Box::new(DryRunLink::new()));
    }
    let link = SerialPortLink::open(
        &cfg.serial.port,
        cfg.serial.baud,
        cfg.serial_timeout(),
        cfg.serial_settle(),
    )
    .map_err(|e| {
        error!("{e}");
        e
    })
    .context("could not connect to the robotic hand")?;
    Ok(Box::new(link))
}

fn build_camera(cfg: &AppConfig) -> anyhow::Result<Box<dyn Camera>> {
    let camera: Box<dyn Camera> = match cfg.camera.source {
        CameraSource::Detector => Box::new(DetectorCamera::new(
            cfg.camera.detector_command.clone(),
            cfg.camera.detector_args.clone(),
            cfg.camera.device_index,
            cfg.camera.min_detection_confidence,
        )),
        CameraSource::Replay => {
            let path = cfg
                .camera
                .replay_path
                .clone()
                .context("camera.replay_path is not set")?;
            Box::new(ReplayCamera::new(path, cfg.camera.min_detection_confidence))
        }
    };
    info!(camera = %camera.describe(), "landmark source configured");
    Ok(camera)
}

fn write_default_config(cli: &Cli) -> anyhow::Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path()?,
    };
    save_config_to(&path, &AppConfig::default())
        .with_context(|| format!("cannot write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The config names the log level, so it is read before logging starts.
    let loaded: Result<AppConfig, ConfigError> = if cli.init_config {
        Ok(AppConfig::default())
    } else {
        load_config(cli.config.as_deref())
    };
    let level = loaded
        .as_ref()
        .map(|cfg| cfg.controller.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&level);

    if cli.init_config {
        return write_default_config(&cli);
    }

    let mut cfg = loaded.context("failed to load configuration")?;
    cli.apply(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    info!(
        port = %cfg.serial.port,
        baud = cfg.serial.baud,
        start = ?cfg.controller.initial_mode,
        "RoboHand controller starting"
    );

    let link = open_link(&cfg, cli.dry_run)?;
    let transmitter = Transmitter::new(link, cfg.serial.framing);
    let camera = build_camera(&cfg)?;
    let console = StdinConsole::spawn().context("cannot read the terminal")?;

    let mut dispatcher = ModeDispatcher::new(
        cfg.controller_settings(),
        transmitter,
        camera,
        Box::new(console),
        Box::new(RandomOpponent::new()),
    );
    let summary = dispatcher.run();

    info!(sent = summary.sent, "RoboHand controller stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_arguments_overrides_nothing() {
        // Arrange
        let cli = Cli::parse_from(["robohand"]);
        let mut cfg = AppConfig::default();

        // Act
        cli.apply(&mut cfg);

        // Assert
        assert_eq!(cfg, AppConfig::default());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_overrides_port_baud_and_mode() {
        let cli = Cli::parse_from([
            "robohand", "--port", "COM9", "--baud", "115200", "--mode", "menu",
        ]);
        let mut cfg = AppConfig::default();

        cli.apply(&mut cfg);

        assert_eq!(cfg.serial.port, "COM9");
        assert_eq!(cfg.serial.baud, 115200);
        assert_eq!(cfg.controller.initial_mode, StartMode::Menu);
    }

    #[test]
    fn test_replay_flag_switches_camera_source() {
        let cli = Cli::parse_from(["robohand", "--replay", "session.jsonl", "--dry-run"]);
        let mut cfg = AppConfig::default();

        cli.apply(&mut cfg);

        assert_eq!(cfg.camera.source, CameraSource::Replay);
        assert_eq!(cfg.camera.replay_path, Some(PathBuf::from("session.jsonl")));
        assert!(cli.dry_run);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["robohand", "--mode", "karaoke"]).is_err());
    }
}
