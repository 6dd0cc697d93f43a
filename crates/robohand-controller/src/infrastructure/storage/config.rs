//! TOML-based configuration for the controller.
//!
//! Reads `AppConfig` from the path given with `--config`, or from the
//! platform-appropriate config file:
//! - Windows:  `%APPDATA%\RoboHand\config.toml`
//! - Linux:    `~/.config/robohand/config.toml`
//! - macOS:    `~/Library/Application Support/RoboHand/config.toml`
//!
//! Every field has a default, so a missing file, an empty file, or a file
//! with only a few keys all work:
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//!
//! [mirror]
//! encoding = "binary"
//!
//! [game]
//! input = "keyboard"
//! confirm_rounds = false
//! ```
//!
//! Unknown enum strings (e.g. `encoding = "analog"`) are rejected by serde
//! and reported as [`ConfigError::Parse`]; out-of-range numbers are caught by
//! [`AppConfig::validate`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use robohand_core::domain::fingers::DEFAULT_ANGLE_TOLERANCE;
use robohand_core::domain::gesture::DEFAULT_MARGIN;
use robohand_core::protocol::messages::DEFAULT_WRIST_DEGREES;
use robohand_core::{Framing, GestureClassifier, Mode, Reference};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::asl::AslSettings;
use crate::application::dispatch::ControllerSettings;
use crate::application::game::{GameSettings, MoveInput};
use crate::application::mirror::{MirrorEncoding, MirrorSettings};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub controller: ControllerConfig,
    pub serial: SerialConfig,
    pub camera: CameraConfig,
    pub classifier: ClassifierConfig,
    pub mirror: MirrorConfig,
    pub asl: AslConfig,
    pub game: GameConfig,
}

/// Mode a session starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    #[default]
    Asl,
    Mirror,
    Game,
    /// Show the menu first.
    Menu,
}

impl StartMode {
    pub fn mode(self) -> Option<Mode> {
        match self {
            StartMode::Asl => Some(Mode::Asl),
            StartMode::Mirror => Some(Mode::Mirror),
            StartMode::Game => Some(Mode::Game),
            StartMode::Menu => None,
        }
    }
}

/// General controller behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    #[serde(default)]
    pub initial_mode: StartMode,
    /// `tracing` level filter: `"error"`, `"warn"`, `"info"`, `"debug"`,
    /// `"trace"`.  `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Serial link to the microcontroller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
    /// Read/write timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Wait after opening while the board resets, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default)]
    pub framing: Framing,
    /// Send `ASL` / `MIRROR` / `GAME` on every mode entry.
    #[serde(default)]
    pub announce_modes: bool,
}

/// Where landmark frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSource {
    #[default]
    Detector,
    Replay,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraConfig {
    #[serde(default)]
    pub source: CameraSource,
    /// Program that prints landmark frames as JSON lines.
    #[serde(default = "default_detector_command")]
    pub detector_command: String,
    #[serde(default = "default_detector_args")]
    pub detector_args: Vec<String>,
    /// Camera index passed to the detector as `--camera <n>`.
    #[serde(default)]
    pub device_index: u32,
    /// Recorded frames for `source = "replay"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_path: Option<PathBuf>,
    #[serde(default = "default_min_detection_confidence")]
    pub min_detection_confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// Distance a fingertip must clear its reference to count as up/down.
    #[serde(default = "default_margin")]
    pub margin: f32,
    #[serde(default)]
    pub reference: Reference,
    /// Half-bent band used by angle mirroring.
    #[serde(default = "default_angle_tolerance")]
    pub angle_tolerance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorConfig {
    #[serde(default)]
    pub encoding: MirrorEncoding,
    #[serde(default = "default_wrist_degrees")]
    pub wrist_degrees: u16,
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AslConfig {
    #[serde(default = "default_letter_delay_ms")]
    pub letter_delay_ms: u64,
    /// Fold typed input to upper case before spelling.  Off by default, so
    /// lower-case letters are reported as skipped.
    #[serde(default)]
    pub uppercase_input: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    #[serde(default)]
    pub input: MoveInput,
    #[serde(default = "default_target_score")]
    pub target_score: u8,
    /// Majority-vote capture window in milliseconds; 0 takes the first
    /// recognised frame.
    #[serde(default = "default_vote_window_ms")]
    pub vote_window_ms: u64,
    #[serde(default = "default_true")]
    pub confirm_rounds: bool,
    #[serde(default = "default_round_pause_ms")]
    pub round_pause_ms: u64,
    #[serde(default = "default_true")]
    pub score_tokens: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_port() -> String {
    if cfg!(target_os = "windows") {
        "COM4".to_string()
    } else {
        "/dev/ttyACM0".to_string()
    }
}
fn default_baud() -> u32 {
    9600
}
fn default_timeout_ms() -> u64 {
    1000
}
fn default_settle_ms() -> u64 {
    2000
}
fn default_detector_command() -> String {
    "python3".to_string()
}
fn default_detector_args() -> Vec<String> {
    vec!["hand_detect.py".to_string()]
}
fn default_min_detection_confidence() -> f32 {
    0.7
}
fn default_margin() -> f32 {
    DEFAULT_MARGIN
}
fn default_angle_tolerance() -> f32 {
    DEFAULT_ANGLE_TOLERANCE
}
fn default_wrist_degrees() -> u16 {
    DEFAULT_WRIST_DEGREES
}
fn default_send_interval_ms() -> u64 {
    100
}
fn default_letter_delay_ms() -> u64 {
    500
}
fn default_target_score() -> u8 {
    3
}
fn default_vote_window_ms() -> u64 {
    3000
}
fn default_round_pause_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_mode: StartMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud: default_baud(),
            timeout_ms: default_timeout_ms(),
            settle_ms: default_settle_ms(),
            framing: Framing::default(),
            announce_modes: false,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: CameraSource::default(),
            detector_command: default_detector_command(),
            detector_args: default_detector_args(),
            device_index: 0,
            replay_path: None,
            min_detection_confidence: default_min_detection_confidence(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            reference: Reference::default(),
            angle_tolerance: default_angle_tolerance(),
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            encoding: MirrorEncoding::default(),
            wrist_degrees: default_wrist_degrees(),
            send_interval_ms: default_send_interval_ms(),
        }
    }
}

impl Default for AslConfig {
    fn default() -> Self {
        Self {
            letter_delay_ms: default_letter_delay_ms(),
            uppercase_input: false,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            input: MoveInput::default(),
            target_score: default_target_score(),
            vote_window_ms: default_vote_window_ms(),
            confirm_rounds: true,
            round_pause_ms: default_round_pause_ms(),
            score_tokens: true,
        }
    }
}

// ── Validation and conversion ─────────────────────────────────────────────────

impl AppConfig {
    /// Checks values serde cannot: ranges and cross-field requirements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.serial.port.trim().is_empty() {
            return invalid("serial.port must not be empty".to_string());
        }
        if self.serial.baud == 0 {
            return invalid("serial.baud must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.camera.min_detection_confidence) {
            return invalid(format!(
                "camera.min_detection_confidence must be within 0..=1, got {}",
                self.camera.min_detection_confidence
            ));
        }
        if self.camera.source == CameraSource::Replay && self.camera.replay_path.is_none() {
            return invalid(
                "camera.replay_path is required when camera.source = \"replay\"".to_string(),
            );
        }
        if !(0.0..1.0).contains(&self.classifier.margin) {
            return invalid(format!(
                "classifier.margin must be within 0..1, got {}",
                self.classifier.margin
            ));
        }
        if !(0.0..1.0).contains(&self.classifier.angle_tolerance) {
            return invalid(format!(
                "classifier.angle_tolerance must be within 0..1, got {}",
                self.classifier.angle_tolerance
            ));
        }
        if self.game.target_score == 0 {
            return invalid("game.target_score must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn serial_timeout(&self) -> Duration {
        Duration::from_millis(self.serial.timeout_ms)
    }

    pub fn serial_settle(&self) -> Duration {
        Duration::from_millis(self.serial.settle_ms)
    }

    /// Builds the settings the mode dispatcher runs with.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            initial_mode: self.controller.initial_mode.mode(),
            announce_modes: self.serial.announce_modes,
            asl: AslSettings {
                letter_delay: Duration::from_millis(self.asl.letter_delay_ms),
                uppercase_input: self.asl.uppercase_input,
            },
            mirror: MirrorSettings {
                encoding: self.mirror.encoding,
                wrist_degrees: self.mirror.wrist_degrees,
                send_interval: Duration::from_millis(self.mirror.send_interval_ms),
                angle_tolerance: self.classifier.angle_tolerance,
            },
            game: GameSettings {
                input: self.game.input,
                target_score: self.game.target_score,
                vote_window: Duration::from_millis(self.game.vote_window_ms),
                confirm_rounds: self.game.confirm_rounds,
                round_pause: Duration::from_millis(self.game.round_pause_ms),
                score_tokens: self.game.score_tokens,
                classifier: GestureClassifier::new(
                    self.classifier.margin,
                    self.classifier.reference,
                ),
            },
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from `path`, or from the platform default location when
/// `path` is `None`.
///
/// A missing default file yields `AppConfig::default()`.  An explicitly
/// named file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, [`ConfigError::Parse`]
/// if the TOML is malformed, and [`ConfigError::Invalid`] if validation fails.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let cfg = match path {
        Some(path) => read_config(path)?,
        None => {
            let path = config_file_path()?;
            match std::fs::read_to_string(&path) {
                Ok(content) => toml::from_str(&content)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
                Err(e) => return Err(ConfigError::Io { path, source: e }),
            }
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Reads and parses the config at `path`.  The file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the `RoboHand`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RoboHand"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("robohand"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("RoboHand"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
