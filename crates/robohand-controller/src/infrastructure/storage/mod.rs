//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML file from `--config` or the
//! platform config directory, falls back to defaults when it is absent, and
//! converts the result into the settings the modes consume.

pub mod config;
