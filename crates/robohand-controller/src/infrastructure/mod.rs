//! Infrastructure layer for the controller.
//!
//! Contains device-facing adapters: the serial port to the microcontroller,
//! the hand-landmark detector process, the operator's terminal, and the
//! TOML configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `robohand_core`, but the domain crate never imports anything from here.

pub mod camera;
pub mod console;
pub mod serial;
pub mod storage;
