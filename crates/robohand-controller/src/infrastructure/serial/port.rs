//! Hardware serial port backed by the `serialport` crate.
//!
//! Opening the port of most Arduino-class boards toggles DTR, which resets
//! the microcontroller.  The link therefore waits a configurable settle time
//! after opening before the first token is written; anything sent earlier is
//! lost while the bootloader runs.

use std::io::Write;
use std::thread;
use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use crate::application::transmit::{LinkError, SerialLink};

/// An open serial port.
pub struct SerialPortLink {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialPortLink {
    /// Opens `name` at `baud` (8N1) and waits `settle` for the board to reset.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Open`] if the device does not exist, is busy, or
    /// rejects the settings.
    pub fn open(
        name: &str,
        baud: u32,
        timeout: Duration,
        settle: Duration,
    ) -> Result<Self, LinkError> {
        let port = serialport::new(name, baud)
            .timeout(timeout)
            .open()
            .map_err(|e| LinkError::Open {
                port: name.to_string(),
                reason: e.to_string(),
            })?;

        info!(port = name, baud, "serial port opened");
        if !settle.is_zero() {
            info!(settle_ms = settle.as_millis() as u64, "waiting for the board to reset");
            thread::sleep(settle);
        }

        Ok(Self {
            name: name.to_string(),
            port,
        })
    }
}

impl SerialLink for SerialPortLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.port
            .write_all(bytes)
            .and_then(|()| self.port.flush())
            .map_err(|e| LinkError::Write(format!("{}: {e}", self.name)))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device_is_open_error() {
        // Arrange
        let name = "/dev/robohand-test-device-that-does-not-exist";

        // Act
        let result = SerialPortLink::open(name, 9600, Duration::from_millis(10), Duration::ZERO);

        // Assert
        match result {
            Err(LinkError::Open { port, .. }) => assert_eq!(port, name),
            Err(other) => panic!("expected Open error, got {other:?}"),
            Ok(_) => panic!("a nonexistent device must not open"),
        }
    }
}
