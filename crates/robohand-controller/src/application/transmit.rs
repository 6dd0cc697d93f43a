//! Transmitter: encodes device messages and writes them to the serial link.
//!
//! There is no acknowledgment and no retry.  A failed write is reported to
//! the caller, which ends the current mode.

use robohand_core::{encode_message, DeviceMessage, Framing, ProtocolError};
use thiserror::Error;
use tracing::debug;

/// Error raised by a [`SerialLink`].
#[derive(Debug, Error)]
pub enum LinkError {
    /// The port could not be opened or configured.
    #[error("cannot open serial port {port}: {reason}")]
    Open { port: String, reason: String },

    /// A write did not complete.
    #[error("serial write failed: {0}")]
    Write(String),
}

/// Error raised while sending one message.
#[derive(Debug, Error)]
pub enum TransmitError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("cannot encode message: {0}")]
    Encode(#[from] ProtocolError),
}

/// Byte sink towards the microcontroller.
///
/// The production implementation wraps a serial port; tests use
/// [`crate::infrastructure::serial::mock::RecordingLink`].
pub trait SerialLink: Send {
    /// Writes the whole buffer or fails.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}

/// Encodes and sends [`DeviceMessage`]s over a [`SerialLink`].
pub struct Transmitter {
    link: Box<dyn SerialLink>,
    framing: Framing,
    sent: u64,
}

impl Transmitter {
    pub fn new(link: Box<dyn SerialLink>, framing: Framing) -> Self {
        Self {
            link,
            framing,
            sent: 0,
        }
    }

    /// Encodes `msg` with the configured framing and writes it.
    ///
    /// # Errors
    ///
    /// Returns [`TransmitError::Encode`] for messages the protocol cannot
    /// represent, and [`TransmitError::Link`] if the write fails.
    pub fn send(&mut self, msg: &DeviceMessage) -> Result<(), TransmitError> {
        let bytes = encode_message(msg, self.framing)?;
        self.link.write_all(&bytes)?;
        self.sent += 1;
        let token = String::from_utf8_lossy(&bytes);
        debug!(
            kind = msg.kind(),
            token = %token.trim_end(),
            seq = self.sent,
            "sent"
        );
        Ok(())
    }

    /// Messages successfully written since start-up.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    pub fn describe(&self) -> String {
        self.link.describe()
    }
}
