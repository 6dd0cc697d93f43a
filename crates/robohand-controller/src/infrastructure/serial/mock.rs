//! Recording serial link for unit and integration tests.
//!
//! Clones share the same buffer, so a test can hand one clone to the
//! [`Transmitter`](crate::application::transmit::Transmitter) and inspect
//! the other afterwards.

use std::sync::{Arc, Mutex};

use crate::application::transmit::{LinkError, SerialLink};

/// A [`SerialLink`] that stores every write in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingLink {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A link whose every write fails, as if the cable had been pulled.
    pub fn failing() -> Self {
        let link = Self::new();
        link.set_should_fail(true);
        link
    }

    /// Switches write failures on or off.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock().expect("lock poisoned") = fail;
    }

    /// Raw writes in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().expect("lock poisoned").clone()
    }

    /// Writes decoded as text, terminators included.
    pub fn tokens(&self) -> Vec<String> {
        self.writes()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Writes with the trailing newline removed.
    pub fn trimmed_tokens(&self) -> Vec<String> {
        self.tokens()
            .into_iter()
            .map(|t| t.trim_end().to_string())
            .collect()
    }
}

impl SerialLink for RecordingLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if *self.should_fail.lock().expect("lock poisoned") {
            return Err(LinkError::Write("mock link failure".to_string()));
        }
        self.writes.lock().expect("lock poisoned").push(bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
