//! Link that decodes and logs tokens instead of touching hardware.
//!
//! Selected with `--dry-run`.  Useful for checking classification and the
//! wire format on a machine with no board attached.

use robohand_core::decode_token;
use tracing::{info, warn};

use crate::application::transmit::{LinkError, SerialLink};

/// Logs every token at `info`.  Never fails.
#[derive(Debug, Default)]
pub struct DryRunLink {
    written: u64,
}

impl DryRunLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens seen so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl SerialLink for DryRunLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.written += 1;
        let raw = String::from_utf8_lossy(bytes);
        match decode_token(&raw) {
            Ok(msg) => info!(token = %raw.trim_end(), ?msg, "dry-run"),
            Err(e) => warn!(token = %raw.trim_end(), error = %e, "dry-run: undecodable token"),
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "dry-run".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_accepts_valid_and_invalid_tokens() {
        let mut link = DryRunLink::new();

        link.write_all(b"rock\n").unwrap();
        link.write_all(b"not-a-token\n").unwrap();

        assert_eq!(link.written(), 2);
    }
}
