//! Serial link adapters.
//!
//! - [`port::SerialPortLink`] writes to a real USB-serial device.
//! - [`dry_run::DryRunLink`] logs what would have been sent.
//! - [`mock::RecordingLink`] records writes for tests.

pub mod dry_run;
pub mod mock;
pub mod port;

pub use dry_run::DryRunLink;
pub use port::SerialPortLink;
