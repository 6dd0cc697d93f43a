//! Protocol module containing the device message types and the token codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_token, encode_message, Framing, ProtocolError};
pub use messages::*;
