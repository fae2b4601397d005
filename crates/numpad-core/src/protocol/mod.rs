//! Protocol module containing the JSON message types and their codec.

pub mod codec;
pub mod messages;

pub use codec::{
    decode_key_message, decode_server_message, encode_key_message, encode_server_message,
    ProtocolError,
};
pub use messages::*;
