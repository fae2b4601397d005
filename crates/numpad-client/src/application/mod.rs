//! Application layer for the terminal client.
//!
//! - **`commands`** – Turns lines typed in the terminal into key presses and
//!   connection commands.
//!
//! The connection loop itself, including reconnection, lives in the
//! infrastructure layer because it owns the socket.

pub mod commands;

pub use commands::{parse_line, Command, CommandError};
