//! Infrastructure layer for numpad-server.
//!
//! All I/O lives here: the HTTP listener and WebSocket upgrade, the
//! transports the sessions run over, OS key injection, and the config file.
//!
//! # What does NOT belong here?
//!
//! - Admission and eviction decisions (the hub, in the application layer)
//! - Frame decoding and key dispatch (the pumps)

pub mod config_file;
pub mod http_server;
pub mod key_injection;
pub mod memory_transport;
pub mod ws_transport;

pub use config_file::{load_config_file, ConfigError, FileConfig};
pub use http_server::NumpadServer;
pub use key_injection::platform_injector;
pub use memory_transport::{memory_transport, MemoryPeer, MemoryTransport};
