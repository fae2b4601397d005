//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It is assembled once at startup from defaults, an optional TOML file and
//! the command line (in increasing order of precedence), then shared
//! read-only with every session.
//!
//! [`SessionConfig`] groups the per-connection liveness and sizing knobs the
//! hub and the pumps need.  Tests construct it directly with short durations.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use numpad_core::MAX_FRAME_BYTES;

/// Default HTTP + WebSocket port.
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum number of simultaneously admitted clients.
///
/// A policy constant: the hub is correct for any capacity, Remote Numpad
/// just never wants two devices typing at once.
pub const MAX_ACTIVE_CLIENTS: usize = 1;

/// Per-connection timing and buffer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// A session ends when nothing (not even a pong) arrives for this long.
    pub read_timeout: Duration,

    /// Interval between keepalive pings.  The first ping is sent one full
    /// interval after the session starts.
    pub ping_interval: Duration,

    /// Deadline for writing one frame (payload, ping, or close).
    pub write_timeout: Duration,

    /// How long an evicted client gets to flush its notice before the hub
    /// forces its transport closed.
    pub eviction_grace: Duration,

    /// Capacity of each session's outbound queue.
    pub outbound_capacity: usize,

    /// Largest inbound frame or message accepted from a client, in bytes.
    pub max_frame_bytes: usize,
}

impl Default for SessionConfig {
    /// | Field              | Default |
    /// |--------------------|---------|
    /// | read_timeout       | 60 s    |
    /// | ping_interval      | 30 s    |
    /// | write_timeout      | 10 s    |
    /// | eviction_grace     | 100 ms  |
    /// | outbound_capacity  | 256     |
    /// | max_frame_bytes    | 512     |
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
            write_timeout: Duration::from_secs(10),
            eviction_grace: Duration::from_millis(100),
            outbound_capacity: 256,
            max_frame_bytes: MAX_FRAME_BYTES,
        }
    }
}

/// All runtime configuration for the host.
///
/// # Example
///
/// ```rust
/// use numpad_server::domain::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8080);
/// assert!(!cfg.dry_run);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server (static files and `/ws`) listens on.
    pub bind_addr: SocketAddr,

    /// Directory served for every path other than `/ws`.
    pub static_dir: PathBuf,

    /// How long to wait for the HTTP server to drain on shutdown.
    pub shutdown_grace: Duration,

    /// Log key presses instead of injecting them.
    pub dry_run: bool,

    /// Per-connection settings.
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address.
            bind_addr: "0.0.0.0:8080".parse().unwrap(),
            static_dir: PathBuf::from("static"),
            shutdown_grace: Duration::from_secs(5),
            dry_run: false,
            session: SessionConfig::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
