//! Optional TOML configuration file.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock configuration.  Command-line flags are applied on top of the loaded
//! file by `main.rs`, giving the precedence CLI/env > file > defaults.
//!
//! ```toml
//! [server]
//! port = 8080
//! bind = "0.0.0.0"
//! static_dir = "static"
//! shutdown_grace_secs = 5
//!
//! [session]
//! read_timeout_secs = 60
//! ping_interval_secs = 30
//! write_timeout_secs = 10
//! eviction_grace_ms = 100
//! outbound_capacity = 256
//! max_frame_bytes = 512
//! ```

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use numpad_core::MAX_FRAME_BYTES;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::DEFAULT_PORT;
use crate::domain::{ServerConfig, SessionConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The bind address is not an IP address.
    #[error("invalid bind address '{value}': {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: AddrParseError,
    },

    /// A value is outside its allowed range.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub session: SessionSection,
}

/// `[server]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    /// IP address to bind to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

/// `[session]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
    #[serde(default = "default_eviction_grace_ms")]
    pub eviction_grace_ms: u64,
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_shutdown_grace_secs() -> u64 {
    5
}
fn default_read_timeout_secs() -> u64 {
    60
}
fn default_ping_interval_secs() -> u64 {
    30
}
fn default_write_timeout_secs() -> u64 {
    10
}
fn default_eviction_grace_ms() -> u64 {
    100
}
fn default_outbound_capacity() -> usize {
    256
}
fn default_max_frame_bytes() -> usize {
    MAX_FRAME_BYTES
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            static_dir: default_static_dir(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            read_timeout_secs: default_read_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            write_timeout_secs: default_write_timeout_secs(),
            eviction_grace_ms: default_eviction_grace_ms(),
            outbound_capacity: default_outbound_capacity(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Loads a config file from `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (a missing file
/// is an error: the caller asked for it explicitly) and
/// [`ConfigError::Parse`] for malformed TOML or unknown keys.
pub fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parses config file content.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

impl FileConfig {
    /// Validates the settings and converts them into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] for a bind value that is not an
    /// IP address and [`ConfigError::Invalid`] for zero durations or sizes.
    pub fn into_server_config(self, dry_run: bool) -> Result<ServerConfig, ConfigError> {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                value: self.server.bind.clone(),
                source,
            })?;

        let s = &self.session;
        require_nonzero("session.read_timeout_secs", s.read_timeout_secs)?;
        require_nonzero("session.ping_interval_secs", s.ping_interval_secs)?;
        require_nonzero("session.write_timeout_secs", s.write_timeout_secs)?;
        require_nonzero("session.outbound_capacity", s.outbound_capacity as u64)?;
        if s.max_frame_bytes == 0 || s.max_frame_bytes > MAX_FRAME_BYTES {
            return Err(ConfigError::Invalid {
                field: "session.max_frame_bytes",
                reason: format!("must be between 1 and {MAX_FRAME_BYTES}"),
            });
        }

        Ok(ServerConfig {
            bind_addr: SocketAddr::new(ip, self.server.port),
            static_dir: self.server.static_dir,
            shutdown_grace: Duration::from_secs(self.server.shutdown_grace_secs),
            dry_run,
            session: SessionConfig {
                read_timeout: Duration::from_secs(s.read_timeout_secs),
                ping_interval: Duration::from_secs(s.ping_interval_secs),
                write_timeout: Duration::from_secs(s.write_timeout_secs),
                eviction_grace: Duration::from_millis(s.eviction_grace_ms),
                outbound_capacity: s.outbound_capacity,
                max_frame_bytes: s.max_frame_bytes,
            },
        })
    }
}

fn require_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
