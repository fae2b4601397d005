//! Remote Numpad host: entry point.
//!
//! Serves the keypad page and the `/ws` WebSocket endpoint on one port and
//! injects every key pressed in the browser into this machine's desktop
//! session as a numeric keypad keystroke.
//!
//! # Usage
//!
//! ```text
//! numpad-server [OPTIONS]
//!
//! Options:
//!   --port       <PORT>  HTTP + WebSocket port [default: 8080]
//!   --bind       <IP>    Bind address [default: 0.0.0.0]
//!   --static-dir <DIR>   Directory served at / [default: static]
//!   --config     <FILE>  Optional TOML configuration file
//!   --dry-run            Log key presses instead of injecting them
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Flag           |
//! |---------------------|----------------|
//! | `PORT`              | `--port`       |
//! | `NUMPAD_BIND`       | `--bind`       |
//! | `NUMPAD_STATIC_DIR` | `--static-dir` |
//! | `NUMPAD_CONFIG`     | `--config`     |
//!
//! Flags and environment variables override the config file, which overrides
//! the built-in defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use numpad_server::application::{DryRunSink, KeyActionSink, PressKeyUseCase};
use numpad_server::domain::ServerConfig;
use numpad_server::infrastructure::{load_config_file, platform_injector, FileConfig, NumpadServer};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote Numpad host.
///
/// Turns any browser into a numeric keypad for this computer.
#[derive(Debug, Parser)]
#[command(
    name = "numpad-server",
    about = "Use a phone or browser as a numeric keypad for this computer",
    version
)]
struct Cli {
    /// TCP port for the HTTP and WebSocket server.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// IP address to bind to.
    ///
    /// `0.0.0.0` accepts connections from the LAN; `127.0.0.1` only from this
    /// machine.
    #[arg(long, env = "NUMPAD_BIND")]
    bind: Option<String>,

    /// Directory containing the keypad page.
    #[arg(long, env = "NUMPAD_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, env = "NUMPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Log key presses instead of injecting them.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Merges the config file (if any) and the CLI overrides into a
    /// [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the resulting
    /// settings are invalid.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut file = match &self.config {
            Some(path) => load_config_file(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => FileConfig::default(),
        };

        if let Some(port) = self.port {
            file.server.port = port;
        }
        if let Some(bind) = self.bind {
            file.server.bind = bind;
        }
        if let Some(static_dir) = self.static_dir {
            file.server.static_dir = static_dir;
        }

        file.into_server_config(self.dry_run)
            .context("invalid configuration")
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_server_config()?;

    let sink: Arc<dyn KeyActionSink> = if config.dry_run {
        info!("dry run: key presses will be logged, not injected");
        Arc::new(DryRunSink)
    } else {
        let injector = platform_injector().context("failed to initialise key injection")?;
        Arc::new(PressKeyUseCase::new(injector))
    };

    info!(
        "Remote Numpad starting: bind={}, static={}",
        config.bind_addr,
        config.static_dir.display()
    );

    let server = NumpadServer::bind(&config, sink).await?;
    server.run(shutdown_signal()).await
}

/// Resolves on Ctrl+C, or on SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C signal: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C - initiating graceful shutdown"),
        _ = terminate => info!("received SIGTERM - initiating graceful shutdown"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
