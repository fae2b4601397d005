//! Remote Numpad terminal client entry point.
//!
//! Reads keypad keys from stdin, one line at a time, and sends them to a
//! Remote Numpad host.  Status changes and host payloads are printed to
//! stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! numpad-client [OPTIONS]
//!
//! Options:
//!   --url              <URL>   Host endpoint [default: ws://127.0.0.1:8080/ws]
//!   --max-attempts     <N>     Automatic reconnection attempts [default: 5]
//!   --retry-delay-secs <SECS>  Delay between attempts [default: 2]
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ stdin task     -- parse_line() -> Command
//!  ├─ Ctrl-C task    -- Command::Quit
//!  ├─ printer task   -- ClientEvent -> stdout
//!  └─ KeypadClient::run()
//! ```

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use numpad_core::{ConnectionState, ReconnectPolicy, ServerMessage, SessionStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use numpad_client::application::{parse_line, Command};
use numpad_client::infrastructure::{ClientConfig, ClientEvent, KeypadClient, DEFAULT_URL};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote Numpad terminal client.
#[derive(Debug, Parser)]
#[command(
    name = "numpad-client",
    about = "Send numeric keypad keys to a Remote Numpad host from a terminal",
    version
)]
struct Cli {
    /// WebSocket endpoint of the host.
    #[arg(long, env = "NUMPAD_URL", default_value = DEFAULT_URL)]
    url: String,

    /// Automatic reconnection attempts before giving up.
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Seconds to wait between reconnection attempts.
    #[arg(long, default_value_t = 2)]
    retry_delay_secs: u64,
}

impl Cli {
    fn into_config(self) -> ClientConfig {
        ClientConfig {
            url: self.url,
            policy: ReconnectPolicy {
                max_attempts: self.max_attempts,
                retry_delay: Duration::from_secs(self.retry_delay_secs),
            },
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = Cli::parse().into_config();
    info!(url = %config.url, "Remote Numpad client starting");

    let (command_tx, command_rx) = mpsc::channel::<Command>(64);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ClientEvent>();

    // ── stdin reader ──────────────────────────────────────────────────────────
    let stdin_tx = command_tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("failed to read stdin: {e}");
                    break;
                }
            };
            match parse_line(&line) {
                Ok(command) => {
                    if stdin_tx.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("{e}"),
            }
        }
        // End of input: leave the host cleanly.
        let _ = stdin_tx.send(Command::Quit).await;
    });

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = command_tx.send(Command::Quit).await;
        }
    });

    // ── Event printer ─────────────────────────────────────────────────────────
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(line) = describe(&event) {
                println!("{line}");
            }
        }
    });

    KeypadClient::new(config, command_rx, event_tx)
        .run()
        .await
        .context("client failed")?;

    let _ = printer.await;
    Ok(())
}

/// Renders an event for the terminal.  `None` for events not worth a line.
fn describe(event: &ClientEvent) -> Option<String> {
    let line = match event {
        ClientEvent::State(ConnectionState::Connecting) => "connecting...".to_string(),
        ClientEvent::State(ConnectionState::Connected) => {
            "connected: type keys (e.g. `12+3 enter`), :quit to exit".to_string()
        }
        ClientEvent::State(ConnectionState::Disconnected { replaced: true }) => {
            "another device took over; type :reconnect to take it back".to_string()
        }
        ClientEvent::State(ConnectionState::Disconnected { replaced: false }) => {
            "disconnected".to_string()
        }
        ClientEvent::State(ConnectionState::Failed) => {
            "could not reach the host; type :reload to try again".to_string()
        }
        ClientEvent::Server(ServerMessage::Status {
            status: SessionStatus::Disconnected,
            reason,
        }) => format!(
            "host ended the session: {}",
            reason.as_deref().unwrap_or("no reason given")
        ),
        ClientEvent::Server(ServerMessage::Status { .. }) => return None,
        ClientEvent::Server(ServerMessage::Error { error }) => format!("error: {error}"),
        ClientEvent::KeysDropped(count) => format!("not connected: {count} key(s) not sent"),
    };
    Some(line)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
