//! WebSocket connection loop for the terminal client.
//!
//! [`KeypadClient::run`] owns the socket and a [`ReconnectMachine`].  It
//! performs whatever [`ReconnectAction`] the machine asks for (connect now,
//! wait and retry, or sit idle) and feeds every socket event back into it.
//!
//! ```text
//!  stdin task ──Command──▶ KeypadClient::run ──ClientEvent──▶ printer task
//!                               │     ▲
//!                   key messages│     │status / error payloads
//!                               ▼     │
//!                             host /ws endpoint
//! ```
//!
//! Keys typed while no connection is open are dropped, never queued: a
//! stale keystroke replayed after a reconnect would land in whatever window
//! has focus by then.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::{SinkExt, StreamExt};
use numpad_core::{
    decode_server_message, encode_key_message, ConnectionState, KeyMessage, NumpadKey,
    ReconnectAction, ReconnectMachine, ReconnectPolicy, ServerMessage,
};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::application::commands::Command;

/// Host endpoint used when none is configured.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";

/// Errors that stop the client before it connects.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid host URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
}

/// Settings for the connection loop.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the host, e.g. `ws://192.168.1.20:8080/ws`.
    pub url: String,
    pub policy: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            policy: ReconnectPolicy::default(),
        }
    }
}

/// What the connection loop reports to the user interface.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The connection state changed.
    State(ConnectionState),
    /// A control payload arrived from the host.
    Server(ServerMessage),
    /// This many keys were typed while disconnected and were not sent.
    KeysDropped(usize),
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Step {
    Continue(ReconnectAction),
    Quit,
}

/// The terminal client's connection loop.
pub struct KeypadClient {
    config: ClientConfig,
    machine: ReconnectMachine,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<ClientEvent>,
    last_state: Option<ConnectionState>,
}

impl KeypadClient {
    pub fn new(
        config: ClientConfig,
        commands: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        let machine = ReconnectMachine::new(config.policy);
        Self {
            config,
            machine,
            commands,
            events,
            last_state: None,
        }
    }

    /// Connects and keeps the connection going until [`Command::Quit`]
    /// arrives or the command channel closes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the configured URL is not a
    /// WebSocket URL.  Connection failures are retried, not returned.
    pub async fn run(mut self) -> Result<(), ClientError> {
        self.config
            .url
            .as_str()
            .into_client_request()
            .map_err(|source| ClientError::InvalidUrl {
                url: self.config.url.clone(),
                source,
            })?;

        let mut action = self.machine.start();
        self.emit_state();

        loop {
            let step = match action {
                ReconnectAction::Connect => self.connect().await,
                ReconnectAction::RetryAfter(delay) => self.wait_for_retry(delay).await,
                ReconnectAction::Stay => self.idle().await,
            };
            match step {
                Step::Continue(next) => action = next,
                Step::Quit => break,
            }
        }

        info!("client stopped");
        Ok(())
    }

    // ── Connection states ────────────────────────────────────────────────────

    async fn connect(&mut self) -> Step {
        info!(url = %self.config.url, "connecting to host");
        match connect_async(self.config.url.as_str()).await {
            Ok((socket, _response)) => {
                info!("connected");
                self.machine.on_open();
                self.emit_state();
                self.session(socket).await
            }
            Err(e) => {
                warn!("connection attempt failed: {e}");
                self.closed()
            }
        }
    }

    async fn session(&mut self, mut socket: Socket) -> Step {
        loop {
            tokio::select! {
                inbound = socket.next() => match inbound {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text),
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "host closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("connection error: {e}");
                        break;
                    }
                    None => break,
                },
                command = self.commands.recv() => match command {
                    Some(Command::Keys(keys)) => {
                        if let Err(e) = send_keys(&mut socket, &keys).await {
                            warn!("failed to send keys: {e}");
                            break;
                        }
                    }
                    Some(Command::Reconnect) => debug!("already connected"),
                    Some(Command::Reload) => {
                        close_quietly(&mut socket).await;
                        let next = self.machine.reset();
                        self.emit_state();
                        return Step::Continue(next);
                    }
                    Some(Command::Quit) | None => {
                        close_quietly(&mut socket).await;
                        return Step::Quit;
                    }
                },
            }
        }

        info!("disconnected");
        self.closed()
    }

    async fn wait_for_retry(&mut self, delay: Duration) -> Step {
        info!(
            "reconnecting in {:?} (attempt {} of {})",
            delay,
            self.machine.attempts(),
            self.machine.policy().max_attempts
        );
        let deadline = Instant::now() + delay;

        loop {
            tokio::select! {
                _ = sleep_until(deadline) => {
                    let next = self.machine.on_retry_elapsed();
                    self.emit_state();
                    return Step::Continue(next);
                }
                command = self.commands.recv() => {
                    if let Some(step) = self.idle_command(command) {
                        return step;
                    }
                }
            }
        }
    }

    async fn idle(&mut self) -> Step {
        match self.machine.state() {
            ConnectionState::Failed => {
                warn!("could not reach the host; type :reload to try again")
            }
            ConnectionState::Disconnected { replaced: true } => {
                info!("another device took over; type :reconnect to take it back")
            }
            _ => {}
        }

        loop {
            let command = self.commands.recv().await;
            if let Some(step) = self.idle_command(command) {
                return step;
            }
        }
    }

    /// Applies a command received while no connection is open.  `None`
    /// means keep waiting.
    fn idle_command(&mut self, command: Option<Command>) -> Option<Step> {
        let next = match command {
            None | Some(Command::Quit) => return Some(Step::Quit),
            Some(Command::Keys(keys)) => {
                if !keys.is_empty() {
                    warn!(count = keys.len(), "not connected; keys dropped");
                    self.emit(ClientEvent::KeysDropped(keys.len()));
                }
                return None;
            }
            Some(Command::Reconnect) => self.machine.on_focus_regained(),
            Some(Command::Reload) => self.machine.reset(),
        };

        if next == ReconnectAction::Stay {
            debug!(state = ?self.machine.state(), "reconnect request ignored");
            return None;
        }
        self.emit_state();
        Some(Step::Continue(next))
    }

    fn closed(&mut self) -> Step {
        let next = self.machine.on_close();
        self.emit_state();
        Step::Continue(next)
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn handle_text(&mut self, text: &str) {
        match decode_server_message(text) {
            Ok(msg) => {
                if let ServerMessage::Error { error } = &msg {
                    warn!("host reported: {error}");
                }
                self.machine.on_server_message(&msg);
                self.emit(ClientEvent::Server(msg));
            }
            Err(e) => warn!("ignoring malformed payload from host: {e}"),
        }
    }

    fn emit_state(&mut self) {
        let state = self.machine.state();
        if self.last_state != Some(state) {
            self.last_state = Some(state);
            self.emit(ClientEvent::State(state));
        }
    }

    fn emit(&self, event: ClientEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver gone");
        }
    }
}

async fn send_keys(socket: &mut Socket, keys: &[NumpadKey]) -> Result<(), tungstenite::Error> {
    for &key in keys {
        let text = match encode_key_message(&KeyMessage::key_press(key.symbol(), unix_millis())) {
            Ok(text) => text,
            Err(e) => {
                warn!(%key, "skipping key: {e}");
                continue;
            }
        };
        socket.send(Message::Text(text)).await?;
        debug!(%key, "key sent");
    }
    Ok(())
}

async fn close_quietly(socket: &mut Socket) {
    if let Err(e) = socket.close(None).await {
        debug!("close handshake failed: {e}");
    }
}

fn unix_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
