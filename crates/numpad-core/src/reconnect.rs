//! Sans-IO reconnection state machine shared by every keypad client.
//!
//! The machine never touches a socket or a timer.  Callers feed it the
//! events they observe (socket opened, payload received, socket closed,
//! retry delay elapsed, window focus regained) and carry out the
//! [`ReconnectAction`] it returns.  The native terminal client drives it
//! directly; the browser page mirrors the same transitions in JavaScript.
//!
//! # Transitions
//!
//! ```text
//!              start()/reset()                on_open()
//!  Disconnected ───────────────▶ Connecting ───────────▶ Connected
//!       ▲  ▲                         ▲  │                    │
//!       │  └── on_close() (retry) ───┼──┘                    │
//!       │                            │ on_retry_elapsed()    │
//!       └──────────────── on_close() ┴───────────────────────┘
//!
//!  attempts > max_attempts  ──▶ Failed   (terminal until reset())
//!  eviction notice seen     ──▶ Disconnected { replaced: true }, no retry
//! ```

use std::time::Duration;

use tracing::{debug, warn};

use crate::protocol::ServerMessage;

/// Bounded retry policy.  No jitter is applied to the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Number of automatic reconnection attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay between a close and the next attempt.
    pub retry_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Observable connection state of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection.  `replaced` is set when the host evicted this client in
    /// favour of another device.
    Disconnected { replaced: bool },
    /// A connection attempt is in flight.
    Connecting,
    /// The socket is open.
    Connected,
    /// Automatic retries are exhausted.
    Failed,
}

/// What the caller must do after feeding an event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectAction {
    /// Open a new connection now.
    Connect,
    /// Wait for the given delay, then call
    /// [`ReconnectMachine::on_retry_elapsed`].
    RetryAfter(Duration),
    /// Do nothing.
    Stay,
}

/// Client-side reconnection state machine.
#[derive(Debug, Clone)]
pub struct ReconnectMachine {
    policy: ReconnectPolicy,
    state: ConnectionState,
    attempts: u32,
    replaced: bool,
    retry_pending: bool,
}

impl ReconnectMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected { replaced: false },
            attempts: 0,
            replaced: false,
            retry_pending: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive failed attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Initial connect (page load).  Ignored while a connection is already
    /// in flight or open.
    pub fn start(&mut self) -> ReconnectAction {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => ReconnectAction::Stay,
            _ => self.begin_connect(),
        }
    }

    /// The socket opened: the attempt counter starts over.
    pub fn on_open(&mut self) -> ReconnectAction {
        self.state = ConnectionState::Connected;
        self.attempts = 0;
        self.replaced = false;
        self.retry_pending = false;
        ReconnectAction::Stay
    }

    /// Inspects a control payload.  Only the eviction notice changes state.
    pub fn on_server_message(&mut self, msg: &ServerMessage) -> ReconnectAction {
        if msg.is_eviction() {
            self.replaced = true;
        }
        ReconnectAction::Stay
    }

    /// The socket closed, or an attempt failed to open.
    pub fn on_close(&mut self) -> ReconnectAction {
        if self.state == ConnectionState::Failed {
            return ReconnectAction::Stay;
        }

        if self.replaced {
            debug!("replaced by another device; not reconnecting");
            self.state = ConnectionState::Disconnected { replaced: true };
            self.retry_pending = false;
            return ReconnectAction::Stay;
        }

        self.attempts += 1;
        if self.attempts <= self.policy.max_attempts {
            debug!(
                attempt = self.attempts,
                max_attempts = self.policy.max_attempts,
                "connection lost; scheduling retry"
            );
            self.state = ConnectionState::Disconnected { replaced: false };
            self.retry_pending = true;
            ReconnectAction::RetryAfter(self.policy.retry_delay)
        } else {
            warn!(attempts = self.attempts, "reconnection attempts exhausted");
            self.state = ConnectionState::Failed;
            self.retry_pending = false;
            ReconnectAction::Stay
        }
    }

    /// The retry delay announced by [`ReconnectAction::RetryAfter`] elapsed.
    pub fn on_retry_elapsed(&mut self) -> ReconnectAction {
        let waiting = self.retry_pending
            && matches!(self.state, ConnectionState::Disconnected { .. });
        if !waiting {
            return ReconnectAction::Stay;
        }
        self.retry_pending = false;
        self.state = ConnectionState::Connecting;
        ReconnectAction::Connect
    }

    /// The window regained focus.  Reconnects only a client that is idle
    /// with no failed attempts behind it, which includes a replaced client.
    pub fn on_focus_regained(&mut self) -> ReconnectAction {
        match self.state {
            ConnectionState::Disconnected { .. } if self.attempts == 0 => self.begin_connect(),
            _ => ReconnectAction::Stay,
        }
    }

    /// Manual reload: forget all history and connect again.
    pub fn reset(&mut self) -> ReconnectAction {
        self.attempts = 0;
        self.begin_connect()
    }

    fn begin_connect(&mut self) -> ReconnectAction {
        self.replaced = false;
        self.retry_pending = false;
        self.state = ConnectionState::Connecting;
        ReconnectAction::Connect
    }
}

impl Default for ReconnectMachine {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
