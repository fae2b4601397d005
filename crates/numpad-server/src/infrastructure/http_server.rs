//! HTTP server: the keypad page, the `/ws` upgrade endpoint, and shutdown.
//!
//! One axum router serves both concerns on a single port:
//!
//! - `GET /ws` upgrades to a WebSocket and hands it to
//!   [`run_session`](crate::application::run_session).  Any origin is
//!   accepted.  Frames and messages above the configured size are rejected
//!   by the WebSocket layer before they reach the session.
//! - Every other path is served from the static directory.
//!
//! # Shutdown
//!
//! When the shutdown future resolves the server stops accepting, the hub is
//! shut down (closing every session), and the HTTP server gets
//! `shutdown_grace` to drain before it is abandoned.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::hub::{Hub, HubHandle};
use crate::application::press_key::KeyActionSink;
use crate::application::session::{run_session, SessionContext};
use crate::domain::config::{ServerConfig, MAX_ACTIVE_CLIENTS};
use crate::infrastructure::ws_transport::WsTransport;

/// Shared state of the `/ws` handler.
#[derive(Clone)]
struct AppState {
    session: SessionContext,
    max_frame_bytes: usize,
}

/// A bound, not yet running, Remote Numpad server.
pub struct NumpadServer {
    listener: TcpListener,
    router: Router,
    hub: HubHandle,
    shutdown_grace: Duration,
}

impl NumpadServer {
    /// Binds the listener and starts the connection hub.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (port in use, missing
    /// permission).
    pub async fn bind(config: &ServerConfig, sink: Arc<dyn KeyActionSink>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener on {}", config.bind_addr))?;

        if !config.static_dir.is_dir() {
            warn!(
                "static directory {} not found; only /ws will be served",
                config.static_dir.display()
            );
        }

        let hub = Hub::spawn(MAX_ACTIVE_CLIENTS, config.session.eviction_grace);
        let state = AppState {
            session: SessionContext {
                hub: hub.clone(),
                sink,
                config: Arc::new(config.session.clone()),
            },
            max_frame_bytes: config.session.max_frame_bytes,
        };

        let router = Router::new()
            .route("/ws", get(ws_handler))
            .fallback_service(ServeDir::new(&config.static_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Ok(Self {
            listener,
            router,
            hub,
            shutdown_grace: config.shutdown_grace,
        })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle on the server's connection hub.
    pub fn hub(&self) -> HubHandle {
        self.hub.clone()
    }

    /// Serves until `shutdown` resolves, then shuts down gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listener.local_addr()?;
        info!("Remote Numpad listening on http://{addr}");

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = stop_rx.await;
        });
        let mut server_task = tokio::spawn(async move { server.await });

        tokio::select! {
            _ = shutdown => {}
            joined = &mut server_task => {
                return joined
                    .context("HTTP server task failed")?
                    .context("HTTP server error");
            }
        }

        info!("shutting down: closing all sessions");
        if let Err(e) = self.hub.shutdown().await {
            warn!("hub already stopped: {e}");
        }
        let _ = stop_tx.send(());

        match tokio::time::timeout(self.shutdown_grace, &mut server_task).await {
            Ok(joined) => joined
                .context("HTTP server task failed")?
                .context("HTTP server error")?,
            Err(_) => {
                warn!(
                    "HTTP server did not drain within {:?}; forcing exit",
                    self.shutdown_grace
                );
                server_task.abort();
            }
        }

        info!("Remote Numpad stopped");
        Ok(())
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    info!(%peer, "websocket connection request");
    let AppState {
        session,
        max_frame_bytes,
    } = state;

    ws.max_message_size(max_frame_bytes)
        .max_frame_size(max_frame_bytes)
        .on_failed_upgrade(move |e| warn!(%peer, "websocket upgrade failed: {e}"))
        .on_upgrade(move |socket| run_session(WsTransport::new(socket), session))
}
