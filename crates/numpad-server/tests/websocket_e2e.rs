//! End-to-end tests: a real server on a loopback port, real WebSocket
//! clients.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use numpad_core::{decode_server_message, encode_key_message, KeyMessage, NumpadKey, ServerMessage};
use numpad_server::application::{HubHandle, PressKeyUseCase};
use numpad_server::domain::ServerConfig;
use numpad_server::infrastructure::key_injection::mock::MockKeyInjector;
use numpad_server::infrastructure::NumpadServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const STEP: Duration = Duration::from_secs(10);

// ── Helpers ───────────────────────────────────────────────────────────────────

struct RunningServer {
    url: String,
    addr: std::net::SocketAddr,
    hub: HubHandle,
    injector: Arc<MockKeyInjector>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<anyhow::Result<()>>,
    static_dir: PathBuf,
}

impl RunningServer {
    async fn start() -> Self {
        let static_dir = std::env::temp_dir().join(format!("numpad-e2e-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(
            static_dir.join("index.html"),
            "<!doctype html><title>Remote Numpad</title>",
        )
        .unwrap();

        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            static_dir: static_dir.clone(),
            shutdown_grace: Duration::from_secs(1),
            ..ServerConfig::default()
        };
        let injector = Arc::new(MockKeyInjector::new());
        let sink = Arc::new(PressKeyUseCase::new(injector.clone()));

        let server = NumpadServer::bind(&config, sink).await.unwrap();
        let addr = server.local_addr().unwrap();
        let hub = server.hub();
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(server.run(async move {
            let _ = stopped.await;
        }));

        Self {
            url: format!("ws://{addr}/ws"),
            addr,
            hub,
            injector,
            stop: Some(stop),
            task,
            static_dir,
        }
    }

    async fn connect(&self) -> Client {
        let (mut client, _) = timeout(STEP, connect_async(self.url.as_str()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next_message(&mut client).await, ServerMessage::connected());
        client
    }

    async fn stop(mut self) -> anyhow::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let result = timeout(STEP, &mut self.task).await.unwrap().unwrap();
        let _ = std::fs::remove_dir_all(&self.static_dir);
        result
    }

    /// Waits until the mock injector has recorded `count` taps.
    async fn wait_for_taps(&self, count: usize) -> Vec<NumpadKey> {
        timeout(STEP, async {
            loop {
                let taps = self.injector.taps();
                if taps.len() >= count {
                    return taps;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap()
    }
}

fn key_frame(key: &str) -> Message {
    Message::Text(encode_key_message(&KeyMessage::key_press(key, 1_718_000_000_000.0)).unwrap())
}

/// Next application payload, skipping control frames.
async fn next_message(client: &mut Client) -> ServerMessage {
    loop {
        let msg = timeout(STEP, client.next()).await.unwrap();
        match msg {
            Some(Ok(Message::Text(text))) => return decode_server_message(&text).unwrap(),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            other => panic!("expected a text message, got {other:?}"),
        }
    }
}

/// Returns `true` once the server closes the connection (close frame, end
/// of stream, or transport error) and `false` if a payload arrives instead.
async fn wait_for_close(client: &mut Client) -> bool {
    loop {
        match timeout(STEP, client.next()).await.unwrap() {
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return true,
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(_)) => return false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_key_press_over_websocket_is_injected() {
    // Arrange
    let server = RunningServer::start().await;
    let mut client = server.connect().await;

    // Act
    client.send(key_frame("5")).await.unwrap();
    client.send(key_frame("enter")).await.unwrap();

    // Assert
    assert_eq!(
        server.wait_for_taps(2).await,
        vec![NumpadKey::Digit5, NumpadKey::Enter]
    );
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unknown_key_returns_error_payload() {
    let server = RunningServer::start().await;
    let mut client = server.connect().await;

    client.send(key_frame("x")).await.unwrap();

    assert_eq!(next_message(&mut client).await, ServerMessage::key_failed("x"));
    assert_eq!(server.hub.active_connections().await.unwrap().len(), 1);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_second_client_takes_over_session() {
    // Arrange
    let server = RunningServer::start().await;
    let mut first = server.connect().await;

    // Act
    let mut second = server.connect().await;

    // Assert: the first client is told why, then closed
    assert_eq!(next_message(&mut first).await, ServerMessage::evicted());
    assert!(wait_for_close(&mut first).await);

    // Assert: the second client drives the keypad
    second.send(key_frame("8")).await.unwrap();
    assert_eq!(server.wait_for_taps(1).await, vec![NumpadKey::Digit8]);
    assert_eq!(server.hub.active_connections().await.unwrap().len(), 1);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_oversized_message_closes_connection() {
    let server = RunningServer::start().await;
    let mut client = server.connect().await;

    let oversized = format!(r#"{{"key":"{}","type":"key"}}"#, "5".repeat(1024));
    let _ = client.send(Message::Text(oversized)).await;

    assert!(wait_for_close(&mut client).await);
    assert!(server.injector.taps().is_empty());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_keypad_page_is_served_at_root() {
    // Arrange
    let server = RunningServer::start().await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();

    // Act
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    timeout(STEP, stream.read_to_string(&mut response))
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("Remote Numpad"));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_connected_clients() {
    // Arrange
    let server = RunningServer::start().await;
    let mut client = server.connect().await;

    // Act
    let result = server.stop().await;

    // Assert
    assert!(result.is_ok());
    assert!(wait_for_close(&mut client).await);
}
