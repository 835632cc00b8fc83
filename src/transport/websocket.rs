//! `tokio-tungstenite` backed transport.
//!
//! The stream is split once at connect time. The read half and the write
//! half sit behind separate async locks, so the receiver task can stay
//! suspended in [`WsTransport::receive`] while the active mode sends.
//!
//! Frames are mapped as follows:
//!
//! | Frame | Result |
//! |-------|--------|
//! | Text | `Inbound::Text` |
//! | Binary | `Inbound::Text` (lossy UTF-8) |
//! | Close, end of stream | `Inbound::Closed` |
//! | Ping, Pong, raw frame | skipped |

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};

use super::{Inbound, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on TCP connect plus handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on flushing the close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// WsTransport
// ============================================================================

/// One client-side WebSocket connection.
pub struct WsTransport {
    /// Address the connection was opened to.
    address: String,
    /// Write half.
    writer: Mutex<SplitSink<WsStream, Message>>,
    /// Read half.
    reader: Mutex<SplitStream<WsStream>>,
    /// Set by the first `close`.
    closed: AtomicBool,
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("address", &self.address)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl WsTransport {
    /// Connects to `address` and completes the WebSocket handshake.
    ///
    /// No retry is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the connection is refused, the host
    /// does not resolve, the handshake is rejected or does not finish
    /// within 10s.
    pub async fn connect(address: &str) -> Result<Self> {
        debug!(address, "Connecting");

        let (stream, response) = timeout(CONNECT_TIMEOUT, connect_async(address))
            .await
            .map_err(|_| {
                Error::connect(
                    address,
                    format!("timed out after {}ms", CONNECT_TIMEOUT.as_millis()),
                )
            })?
            .map_err(|e| Error::connect(address, e.to_string()))?;

        info!(address, status = %response.status(), "WebSocket connection established");

        let (writer, reader) = stream.split();

        Ok(Self {
            address: address.to_string(),
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the address this transport is connected to.
    #[inline]
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, payload: &str) -> Result<()> {
        if self.is_closed() {
            return Err(Error::NotConnected);
        }

        let mut writer = self.writer.lock().await;
        writer
            .send(Message::text(payload.to_owned()))
            .await
            .map_err(|e| match e {
                WsError::ConnectionClosed | WsError::AlreadyClosed => {
                    Error::send("connection already closed")
                }
                other => Error::send(other.to_string()),
            })?;

        trace!(len = payload.len(), "Message sent");
        Ok(())
    }

    async fn receive(&self) -> Result<Inbound> {
        if self.is_closed() {
            return Err(Error::NotConnected);
        }

        let mut reader = self.reader.lock().await;

        loop {
            let Some(message) = reader.next().await else {
                debug!("WebSocket stream ended");
                return Ok(Inbound::Closed);
            };

            match message {
                Ok(Message::Text(text)) => return Ok(Inbound::Text(text.as_str().to_owned())),

                Ok(Message::Binary(data)) => {
                    return Ok(Inbound::Text(String::from_utf8_lossy(&data).into_owned()));
                }

                Ok(Message::Close(frame)) => {
                    debug!(?frame, "WebSocket closed by remote");
                    return Ok(Inbound::Closed);
                }

                // Ping, Pong, raw frames
                Ok(_) => trace!("Control frame skipped"),

                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    return if self.is_closed() {
                        Err(Error::NotConnected)
                    } else {
                        Ok(Inbound::Closed)
                    };
                }

                Err(e) => {
                    warn!(error = %e, "WebSocket read failed");
                    return Err(Error::receive(e.to_string()));
                }
            }
        }
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut writer = self.writer.lock().await;
        match timeout(CLOSE_TIMEOUT, writer.close()).await {
            Ok(Ok(())) | Ok(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                debug!(address = %self.address, "WebSocket closed");
                Ok(())
            }
            Ok(Err(e)) => {
                debug!(error = %e, "Close handshake failed");
                Err(Error::WebSocket(e))
            }
            Err(_) => Err(Error::timeout(
                "closing connection",
                CLOSE_TIMEOUT.as_millis() as u64,
            )),
        }
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    use crate::transport::mock::spawn_echo_server;

    /// Guard against hangs: every network test must finish well within this.
    const TEST_BOUND: Duration = Duration::from_secs(5);

    /// Starts a local server that sends `frames` then closes.
    async fn spawn_push_server(frames: Vec<Message>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = accept_async(stream).await.expect("handshake");
            for frame in frames {
                ws.send(frame).await.expect("push frame");
            }
            let _ = ws.close(None).await;
        });

        format!("ws://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn test_send_and_receive_echo() {
        let address = spawn_echo_server().await;
        let transport = WsTransport::connect(&address).await.expect("connect");
        assert_eq!(transport.address(), address);

        transport.send("hello").await.expect("send");
        let reply = timeout(TEST_BOUND, transport.receive())
            .await
            .expect("reply in time")
            .expect("receive");

        assert_eq!(reply, Inbound::Text("hello".into()));
        transport.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_operations_after_close_fail_fast() {
        let address = spawn_echo_server().await;
        let transport = WsTransport::connect(&address).await.expect("connect");

        transport.close().await.expect("close");
        assert!(transport.is_closed());

        let send = timeout(TEST_BOUND, transport.send("late")).await.expect("no hang");
        assert!(matches!(send, Err(Error::NotConnected)));

        let receive = timeout(TEST_BOUND, transport.receive()).await.expect("no hang");
        assert!(matches!(receive, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let address = spawn_echo_server().await;
        let transport = WsTransport::connect(&address).await.expect("connect");

        transport.close().await.expect("first close");
        transport.close().await.expect("second close");
        transport.close().await.expect("third close");
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let address = format!("ws://127.0.0.1:{port}");
        let err = WsTransport::connect(&address).await.unwrap_err();

        assert!(matches!(err, Error::Connect { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_peer_close_reported_as_closed() {
        let address = spawn_push_server(vec![Message::text("bye")]).await;
        let transport = WsTransport::connect(&address).await.expect("connect");

        let first = timeout(TEST_BOUND, transport.receive()).await.expect("no hang");
        assert_eq!(first.expect("receive"), Inbound::Text("bye".into()));

        let second = timeout(TEST_BOUND, transport.receive()).await.expect("no hang");
        assert_eq!(second.expect("receive"), Inbound::Closed);
    }

    #[tokio::test]
    async fn test_binary_frames_decoded_as_text() {
        let address = spawn_push_server(vec![Message::binary(b"raw".to_vec())]).await;
        let transport = WsTransport::connect(&address).await.expect("connect");

        let frame = timeout(TEST_BOUND, transport.receive()).await.expect("no hang");
        assert_eq!(frame.expect("receive"), Inbound::Text("raw".into()));
    }
}
