//! In-memory transports for exercising sessions without a network.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio_tungstenite::accept_async;

use crate::error::{Error, Result};

use super::{Inbound, Transport};

/// How the fake server responds to sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    /// Every sent payload comes back unchanged.
    Echo,
    /// Nothing ever comes back.
    Silent,
    /// Every send fails; nothing comes back.
    FailingSend,
}

/// Scriptable fake server connection.
pub(crate) struct MockTransport {
    behavior: Behavior,
    sent: Mutex<Vec<String>>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: AsyncMutex<mpsc::UnboundedReceiver<Inbound>>,
    close_calls: AtomicUsize,
    closed: AtomicBool,
}

impl MockTransport {
    pub(crate) fn new(behavior: Behavior) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            behavior,
            sent: Mutex::new(Vec::new()),
            inbound_tx,
            inbound_rx: AsyncMutex::new(inbound_rx),
            close_calls: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn echo() -> Self {
        Self::new(Behavior::Echo)
    }

    pub(crate) fn silent() -> Self {
        Self::new(Behavior::Silent)
    }

    /// Queues a frame as if the server had pushed it.
    pub(crate) fn push(&self, inbound: Inbound) {
        let _ = self.inbound_tx.send(inbound);
    }

    /// Payloads accepted by `send`, in order.
    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Number of `close` calls, including repeats.
    pub(crate) fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, payload: &str) -> Result<()> {
        if self.is_closed() {
            return Err(Error::NotConnected);
        }

        match self.behavior {
            Behavior::FailingSend => Err(Error::send("connection reset by peer")),
            Behavior::Echo => {
                self.sent.lock().push(payload.to_string());
                self.push(Inbound::Text(payload.to_string()));
                Ok(())
            }
            Behavior::Silent => {
                self.sent.lock().push(payload.to_string());
                Ok(())
            }
        }
    }

    async fn receive(&self) -> Result<Inbound> {
        if self.is_closed() {
            return Err(Error::NotConnected);
        }

        // The sender half lives in `self`, so this only returns on a push.
        let mut inbound = self.inbound_rx.lock().await;
        inbound.recv().await.ok_or(Error::NotConnected)
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Starts a WebSocket server on an ephemeral local port that echoes every
/// data frame back. Returns its `ws://` address.
pub(crate) async fn spawn_echo_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    if message.is_text() || message.is_binary() {
                        if ws.send(message).await.is_err() {
                            break;
                        }
                    } else if message.is_close() {
                        break;
                    }
                }
            });
        }
    });

    format!("ws://127.0.0.1:{port}")
}
