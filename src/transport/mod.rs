//! WebSocket transport layer.
//!
//! A [`Transport`] is one established connection that can send and
//! receive opaque text payloads. The session owns it; the receiver task
//! reads from it while the active mode writes to it, so read and write
//! paths must not block each other.
//!
//! # Lifecycle
//!
//! 1. `WsTransport::connect` - TCP connect + WebSocket handshake
//! 2. `send` / `receive` - duplex traffic, independent halves
//! 3. `close` - idempotent; every later `send`/`receive` fails with
//!    [`Error::NotConnected`](crate::Error::NotConnected)
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | `tokio-tungstenite` backed transport |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// `tokio-tungstenite` backed transport.
pub mod websocket;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::WsTransport;

// ============================================================================
// Inbound
// ============================================================================

/// Outcome of a single successful [`Transport::receive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A data frame, decoded as text.
    Text(String),
    /// The peer closed the connection or the stream ended.
    Closed,
}

// ============================================================================
// InboundMessage
// ============================================================================

/// A payload from the server stamped with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Payload as received.
    pub text: String,
    /// Local time the payload was read off the connection.
    pub received_at: DateTime<Local>,
}

impl InboundMessage {
    /// Stamps `text` with the current local time.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Local::now(),
        }
    }

    /// Arrival time formatted as `HH:MM:SS`.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.received_at.format("%H:%M:%S").to_string()
    }
}

// ============================================================================
// Transport
// ============================================================================

/// A live, duplex connection carrying text payloads.
///
/// All methods take `&self`: one task may be suspended in [`receive`]
/// while another calls [`send`].
///
/// [`receive`]: Transport::receive
/// [`send`]: Transport::send
#[async_trait]
pub trait Transport: Send + Sync {
    /// Writes one message.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`](crate::Error::NotConnected) after `close`
    /// - [`Error::Send`](crate::Error::Send) if the write fails
    async fn send(&self, payload: &str) -> Result<()>;

    /// Suspends until the next message arrives or the peer closes.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`](crate::Error::NotConnected) after `close`
    /// - [`Error::Receive`](crate::Error::Receive) on an I/O fault
    async fn receive(&self) -> Result<Inbound>;

    /// Closes the connection. Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Implementations only report failures of the first call; repeated
    /// calls return `Ok(())`.
    async fn close(&self) -> Result<()>;

    /// Returns `true` once [`close`](Transport::close) has been called.
    fn is_closed(&self) -> bool;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let message = InboundMessage::new("hi");
        let stamp = message.timestamp();

        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.as_bytes()[2], b':');
        assert_eq!(stamp.as_bytes()[5], b':');
    }
}
