//! Error types for the WebSocket test client.
//!
//! Every transport operation, mode and configuration step returns
//! [`Result<T>`], which uses [`Error`]. Callers decide per variant whether
//! the run continues; nothing is retried.
//!
//! # Error Categories
//!
//! | Category | Variants | Effect on the run |
//! |----------|----------|-------------------|
//! | Configuration | [`Error::Config`], [`Error::InvalidAddress`] | Fatal before connecting |
//! | Connection | [`Error::Connect`] | Reported, run ends cleanly |
//! | Transfer | [`Error::NotConnected`], [`Error::Send`], [`Error::Receive`] | Reported, run continues |
//! | Waiting | [`Error::Timeout`] | Reported, run continues |
//! | Input | [`Error::Input`] | Reported, interactive mode ends |
//! | External | [`Error::Io`], [`Error::WebSocket`] | Propagated |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a client setting is out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The server address is not a usable WebSocket URL.
    #[error("Invalid address {address}: {message}")]
    InvalidAddress {
        /// The rejected address.
        address: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connecting to the server failed.
    ///
    /// Covers refused connections, DNS failures and rejected handshakes.
    #[error("Failed to connect to {address}: {message}")]
    Connect {
        /// Address that was dialed.
        address: String,
        /// Description of the failure.
        message: String,
    },

    /// The transport is closed.
    ///
    /// Returned by any send or receive attempted after `close`.
    #[error("Not connected")]
    NotConnected,

    // ========================================================================
    // Transfer Errors
    // ========================================================================
    /// Writing a message failed.
    #[error("Failed to send message: {message}")]
    Send {
        /// Description of the write failure.
        message: String,
    },

    /// Reading from the connection failed.
    #[error("Error receiving message: {message}")]
    Receive {
        /// Description of the read failure.
        message: String,
    },

    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Reading a line of user input failed.
    #[error("Input error: {message}")]
    Input {
        /// Description of the input failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid address error.
    #[inline]
    pub fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Creates a connect error.
    #[inline]
    pub fn connect(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Creates a send error.
    #[inline]
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send {
            message: message.into(),
        }
    }

    /// Creates a receive error.
    #[inline]
    pub fn receive(message: impl Into<String>) -> Self {
        Self::Receive {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates an input error.
    #[inline]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::NotConnected | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error ends the whole run.
    ///
    /// Fatal errors happen before any mode starts: bad configuration or a
    /// failed connect. Everything else is reported and the run goes on.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::InvalidAddress { .. } | Self::Connect { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connect("ws://localhost:8080", "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to connect to ws://localhost:8080: connection refused"
        );
    }

    #[test]
    fn test_not_connected_display() {
        assert_eq!(Error::NotConnected.to_string(), "Not connected");
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::timeout("waiting for reply", 2000);
        let other_err = Error::send("broken pipe");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
        assert_eq!(
            timeout_err.to_string(),
            "Timeout after 2000ms: waiting for reply"
        );
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connect("ws://x", "refused").is_connection_error());
        assert!(Error::NotConnected.is_connection_error());
        assert!(!Error::input("eof").is_connection_error());
    }

    #[test]
    fn test_is_fatal() {
        assert!(Error::config("bad").is_fatal());
        assert!(Error::invalid_address("x", "no scheme").is_fatal());
        assert!(Error::connect("ws://x", "refused").is_fatal());
        assert!(!Error::send("reset").is_fatal());
        assert!(!Error::receive("reset").is_fatal());
        assert!(!Error::timeout("reply", 1).is_fatal());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_ws_error() {
        let err: Error = WsError::ConnectionClosed.into();
        assert!(matches!(err, Error::WebSocket(_)));
        assert!(err.is_connection_error());
    }
}
