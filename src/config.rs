//! Client configuration.
//!
//! [`ClientConfig`] collects everything a run needs: the server address,
//! an optional fixed [`Mode`], and the [`ScriptPlan`] used by the
//! automated test mode.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ws_test_client::{ClientConfig, Mode};
//!
//! let config = ClientConfig::new("ws://127.0.0.1:9001")
//!     .with_mode(Mode::Scripted)
//!     .with_reply_timeout(Duration::from_millis(500));
//!
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Address used when none is given on the command line.
pub const DEFAULT_ADDRESS: &str = "ws://localhost:8080";

/// How long the scripted mode waits for a reply to each message.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between scripted messages.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

/// Messages sent by the scripted mode, in order.
pub const DEFAULT_SCRIPT: [&str; 5] = [
    "Hello Server!",
    "time",
    "This is a test message",
    "broadcast",
    "Another test message",
];

// ============================================================================
// Mode
// ============================================================================

/// What the session does once connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Human types messages, server replies are printed as they arrive.
    Interactive,
    /// Fixed sequence of test messages with a reply wait after each.
    Scripted,
}

impl Mode {
    /// Parses the answer to the mode selection prompt (`1` or `2`).
    #[must_use]
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Interactive),
            "2" => Some(Self::Scripted),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive => f.write_str("interactive"),
            Self::Scripted => f.write_str("scripted"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interactive" | "i" | "1" => Ok(Self::Interactive),
            "scripted" | "script" | "tests" | "s" | "2" => Ok(Self::Scripted),
            other => Err(Error::config(format!("unknown mode: {other}"))),
        }
    }
}

// ============================================================================
// ScriptPlan
// ============================================================================

/// Messages and timings for the scripted mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPlan {
    /// Messages sent in order.
    pub messages: Vec<String>,

    /// Upper bound on the wait for each reply.
    pub reply_timeout: Duration,

    /// Pause after each reply wait.
    pub pause: Duration,
}

impl Default for ScriptPlan {
    fn default() -> Self {
        Self {
            messages: DEFAULT_SCRIPT.iter().map(|m| (*m).to_string()).collect(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            pause: DEFAULT_PAUSE,
        }
    }
}

impl ScriptPlan {
    /// Total time the plan takes when no reply ever arrives.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        (self.reply_timeout + self.pause) * self.messages.len() as u32
    }
}

// ============================================================================
// ClientConfig
// ============================================================================

/// Configuration for one client run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the server.
    pub address: String,

    /// Mode to run; `None` prompts the user after connecting.
    pub mode: Option<Mode>,

    /// Scripted mode settings.
    pub script: ScriptPlan,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ClientConfig {
    /// Creates a configuration targeting `address` with default settings.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            mode: None,
            script: ScriptPlan::default(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientConfig {
    /// Fixes the mode so no prompt is shown.
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the scripted reply timeout.
    #[inline]
    #[must_use]
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.script.reply_timeout = timeout;
        self
    }

    /// Sets the pause between scripted messages.
    #[inline]
    #[must_use]
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.script.pause = pause;
        self
    }

    /// Replaces the scripted message sequence.
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.script.messages = messages.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientConfig {
    /// Parses the address as a WebSocket URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address does not parse or
    /// its scheme is not `ws`/`wss`.
    pub fn url(&self) -> Result<Url> {
        let url = Url::parse(&self.address)
            .map_err(|e| Error::invalid_address(&self.address, e.to_string()))?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::invalid_address(
                &self.address,
                format!("unsupported scheme '{other}', expected ws or wss"),
            )),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if the address is not a WebSocket URL
    /// - [`Error::Config`] if a scripted timing is zero or the script is empty
    pub fn validate(&self) -> Result<()> {
        self.url()?;

        if self.script.reply_timeout.is_zero() {
            return Err(Error::config("Reply timeout must be greater than zero"));
        }

        if self.script.pause.is_zero() {
            return Err(Error::config("Pause must be greater than zero"));
        }

        if self.script.messages.is_empty() {
            return Err(Error::config("Script must contain at least one message"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert!(config.mode.is_none());
        assert_eq!(config.script.messages.len(), 5);
        assert_eq!(config.script.messages[0], "Hello Server!");
        assert_eq!(config.script.messages[4], "Another test message");
        assert_eq!(config.script.reply_timeout, Duration::from_secs(2));
        assert_eq!(config.script.pause, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_chain() {
        let config = ClientConfig::new("ws://example.com:9000/chat")
            .with_mode(Mode::Interactive)
            .with_reply_timeout(Duration::from_millis(250))
            .with_pause(Duration::from_millis(10))
            .with_messages(["a", "b"]);

        assert_eq!(config.mode, Some(Mode::Interactive));
        assert_eq!(config.script.reply_timeout, Duration::from_millis(250));
        assert_eq!(config.script.pause, Duration::from_millis(10));
        assert_eq!(config.script.messages, vec!["a", "b"]);
    }

    #[test]
    fn test_worst_case_duration() {
        assert_eq!(ScriptPlan::default().worst_case(), Duration::from_secs(15));
    }

    #[test]
    fn test_validate_accepts_ws_and_wss() {
        assert!(ClientConfig::new("ws://localhost:8080").validate().is_ok());
        assert!(ClientConfig::new("wss://example.com/socket").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_http_scheme() {
        let err = ClientConfig::new("http://localhost:8080")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let err = ClientConfig::new("not a url").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_timings() {
        let config = ClientConfig::default().with_reply_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config = ClientConfig::default().with_pause(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_script() {
        let config = ClientConfig::default().with_messages(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_mode_from_choice() {
        assert_eq!(Mode::from_choice("1"), Some(Mode::Interactive));
        assert_eq!(Mode::from_choice(" 2 "), Some(Mode::Scripted));
        assert_eq!(Mode::from_choice("3"), None);
        assert_eq!(Mode::from_choice(""), None);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("interactive".parse::<Mode>().unwrap(), Mode::Interactive);
        assert_eq!("Scripted".parse::<Mode>().unwrap(), Mode::Scripted);
        assert!("other".parse::<Mode>().is_err());
    }
}
