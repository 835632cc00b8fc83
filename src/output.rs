//! Human-readable status output.
//!
//! Every lifecycle transition, message and failure the user should see is
//! a [`Report`]. Components hand reports to an [`Output`] sink; the binary
//! uses [`Console`], which renders them on stdout. Diagnostics that only
//! matter when debugging go through `tracing` instead.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io::{self, Write};

use crate::transport::InboundMessage;

// ============================================================================
// Constants
// ============================================================================

/// Short command list shown by `help`.
pub const HELP_TEXT: &str = "Commands: time, broadcast, quit, exit, help";

// ============================================================================
// Report
// ============================================================================

/// A single user-facing status event.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Startup banner.
    Banner,
    /// Address about to be dialed.
    Target { address: String },
    /// Connection established.
    Connected { address: String },
    /// Connection could not be established.
    ConnectFailed { error: String },
    /// Session closed the connection.
    Disconnected,
    /// Peer closed the connection.
    ClosedByServer,

    /// Mode selection menu.
    ModeMenu,
    /// Prompt for the mode choice.
    ModePrompt,
    /// Mode choice was not `1` or `2`.
    InvalidChoice,

    /// Interactive mode banner with the command list.
    InteractiveStarted,
    /// Answer to `help`.
    Help,
    /// Prompt for the next message.
    MessagePrompt,
    /// Message written to the server.
    Sent { message: String },
    /// Message could not be written.
    SendFailed { error: String },
    /// Message pushed by the server.
    Received(InboundMessage),
    /// Reading from the server failed.
    ReceiveFailed { error: String },
    /// Reading user input failed.
    InputFailed { error: String },

    /// Scripted mode is starting.
    ScriptStarted,
    /// Scripted step `index` of `total` (1-based).
    ScriptStep { index: usize, total: usize },
    /// Reply to a scripted message.
    Response(InboundMessage),
    /// No reply arrived within the bound.
    ReplyTimeout,
    /// All scripted steps ran.
    ScriptCompleted,

    /// User pressed Ctrl+C.
    Interrupted,
    /// Cleanup after an interrupt finished.
    Goodbye,
    /// Top-level failure.
    Failure { error: String },
}

impl Report {
    /// Returns `true` for reports that wait on the same line for input.
    #[inline]
    #[must_use]
    pub const fn is_prompt(&self) -> bool {
        matches!(self, Self::ModePrompt | Self::MessagePrompt)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Banner => f.write_str("🚀 WebSocket Test Client"),
            Self::Target { address } => writeln!(f, "🔗 Target: {address}"),
            Self::Connected { address } => write!(f, "✅ Connected to {address}"),
            Self::ConnectFailed { error } => write!(f, "❌ {error}"),
            Self::Disconnected => f.write_str("🔌 Disconnected"),
            Self::ClosedByServer => f.write_str("🔌 Connection closed by server"),

            Self::ModeMenu => f.write_str("Select mode:\n1. Interactive mode\n2. Automated tests"),
            Self::ModePrompt => f.write_str("Enter choice (1 or 2): "),
            Self::InvalidChoice => f.write_str("Invalid choice. Please enter 1 or 2."),

            Self::InteractiveStarted => f.write_str(
                "\n🎮 Interactive mode started\n\
                 Commands:\n  \
                 - Type any message to send\n  \
                 - 'time' - Get server time\n  \
                 - 'broadcast' - Trigger broadcast\n  \
                 - 'quit' or 'exit' - Disconnect and exit\n  \
                 - 'help' - Show this help\n",
            ),
            Self::Help => f.write_str(HELP_TEXT),
            Self::MessagePrompt => f.write_str("💬 Enter message: "),
            Self::Sent { message } => write!(f, "📤 Sent: {message}"),
            Self::SendFailed { error }
            | Self::ReceiveFailed { error }
            | Self::InputFailed { error } => write!(f, "❌ {error}"),
            Self::Received(message) => {
                write!(f, "📥 [{}] Received: {}", message.timestamp(), message.text)
            }

            Self::ScriptStarted => f.write_str("🧪 Running automated tests..."),
            Self::ScriptStep { index, total } => write!(f, "\n📋 Test {index}/{total}"),
            Self::Response(message) => {
                write!(f, "📥 [{}] Response: {}", message.timestamp(), message.text)
            }
            Self::ReplyTimeout => f.write_str("⏰ No response received (timeout)"),
            Self::ScriptCompleted => f.write_str("\n✅ Automated tests completed"),

            Self::Interrupted => f.write_str("\n🛑 Interrupted by user"),
            Self::Goodbye => f.write_str("\n👋 Goodbye!"),
            Self::Failure { error } => write!(f, "❌ Unexpected error: {error}"),
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Destination for [`Report`]s.
///
/// Shared between the receiver task and the active mode, so implementations
/// must be `Send + Sync`.
pub trait Output: Send + Sync {
    /// Emits one report.
    fn report(&self, report: Report);
}

/// Renders reports on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Output for Console {
    fn report(&self, report: Report) {
        let mut stdout = io::stdout().lock();

        // A closed stdout is not worth failing the session over.
        let _ = if report.is_prompt() {
            write!(stdout, "{report}").and_then(|()| stdout.flush())
        } else {
            writeln!(stdout, "{report}")
        };
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// Output sink that keeps every report, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    reports: parking_lot::Mutex<Vec<Report>>,
}

#[cfg(test)]
impl Recorder {
    /// Returns a copy of everything reported so far.
    pub(crate) fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    /// Counts reports matching `predicate`.
    pub(crate) fn count(&self, predicate: impl Fn(&Report) -> bool) -> usize {
        self.reports.lock().iter().filter(|r| predicate(r)).count()
    }
}

#[cfg(test)]
impl Output for Recorder {
    fn report(&self, report: Report) {
        self.reports.lock().push(report);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_detected() {
        assert!(Report::ModePrompt.is_prompt());
        assert!(Report::MessagePrompt.is_prompt());
        assert!(!Report::Help.is_prompt());
    }

    #[test]
    fn test_display_status_lines() {
        let connected = Report::Connected {
            address: "ws://localhost:8080".into(),
        };
        assert_eq!(connected.to_string(), "✅ Connected to ws://localhost:8080");
        assert_eq!(Report::Help.to_string(), HELP_TEXT);
        assert_eq!(
            Report::ScriptStep { index: 2, total: 5 }.to_string(),
            "\n📋 Test 2/5"
        );
        assert_eq!(
            Report::SendFailed {
                error: "Not connected".into()
            }
            .to_string(),
            "❌ Not connected"
        );
    }

    #[test]
    fn test_display_received_includes_timestamp() {
        let message = InboundMessage::new("pong");
        let line = Report::Received(message.clone()).to_string();

        assert!(line.starts_with("📥 ["));
        assert!(line.contains(&message.timestamp()));
        assert!(line.ends_with("Received: pong"));
    }

    #[test]
    fn test_interactive_banner_lists_commands() {
        let banner = Report::InteractiveStarted.to_string();
        for word in ["time", "broadcast", "quit", "exit", "help"] {
            assert!(banner.contains(word), "missing {word}");
        }
    }

    #[test]
    fn test_recorder_collects_reports() {
        let recorder = Recorder::default();
        recorder.report(Report::Banner);
        recorder.report(Report::Disconnected);

        assert_eq!(recorder.reports().len(), 2);
        assert_eq!(recorder.count(|r| matches!(r, Report::Disconnected)), 1);
    }
}
