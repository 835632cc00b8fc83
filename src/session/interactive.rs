//! Line-driven mode.
//!
//! Each input line is trimmed and interpreted as a [`Command`]. Only
//! `quit`, `exit` and `help` mean anything to the client; every other
//! non-empty line, `time` and `broadcast` included, goes to the server
//! as-is.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, warn};

use crate::input::LineSource;
use crate::output::{Output, Report};
use crate::transport::Transport;

use super::SharedState;

// ============================================================================
// Command
// ============================================================================

/// Meaning of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// `quit` or `exit`, any case.
    Quit,
    /// `help`, any case.
    Help,
    /// Anything else, trimmed.
    Send(String),
}

impl Command {
    /// Interprets a raw input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let text = line.trim();

        if text.is_empty() {
            Self::Empty
        } else if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            Self::Quit
        } else if text.eq_ignore_ascii_case("help") {
            Self::Help
        } else {
            Self::Send(text.to_string())
        }
    }
}

// ============================================================================
// InteractiveExit
// ============================================================================

/// Why interactive mode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveExit {
    /// User typed `quit` or `exit`.
    Quit,
    /// Input reached end of file.
    EndOfInput,
    /// Reading input failed.
    InputError,
    /// Server closed the connection.
    ConnectionLost,
}

// ============================================================================
// Mode Loop
// ============================================================================

/// Runs interactive mode until the user quits, input ends or the
/// connection goes away.
///
/// Send failures are reported and the loop continues. The caller runs the
/// receiver task alongside and handles cleanup.
pub async fn run_interactive(
    transport: &dyn Transport,
    lines: &mut dyn LineSource,
    output: &dyn Output,
    state: &SharedState,
) -> InteractiveExit {
    output.report(Report::InteractiveStarted);

    loop {
        if !state.is_connected() {
            return InteractiveExit::ConnectionLost;
        }

        output.report(Report::MessagePrompt);

        let line = tokio::select! {
            line = lines.next_line() => line,
            () = state.disconnected() => return InteractiveExit::ConnectionLost,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Input closed");
                return InteractiveExit::EndOfInput;
            }
            Err(e) => {
                output.report(Report::InputFailed {
                    error: e.to_string(),
                });
                return InteractiveExit::InputError;
            }
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => return InteractiveExit::Quit,
            Command::Help => output.report(Report::Help),
            Command::Send(message) => match transport.send(&message).await {
                Ok(()) => output.report(Report::Sent { message }),
                Err(e) => {
                    warn!(error = %e, "Send failed");
                    output.report(Report::SendFailed {
                        error: e.to_string(),
                    });
                }
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
