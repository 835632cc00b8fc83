//! Line-oriented user input.
//!
//! Interactive mode and the mode prompt read through [`LineSource`].
//! [`StdinLines`] reads stdin on a dedicated OS thread and hands lines to
//! the async side over a channel, so a pending read never holds up the
//! runtime or its shutdown.

// ============================================================================
// Imports
// ============================================================================

use std::io::{self, BufRead};
use std::thread;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// LineSource
// ============================================================================

/// Asynchronous source of input lines.
#[async_trait]
pub trait LineSource: Send {
    /// Suspends until the next line is available.
    ///
    /// Returns `Ok(None)` at end of input. Lines have their line terminator
    /// removed but are otherwise untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] if reading fails.
    async fn next_line(&mut self) -> Result<Option<String>>;
}

// ============================================================================
// StdinLines
// ============================================================================

/// Lines from the process's standard input.
#[derive(Debug)]
pub struct StdinLines {
    rx: mpsc::Receiver<io::Result<String>>,
}

impl StdinLines {
    /// Starts the reader thread.
    ///
    /// The thread reads at most one line ahead of the consumer. It is never
    /// joined; it ends at EOF, on a read error, or with the process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the thread cannot be spawned.
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::channel(1);

        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || read_stdin(&tx))?;

        Ok(Self { rx })
    }
}

#[async_trait]
impl LineSource for StdinLines {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self.rx.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(Error::input(e.to_string())),
            None => Ok(None),
        }
    }
}

/// Blocking read loop run on the reader thread.
fn read_stdin(tx: &mpsc::Sender<io::Result<String>>) {
    let stdin = io::stdin();
    let mut stdin = stdin.lock();

    loop {
        let mut buf = String::new();
        let item = match stdin.read_line(&mut buf) {
            Ok(0) => break,
            Ok(_) => Ok(strip_terminator(&buf).to_string()),
            Err(e) => Err(e),
        };

        let failed = item.is_err();
        if tx.blocking_send(item).is_err() || failed {
            break;
        }
    }

    debug!("stdin reader finished");
}

/// Removes a trailing `\n` or `\r\n`.
fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

// ============================================================================
// ScriptedLines
// ============================================================================

/// Canned input for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedLines {
    lines: std::collections::VecDeque<std::result::Result<String, String>>,
    hang_at_end: bool,
}

#[cfg(test)]
impl ScriptedLines {
    pub(crate) fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(|l| Ok(l.into())).collect(),
            hang_at_end: false,
        }
    }

    /// Queues a read failure after the current lines.
    pub(crate) fn then_fail(mut self, message: &str) -> Self {
        self.lines.push_back(Err(message.to_string()));
        self
    }

    /// Never reports end of input; waits forever once drained.
    pub(crate) fn then_hang(mut self) -> Self {
        self.hang_at_end = true;
        self
    }
}

#[cfg(test)]
#[async_trait]
impl LineSource for ScriptedLines {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.pop_front() {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(message)) => Err(Error::input(message)),
            None if self.hang_at_end => std::future::pending().await,
            None => Ok(None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("hello\n"), "hello");
        assert_eq!(strip_terminator("hello\r\n"), "hello");
        assert_eq!(strip_terminator("hello"), "hello");
        assert_eq!(strip_terminator("  spaced  \n"), "  spaced  ");
        assert_eq!(strip_terminator("\n"), "");
    }

    #[tokio::test]
    async fn test_scripted_lines_in_order_then_eof() {
        let mut lines = ScriptedLines::new(["one", "two"]);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("one"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("two"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scripted_lines_failure() {
        let mut lines = ScriptedLines::new(["one"]).then_fail("broken tty");

        assert!(lines.next_line().await.is_ok());
        let err = lines.next_line().await.unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
    }
}
