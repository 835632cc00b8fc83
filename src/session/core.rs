//! Session ownership and cleanup.
//!
//! A [`Session`] owns the transport for the whole run. [`Session::run`]
//! selects a mode, starts the receiver task, runs the mode, and then,
//! however the mode ended, stops the receiver and closes the transport
//! exactly once.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect──► Connected ──mode ends──► Closing ──► Disconnected
//!                               │
//!                               └──peer closes──► Disconnected
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::{ClientConfig, Mode, ScriptPlan};
use crate::error::Result;
use crate::input::LineSource;
use crate::output::{Output, Report};
use crate::transport::{Transport, WsTransport};

use super::interactive::{InteractiveExit, run_interactive};
use super::receiver::{Delivery, ReceiverLoop};
use super::scripted::{ScriptSummary, run_script};
use super::{ConnectionState, SharedState};

// ============================================================================
// SessionOutcome
// ============================================================================

/// How a session's run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Interactive mode ended for the given reason.
    Interactive(InteractiveExit),
    /// Scripted mode ran to completion.
    Scripted(ScriptSummary),
    /// The interrupt future fired first.
    Interrupted,
    /// Input ended or failed before a mode was chosen.
    NoModeSelected,
}

// ============================================================================
// Session
// ============================================================================

/// One connection to the server and the run performed over it.
pub struct Session {
    address: String,
    transport: Arc<dyn Transport>,
    state: SharedState,
    output: Arc<dyn Output>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Session - Constructors
// ============================================================================

impl Session {
    /// Connects to `address` over WebSocket.
    ///
    /// Reports success or failure on `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`](crate::Error::Connect) if the connection
    /// cannot be established.
    pub async fn connect(address: &str, output: Arc<dyn Output>) -> Result<Self> {
        match WsTransport::connect(address).await {
            Ok(transport) => {
                output.report(Report::Connected {
                    address: address.to_string(),
                });
                Ok(Self::with_transport(address, Arc::new(transport), output))
            }
            Err(e) => {
                error!(address, error = %e, "Connect failed");
                output.report(Report::ConnectFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Wraps an already connected transport.
    #[must_use]
    pub fn with_transport(
        address: impl Into<String>,
        transport: Arc<dyn Transport>,
        output: Arc<dyn Output>,
    ) -> Self {
        Self {
            address: address.into(),
            transport,
            state: SharedState::new(ConnectionState::Connected),
            output,
        }
    }
}

// ============================================================================
// Session - Accessors
// ============================================================================

impl Session {
    /// Address the session is connected to.
    #[inline]
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }
}

// ============================================================================
// Session - Run
// ============================================================================

impl Session {
    /// Runs one mode and then cleans up.
    ///
    /// With `mode` unset the user is asked to pick one on `lines`. If
    /// `interrupt` resolves first, the mode is abandoned. In every case
    /// the receiver task is stopped and awaited before the transport is
    /// closed, and the transport is closed exactly once. An interrupted
    /// run says goodbye after cleanup.
    pub async fn run<F>(
        self,
        mode: Option<Mode>,
        lines: &mut dyn LineSource,
        plan: &ScriptPlan,
        interrupt: F,
    ) -> SessionOutcome
    where
        F: Future<Output = ()>,
    {
        let mut receiver = None;

        let outcome = tokio::select! {
            outcome = self.drive(mode, lines, plan, &mut receiver) => outcome,
            () = interrupt => {
                self.output.report(Report::Interrupted);
                SessionOutcome::Interrupted
            }
        };

        if let Some(receiver) = receiver {
            let exit = receiver.stop().await;
            debug!(?exit, "Receiver stopped");
        }

        self.close().await;

        if outcome == SessionOutcome::Interrupted {
            self.output.report(Report::Goodbye);
        }

        outcome
    }

    /// Selects and runs the mode, leaving the receiver for `run` to stop.
    async fn drive(
        &self,
        mode: Option<Mode>,
        lines: &mut dyn LineSource,
        plan: &ScriptPlan,
        receiver: &mut Option<ReceiverLoop>,
    ) -> SessionOutcome {
        let mode = match mode {
            Some(mode) => mode,
            None => match select_mode(lines, self.output.as_ref()).await {
                Some(mode) => mode,
                None => return SessionOutcome::NoModeSelected,
            },
        };

        info!(%mode, address = %self.address, "Starting mode");

        match mode {
            Mode::Interactive => {
                *receiver = Some(self.spawn_receiver(Delivery::Display));
                let exit = run_interactive(
                    self.transport.as_ref(),
                    lines,
                    self.output.as_ref(),
                    &self.state,
                )
                .await;
                SessionOutcome::Interactive(exit)
            }
            Mode::Scripted => {
                let (tx, mut rx) = mpsc::unbounded_channel();
                *receiver = Some(self.spawn_receiver(Delivery::Queue(tx)));
                let summary =
                    run_script(self.transport.as_ref(), &mut rx, self.output.as_ref(), plan).await;
                SessionOutcome::Scripted(summary)
            }
        }
    }

    fn spawn_receiver(&self, delivery: Delivery) -> ReceiverLoop {
        ReceiverLoop::spawn(
            Arc::clone(&self.transport),
            self.state.clone(),
            Arc::clone(&self.output),
            delivery,
        )
    }

    async fn close(&self) {
        self.state.set(ConnectionState::Closing);

        if let Err(e) = self.transport.close().await {
            debug!(error = %e, "Close failed");
        }

        self.state.set(ConnectionState::Disconnected);
        self.output.report(Report::Disconnected);
        info!(address = %self.address, "Session closed");
    }
}

/// Asks for `1` or `2` until a valid choice is made.
///
/// Returns `None` when input ends or fails.
async fn select_mode(lines: &mut dyn LineSource, output: &dyn Output) -> Option<Mode> {
    output.report(Report::ModeMenu);

    loop {
        output.report(Report::ModePrompt);

        match lines.next_line().await {
            Ok(Some(choice)) => match Mode::from_choice(&choice) {
                Some(mode) => return Some(mode),
                None => output.report(Report::InvalidChoice),
            },
            Ok(None) => return None,
            Err(e) => {
                output.report(Report::InputFailed {
                    error: e.to_string(),
                });
                return None;
            }
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Validates `config`, connects, and runs the session.
///
/// # Errors
///
/// - [`Error::InvalidAddress`](crate::Error::InvalidAddress) or
///   [`Error::Config`](crate::Error::Config) if `config` is invalid
/// - [`Error::Connect`](crate::Error::Connect) if the server cannot be
///   reached; already reported on `output`
pub async fn start<F>(
    config: &ClientConfig,
    lines: &mut dyn LineSource,
    output: Arc<dyn Output>,
    interrupt: F,
) -> Result<SessionOutcome>
where
    F: Future<Output = ()>,
{
    config.validate()?;

    output.report(Report::Target {
        address: config.address.clone(),
    });

    let session = Session::connect(&config.address, output).await?;
    Ok(session
        .run(config.mode, lines, &config.script, interrupt)
        .await)
}

// ============================================================================
// Tests
// ============================================================================
