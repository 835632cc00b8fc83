//! Background receive task.
//!
//! [`ReceiverLoop`] owns the only read path on a transport. It runs as a
//! tokio task until the peer closes, a read fails, or [`ReceiverLoop::stop`]
//! cancels it. Cancellation drops the in-flight receive, so stopping never
//! waits for the next frame.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::output::{Output, Report};
use crate::transport::{Inbound, InboundMessage, Transport};

use super::{ConnectionState, SharedState};

// ============================================================================
// Constants
// ============================================================================

/// How long `stop` waits for the task before aborting it.
const STOP_GRACE: Duration = Duration::from_secs(1);

// ============================================================================
// Types
// ============================================================================

/// Where received messages go.
#[derive(Debug)]
pub enum Delivery {
    /// Reported on the output sink as they arrive.
    Display,
    /// Pushed onto a queue for a consumer that waits for replies.
    ///
    /// Falls back to display once the consumer has gone away.
    Queue(mpsc::UnboundedSender<InboundMessage>),
}

/// Why the receive task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Peer closed the connection.
    Closed,
    /// A read failed.
    Failed,
    /// Stopped on request.
    Cancelled,
    /// Did not stop within the grace period, or panicked.
    Aborted,
}

// ============================================================================
// ReceiverLoop
// ============================================================================

/// Handle to a running receive task.
///
/// Dropping the handle cancels the task without waiting for it.
#[derive(Debug)]
pub struct ReceiverLoop {
    cancel_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<LoopExit>>,
}

impl ReceiverLoop {
    /// Spawns the receive task on the current runtime.
    ///
    /// Only one loop may run per transport.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        state: SharedState,
        output: Arc<dyn Output>,
        delivery: Delivery,
    ) -> Self {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = tokio::spawn(run(transport, state, output, delivery, cancel_rx));

        Self {
            cancel_tx: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    /// Returns `true` once the task has ended on its own or been stopped.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancels the task and waits for it to end.
    ///
    /// Completes within one second even if the task misbehaves; an
    /// overrunning task is aborted. A task that already ended reports its
    /// own exit reason.
    pub async fn stop(mut self) -> LoopExit {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            // Fails only when the task already ended.
            let _ = cancel_tx.send(());
        }

        let Some(mut handle) = self.handle.take() else {
            return LoopExit::Cancelled;
        };

        match timeout(STOP_GRACE, &mut handle).await {
            Ok(Ok(exit)) => exit,
            Ok(Err(e)) => {
                warn!(error = %e, "Receiver task failed");
                LoopExit::Aborted
            }
            Err(_) => {
                warn!("Receiver task did not stop in time, aborting");
                handle.abort();
                LoopExit::Aborted
            }
        }
    }
}

impl Drop for ReceiverLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// ============================================================================
// Task Body
// ============================================================================

async fn run(
    transport: Arc<dyn Transport>,
    state: SharedState,
    output: Arc<dyn Output>,
    delivery: Delivery,
    mut cancel_rx: oneshot::Receiver<()>,
) -> LoopExit {
    debug!("Receiver loop started");

    let exit = loop {
        tokio::select! {
            biased;

            // Fires on request and when the handle is dropped.
            _ = &mut cancel_rx => break LoopExit::Cancelled,

            result = transport.receive() => match result {
                Ok(Inbound::Text(text)) => {
                    deliver(&delivery, output.as_ref(), InboundMessage::new(text));
                }

                Ok(Inbound::Closed) => {
                    state.set(ConnectionState::Disconnected);
                    output.report(Report::ClosedByServer);
                    break LoopExit::Closed;
                }

                Err(e) => {
                    error!(error = %e, "Receive failed");
                    output.report(Report::ReceiveFailed {
                        error: e.to_string(),
                    });
                    break LoopExit::Failed;
                }
            },
        }
    };

    debug!(?exit, "Receiver loop terminated");
    exit
}

fn deliver(delivery: &Delivery, output: &dyn Output, message: InboundMessage) {
    match delivery {
        Delivery::Display => output.report(Report::Received(message)),
        Delivery::Queue(tx) => {
            if let Err(mpsc::error::SendError(message)) = tx.send(message) {
                output.report(Report::Received(message));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
