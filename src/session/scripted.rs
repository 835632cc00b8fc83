//! Fixed-sequence mode.
//!
//! For every message in the [`ScriptPlan`]: send it, wait up to the reply
//! timeout for one message on the reply queue, then pause. Steps run
//! strictly one after another and a failed send or a missing reply never
//! cuts the run short.
//!
//! Replies come from the receiver task's queue, not from the transport,
//! so there is only ever one reader on the connection. Anything that
//! shows up after a step's wait has expired is shown as a plain received
//! message at the start of the next step, or before completion is
//! reported, rather than being taken as that step's reply.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::ScriptPlan;
use crate::error::Error;
use crate::output::{Output, Report};
use crate::transport::{InboundMessage, Transport};

// ============================================================================
// Types
// ============================================================================

/// What came back after one scripted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// A message arrived within the timeout.
    Reply(String),
    /// Nothing arrived within the timeout.
    Timeout,
    /// The reply queue closed; the connection is gone.
    Closed,
}

/// Result of one scripted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Message sent in this step.
    pub message: String,
    /// Whether the send succeeded.
    pub sent: bool,
    /// What came back.
    pub reply: ReplyOutcome,
}

/// Results of a whole scripted run, one entry per message in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    /// Step results in order.
    pub steps: Vec<StepOutcome>,
}

impl ScriptSummary {
    /// Number of steps that got a reply.
    #[must_use]
    pub fn replies(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.reply, ReplyOutcome::Reply(_)))
            .count()
    }

    /// Number of steps whose wait timed out.
    #[must_use]
    pub fn timeouts(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.reply == ReplyOutcome::Timeout)
            .count()
    }

    /// Number of steps whose send failed.
    #[must_use]
    pub fn send_failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.sent).count()
    }
}

// ============================================================================
// Mode Loop
// ============================================================================

/// Runs every step of `plan` against `transport`.
///
/// `replies` must be fed by the receiver task running with
/// [`Delivery::Queue`](super::Delivery::Queue).
pub async fn run_script(
    transport: &dyn Transport,
    replies: &mut mpsc::UnboundedReceiver<InboundMessage>,
    output: &dyn Output,
    plan: &ScriptPlan,
) -> ScriptSummary {
    output.report(Report::ScriptStarted);

    let total = plan.messages.len();
    let mut summary = ScriptSummary::default();

    for (index, message) in plan.messages.iter().enumerate() {
        output.report(Report::ScriptStep {
            index: index + 1,
            total,
        });

        drain_late(replies, output);

        let sent = match transport.send(message).await {
            Ok(()) => {
                output.report(Report::Sent {
                    message: message.clone(),
                });
                true
            }
            Err(e) => {
                warn!(error = %e, step = index + 1, "Scripted send failed");
                output.report(Report::SendFailed {
                    error: e.to_string(),
                });
                false
            }
        };

        let reply = match timeout(plan.reply_timeout, replies.recv()).await {
            Ok(Some(reply)) => {
                let text = reply.text.clone();
                output.report(Report::Response(reply));
                ReplyOutcome::Reply(text)
            }
            Ok(None) => {
                output.report(Report::ReceiveFailed {
                    error: Error::receive("connection closed").to_string(),
                });
                ReplyOutcome::Closed
            }
            Err(_) => {
                debug!(step = index + 1, "No reply within timeout");
                output.report(Report::ReplyTimeout);
                ReplyOutcome::Timeout
            }
        };

        summary.steps.push(StepOutcome {
            message: message.clone(),
            sent,
            reply,
        });

        sleep(plan.pause).await;
    }

    drain_late(replies, output);
    output.report(Report::ScriptCompleted);
    summary
}

/// Shows whatever is already queued as plain received messages.
fn drain_late(replies: &mut mpsc::UnboundedReceiver<InboundMessage>, output: &dyn Output) {
    while let Ok(late) = replies.try_recv() {
        output.report(Report::Received(late));
    }
}

// ============================================================================
// Tests
// ============================================================================
