//! Session lifecycle and run modes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── Session ─────────────────────────────┐
//! │                                                                  │
//! │   Interactive / Scripted mode ──send──►┌───────────┐             │
//! │            ▲                           │ Transport │◄──► server  │
//! │            │ reply queue (scripted)    └─────┬─────┘             │
//! │            │                                 │ receive           │
//! │            └──────────── ReceiverLoop ◄──────┘                   │
//! │                               │ display (interactive)            │
//! │                               ▼                                  │
//! │                             Output                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The receiver task is the only reader of the transport. Scripted mode
//! gets its replies from the receiver's queue rather than reading the
//! connection itself.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Session`] and [`start`] |
//! | `receiver` | Background receive task |
//! | `interactive` | Line-driven mode |
//! | `scripted` | Fixed-sequence mode |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::watch;

// ============================================================================
// Submodules
// ============================================================================

/// Session ownership and cleanup.
pub mod core;

/// Line-driven mode.
pub mod interactive;

/// Background receive task.
pub mod receiver;

/// Fixed-sequence mode.
pub mod scripted;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::{Session, SessionOutcome, start};
pub use interactive::{Command, InteractiveExit, run_interactive};
pub use receiver::{Delivery, LoopExit, ReceiverLoop};
pub use scripted::{ReplyOutcome, ScriptSummary, StepOutcome, run_script};

// ============================================================================
// ConnectionState
// ============================================================================

/// Where the session's connection is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No usable connection.
    #[default]
    Disconnected,
    /// Connection is open.
    Connected,
    /// Session is closing the connection.
    Closing,
}

// ============================================================================
// SharedState
// ============================================================================

/// Connection state shared between the session, its mode and the receiver.
///
/// Backed by a watch channel so a mode can wait for the peer to go away.
#[derive(Debug, Clone)]
pub struct SharedState {
    tx: Arc<watch::Sender<ConnectionState>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(ConnectionState::default())
    }
}

impl SharedState {
    /// Creates state starting at `initial`.
    #[must_use]
    pub fn new(initial: ConnectionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Replaces the state and wakes waiters.
    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.tx.send_replace(state);
    }

    /// Returns `true` while the connection is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    /// Resolves once the state is [`ConnectionState::Disconnected`].
    pub async fn disconnected(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this cannot fail while we wait.
        let _ = rx
            .wait_for(|state| *state == ConnectionState::Disconnected)
            .await;
    }
}

// ============================================================================
// Tests
// ============================================================================
