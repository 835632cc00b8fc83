//! WebSocket test client - exercise a WebSocket server from the terminal.
//!
//! Connects to a server and then either lets a human type messages while
//! a background task prints everything the server sends, or runs a fixed
//! sequence of test messages with a bounded wait for a reply after each.
//!
//! # Architecture
//!
//! - **Transport**: one duplex WebSocket connection behind the
//!   [`Transport`] trait
//! - **Receiver loop**: the only reader of the connection, cancellable
//! - **Session**: owns the connection, runs one mode, always cleans up
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ws_test_client::{ClientConfig, Console, Mode, StdinLines, start};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> ws_test_client::Result<()> {
//!     let config = ClientConfig::new("ws://localhost:8080").with_mode(Mode::Scripted);
//!     let mut lines = StdinLines::spawn()?;
//!
//!     let outcome = start(&config, &mut lines, Arc::new(Console), std::future::pending()).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cli`] | Command-line arguments |
//! | [`config`] | [`ClientConfig`], [`Mode`], [`ScriptPlan`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`input`] | Line sources for interactive input |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | User-facing [`Report`]s and sinks |
//! | [`session`] | [`Session`], receiver loop, run modes |
//! | [`transport`] | [`Transport`] trait and WebSocket implementation |

// ============================================================================
// Modules
// ============================================================================

/// Command-line arguments.
pub mod cli;

/// Client configuration.
pub mod config;

/// Error types and result aliases.
pub mod error;

/// Line-oriented user input.
pub mod input;

/// Diagnostic logging setup.
pub mod logging;

/// User-facing status output.
pub mod output;

/// Session lifecycle and run modes.
pub mod session;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::Cli;
pub use config::{ClientConfig, Mode, ScriptPlan};
pub use error::{Error, Result};
pub use input::{LineSource, StdinLines};
pub use output::{Console, Output, Report};
pub use session::{ConnectionState, Session, SessionOutcome, start};
pub use transport::{Inbound, InboundMessage, Transport, WsTransport};
