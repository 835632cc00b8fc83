//! Diagnostic logging setup.
//!
//! Status lines meant for the user go to stdout through
//! [`Output`](crate::Output). `tracing` events go to stderr so the two
//! never interleave on the same stream.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or debug
/// output with `debug = true`. Calling this more than once is a no-op.
pub fn init(debug: bool) {
    let fallback = if debug {
        "ws_test_client=debug"
    } else {
        "ws_test_client=warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
