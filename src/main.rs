//! `ws-test-client` binary.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};

use ws_test_client::{Cli, Console, Error, Output, Report, Result, StdinLines, logging, start};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let output: Arc<dyn Output> = Arc::new(Console);
    output.report(Report::Banner);

    match run(cli, Arc::clone(&output)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.report(Report::Failure {
                error: e.to_string(),
            });
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: Arc<dyn Output>) -> Result<()> {
    let config = cli.into_config()?;
    let mut lines = StdinLines::spawn()?;

    match start(&config, &mut lines, output, interrupted()).await {
        Ok(outcome) => {
            debug!(?outcome, "Run finished");
            Ok(())
        }
        // Already reported; a dead server is not a client failure.
        Err(Error::Connect { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
}
