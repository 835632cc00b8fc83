//! Command-line arguments.

use std::time::Duration;

use clap::Parser;

use crate::config::{ClientConfig, DEFAULT_ADDRESS, DEFAULT_PAUSE, DEFAULT_REPLY_TIMEOUT, Mode};
use crate::error::Result;

/// Interactive and scripted WebSocket test client.
#[derive(Debug, Clone, Parser)]
#[command(name = "ws-test-client", version, about)]
pub struct Cli {
    /// WebSocket server address.
    #[arg(default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Run this mode instead of asking (interactive or scripted).
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// How long scripted mode waits for each reply, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_REPLY_TIMEOUT.as_millis() as u64)]
    pub reply_timeout_ms: u64,

    /// Pause between scripted messages, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_PAUSE.as_millis() as u64)]
    pub pause_ms: u64,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Builds and validates the client configuration.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`ClientConfig::validate`].
    pub fn into_config(self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(self.address)
            .with_reply_timeout(Duration::from_millis(self.reply_timeout_ms))
            .with_pause(Duration::from_millis(self.pause_ms));

        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ws-test-client"]).expect("parse");
        assert_eq!(cli.address, DEFAULT_ADDRESS);
        assert!(cli.mode.is_none());
        assert!(!cli.debug);

        let config = cli.into_config().expect("valid");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "ws-test-client",
            "ws://10.0.0.5:9000/ws",
            "--mode",
            "scripted",
            "--reply-timeout-ms",
            "500",
            "--pause-ms",
            "50",
            "--debug",
        ])
        .expect("parse");
        assert!(cli.debug);

        let config = cli.into_config().expect("valid");
        assert_eq!(config.address, "ws://10.0.0.5:9000/ws");
        assert_eq!(config.mode, Some(Mode::Scripted));
        assert_eq!(config.script.reply_timeout, Duration::from_millis(500));
        assert_eq!(config.script.pause, Duration::from_millis(50));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["ws-test-client", "--mode", "turbo"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = Cli::try_parse_from(["ws-test-client", "--reply-timeout-ms", "0"])
            .expect("parse");
        assert!(matches!(cli.into_config(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_bad_address_rejected() {
        let cli = Cli::try_parse_from(["ws-test-client", "localhost:8080"]).expect("parse");
        assert!(matches!(
            cli.into_config(),
            Err(Error::InvalidAddress { .. })
        ));
    }
}
