//! Command line arguments.

use crate::api::DEFAULT_API_URL;
use crate::app::DEFAULT_TIMEOUT;
use clap::Parser;
use std::time::Duration;

/// Terminal client for the todo service
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "todo")]
#[command(about = "Manage your todos from the terminal")]
#[command(version)]
pub struct Cli {
    /// Base URL of the todo API
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Seconds to wait for the service on each command
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Verbose logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Per-command timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn explicit_arguments() {
        let cli = Cli::try_parse_from(["todo", "--api-url", "http://example:8080/api", "--timeout-secs", "3", "-v"])
            .unwrap();

        assert_eq!(cli.api_url, "http://example:8080/api");
        assert_eq!(cli.timeout(), Duration::from_secs(3));
        assert!(cli.verbose);
    }

    #[test]
    fn timeout_defaults_to_app_timeout() {
        let cli = Cli::try_parse_from(["todo"]).unwrap();

        assert_eq!(cli.timeout(), DEFAULT_TIMEOUT);
        assert!(!cli.verbose);
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["todo", "--timeout-secs", "soon"]).is_err());
    }
}
