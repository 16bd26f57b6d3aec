//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bootstrap authenticated clients for the Google Play publishing API.
#[derive(Debug, Parser)]
#[command(name = "playpub", version, about)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Obtain an authenticated client for an application.
    Auth {
        /// The application name, e.g. com.example.app.
        #[arg(long)]
        app: String,

        /// Service-account email. Without it, the interactive
        /// installed-application flow runs.
        #[arg(long)]
        service_account: Option<String>,

        /// Client-secrets JSON file overriding the bundled resource
        /// (installed-application flow only).
        #[arg(long)]
        secrets_file: Option<PathBuf>,

        /// Key-artifact URL override (service-account flow only).
        #[arg(long, env = "PLAYPUB_KEY_URL")]
        key_url: Option<String>,
    },

    /// Show the persisted-token state.
    Status,

    /// Remove persisted tokens.
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn auth_with_service_account_parses() {
        let cli = Cli::parse_from([
            "playpub",
            "auth",
            "--app",
            "com.example.app",
            "--service-account",
            "svc@acct.iam.gserviceaccount.com",
        ]);

        let Command::Auth {
            app,
            service_account,
            ..
        } = cli.command
        else {
            panic!("expected the auth subcommand");
        };
        assert_eq!(app, "com.example.app");
        assert_eq!(
            service_account.as_deref(),
            Some("svc@acct.iam.gserviceaccount.com")
        );
    }

    #[test]
    fn auth_without_service_account_parses() {
        let cli = Cli::parse_from(["playpub", "auth", "--app", "com.example.app"]);
        let Command::Auth {
            service_account, ..
        } = cli.command
        else {
            panic!("expected the auth subcommand");
        };
        assert!(service_account.is_none());
    }
}
