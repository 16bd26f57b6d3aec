//! The `auth` subcommand.

use std::path::PathBuf;

use tracing::info;

use playpub_auth::{AuthConfig, Bootstrapper, Credential};

use crate::consent::BrowserConsent;
use crate::error::CliResult;

/// Runs a bootstrap and reports the resulting client.
///
/// With a service-account email this is fully non-interactive; otherwise
/// the installed-application flow runs, reusing persisted tokens when it
/// can and walking the user through consent when it cannot.
pub async fn run(
    app: String,
    service_account: Option<String>,
    secrets_file: Option<PathBuf>,
    key_url: Option<String>,
) -> CliResult<()> {
    let mut config = AuthConfig::new();
    if let Some(url) = key_url {
        config = config.with_key_url(url);
    }
    if let Some(path) = secrets_file {
        config = config.with_client_secrets_path(path);
    }

    let bootstrapper =
        Bootstrapper::new(config)?.with_consent(Box::new(BrowserConsent::new()));

    let client = bootstrapper.init(&app, service_account.as_deref()).await?;

    info!("bootstrap successful for {}", client.application_name());
    match client.credential() {
        Credential::ServiceAccount(sa) => {
            println!("Authorized {} via service account {}.", app, sa.issuer);
        }
        Credential::User(tokens) => {
            println!("Authorized {} via the installed-application flow.", app);
            if let Some(expiry) = tokens.time_until_expiry() {
                println!("Access token valid for another {} minutes.", expiry.num_minutes());
            }
        }
    }

    Ok(())
}
