//! The authorization bootstrapper: strategy selection and orchestration.
//!
//! [`Bootstrapper`] is the explicit context object that replaces the
//! process-wide statics of older designs: the process entry point creates
//! one, and every bootstrap call goes through it. It memoizes the trusted
//! transport, routes to exactly one credential strategy per call, and hands
//! the result to the client builder.

use std::process;
use std::sync::{Mutex, OnceLock};

use tracing::{debug, error, info};

use crate::client::PublisherClient;
use crate::config::AuthConfig;
use crate::credential::Credential;
use crate::error::{AuthError, AuthResult};
use crate::oauth::{ConsentPrompt, InstalledFlow};
use crate::secrets::ClientSecrets;
use crate::service_account::ServiceAccountFlow;
use crate::tokens::TokenStore;
use crate::transport::HttpTransport;

/// The credential-acquisition strategy for a bootstrap call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Non-interactive, private-key based.
    ServiceAccount,
    /// Interactive authorization-code flow with persisted tokens.
    InstalledApplication,
}

impl Strategy {
    /// Selects the strategy from the optional service-account email.
    ///
    /// Presence and non-emptiness of the email is the sole discriminator.
    pub fn select(service_account_email: Option<&str>) -> Self {
        match service_account_email {
            Some(email) if !email.is_empty() => Self::ServiceAccount,
            _ => Self::InstalledApplication,
        }
    }
}

/// Context object producing authenticated publishing-API clients.
pub struct Bootstrapper {
    config: AuthConfig,
    secrets: Option<ClientSecrets>,
    consent: Option<Box<dyn ConsentPrompt>>,
    transport: OnceLock<HttpTransport>,
    transport_init: Mutex<()>,
}

impl Bootstrapper {
    /// Creates a bootstrapper over the given configuration.
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            secrets: None,
            consent: None,
            transport: OnceLock::new(),
            transport_init: Mutex::new(()),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Supplies client secrets directly, overriding the configured file and
    /// the bundled resource.
    pub fn with_client_secrets(mut self, secrets: ClientSecrets) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Supplies the consent collaborator for the interactive flow.
    ///
    /// Without one, the installed-application strategy can only reuse
    /// persisted tokens; a required interactive step fails explicitly.
    pub fn with_consent(mut self, consent: Box<dyn ConsentPrompt>) -> Self {
        self.consent = Some(consent);
        self
    }

    /// Returns the shared transport, constructing it on first use.
    ///
    /// At most one transport is ever constructed: a mutex guards the
    /// construction and the `OnceLock` is re-checked under it, so concurrent
    /// callers converge on the same handle.
    pub fn transport(&self) -> AuthResult<&HttpTransport> {
        if let Some(transport) = self.transport.get() {
            return Ok(transport);
        }

        let _guard = self
            .transport_init
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(transport) = self.transport.get() {
            return Ok(transport);
        }

        let transport = HttpTransport::new(&self.config)?;
        Ok(self.transport.get_or_init(|| transport))
    }

    /// Produces an authenticated client, propagating every failure as a
    /// typed error.
    ///
    /// `application_name` must be non-empty; the optional
    /// `service_account_email` selects the strategy (see
    /// [`Strategy::select`]). Exactly one strategy executes per call.
    pub async fn bootstrap(
        &self,
        application_name: &str,
        service_account_email: Option<&str>,
    ) -> AuthResult<PublisherClient> {
        if application_name.is_empty() {
            return Err(AuthError::invalid_argument(
                "applicationName cannot be empty",
            ));
        }

        let transport = self.transport()?;

        let credential = match Strategy::select(service_account_email) {
            Strategy::ServiceAccount => {
                let email = service_account_email.unwrap_or_default();
                ServiceAccountFlow::new(&self.config, transport)
                    .authorize(email)
                    .await?
            }
            Strategy::InstalledApplication => self.authorize_installed(transport).await?,
        };

        PublisherClient::build(transport, credential, application_name)
    }

    /// The process-facing entry point.
    ///
    /// Identical to [`bootstrap`](Self::bootstrap), except that a
    /// [`ConfigurationFatal`](crate::AuthErrorCode::ConfigurationFatal)
    /// failure terminates the process with exit code 1: placeholder secrets
    /// mean the deployment is unusable, and continuing would proceed
    /// unauthenticated.
    pub async fn init(
        &self,
        application_name: &str,
        service_account_email: Option<&str>,
    ) -> AuthResult<PublisherClient> {
        match self.bootstrap(application_name, service_account_email).await {
            Err(err) if err.is_fatal() => {
                error!("{}", err);
                process::exit(1);
            }
            other => other,
        }
    }

    /// Runs the installed-application strategy.
    async fn authorize_installed(&self, transport: &HttpTransport) -> AuthResult<Credential> {
        info!("authorizing using installed application");

        let secrets = self.load_secrets()?;
        secrets.ensure_filled_in()?;

        let store = TokenStore::new(&self.config.store_dir);
        if let Some(mut tokens) = store.load(&self.config.user_id)? {
            if !tokens.has_scopes(&self.config.scopes) {
                info!("persisted tokens lack the required scopes, re-authorizing");
            } else if !tokens.is_expired() {
                info!("reusing persisted tokens for {:?}", self.config.user_id);
                return Ok(Credential::User(tokens));
            } else if let Some(refresh_token) = tokens.refresh_token.clone() {
                debug!("refreshing expired access token");
                let flow = InstalledFlow::new(&secrets, &self.config, transport);
                let (access_token, expires_in) = flow.refresh_token(&refresh_token).await?;
                tokens.update_access_token(access_token, expires_in);
                store.save(&self.config.user_id, &tokens)?;
                return Ok(Credential::User(tokens));
            }
        }

        let consent = self.consent.as_deref().ok_or_else(|| {
            AuthError::user_cancelled(
                "no consent mechanism available - cannot run the interactive authorization step",
            )
        })?;

        let flow = InstalledFlow::new(&secrets, &self.config, transport);
        let tokens = flow.authorize(consent).await?;
        store.save(&self.config.user_id, &tokens)?;
        Ok(Credential::User(tokens))
    }

    /// Resolves client secrets: explicit override, configured file, then
    /// the bundled resource.
    fn load_secrets(&self) -> AuthResult<ClientSecrets> {
        if let Some(ref secrets) = self.secrets {
            return Ok(secrets.clone());
        }
        if let Some(ref path) = self.config.client_secrets_path {
            return ClientSecrets::from_file(path);
        }
        ClientSecrets::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthErrorCode;

    #[test]
    fn strategy_selection_is_pure_in_presence() {
        assert_eq!(Strategy::select(None), Strategy::InstalledApplication);
        assert_eq!(Strategy::select(Some("")), Strategy::InstalledApplication);
        assert_eq!(
            Strategy::select(Some("svc@acct.iam.gserviceaccount.com")),
            Strategy::ServiceAccount
        );
    }

    #[tokio::test]
    async fn empty_application_name_is_invalid_argument() {
        let bootstrapper = Bootstrapper::new(AuthConfig::new()).unwrap();
        let err = bootstrapper
            .bootstrap("", Some("svc@acct.iam.gserviceaccount.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::InvalidArgument);
    }

    #[test]
    fn transport_is_constructed_once() {
        let bootstrapper = std::sync::Arc::new(Bootstrapper::new(AuthConfig::new()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bootstrapper = bootstrapper.clone();
                std::thread::spawn(move || {
                    bootstrapper.transport().unwrap() as *const HttpTransport as usize
                })
            })
            .collect();

        let pointers: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(pointers.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AuthConfig::new().with_key_url("not a url");
        assert!(Bootstrapper::new(config).is_err());
    }
}
