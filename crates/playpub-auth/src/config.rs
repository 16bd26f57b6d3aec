//! Bootstrapper configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{AuthError, AuthResult};

/// The single authorization scope requested for every credential.
pub const PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Remote location of the service-account private key artifact.
const DEFAULT_KEY_URL: &str =
    "https://storage.googleapis.com/playpub-resources/certificates/android_key.pem";

/// Token-store directory relative to the user's home directory.
const STORE_RELATIVE_DIR: &str = ".store/android_publisher_api";

/// The local user identifier token entries are keyed by.
pub const DEFAULT_USER_ID: &str = "user";

/// Configuration for the authorization bootstrapper.
///
/// All fields have working defaults; the `with_*` builders exist mainly so
/// tests can redirect the fixed endpoints and directories.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// URL of the private-key artifact (service-account flow only).
    pub key_url: String,

    /// Directory the key artifact is materialized into before parsing.
    ///
    /// Each fetch uses a unique file name inside this directory and removes
    /// it after the credential is built.
    pub key_dir: PathBuf,

    /// OAuth 2.0 token endpoint used for code exchange and refresh.
    pub token_url: String,

    /// Directory holding persisted user tokens, one entry per user id.
    pub store_dir: PathBuf,

    /// Local user identifier for token-store entries.
    pub user_id: String,

    /// Path to a client-secrets JSON file overriding the bundled resource.
    pub client_secrets_path: Option<PathBuf>,

    /// OAuth scopes to request. Defaults to exactly the publisher scope.
    pub scopes: Vec<String>,

    /// Timeout applied to every network call, including the key download.
    pub timeout: Duration,

    /// User agent string for HTTP requests.
    pub user_agent: String,
}

impl AuthConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with the fixed production defaults.
    pub fn new() -> Self {
        Self {
            key_url: DEFAULT_KEY_URL.to_string(),
            key_dir: std::env::temp_dir(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            store_dir: Self::default_store_dir(),
            user_id: DEFAULT_USER_ID.to_string(),
            client_secrets_path: None,
            scopes: vec![PUBLISHER_SCOPE.to_string()],
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("playpub/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Returns the default token-store directory under the user's home.
    pub fn default_store_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STORE_RELATIVE_DIR)
    }

    /// Sets the key-artifact URL.
    pub fn with_key_url(mut self, url: impl Into<String>) -> Self {
        self.key_url = url.into();
        self
    }

    /// Sets the directory the key artifact is written into.
    pub fn with_key_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.key_dir = dir.into();
        self
    }

    /// Sets the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the token-store directory.
    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = dir.into();
        self
    }

    /// Sets the local user identifier.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets a client-secrets file overriding the bundled resource.
    pub fn with_client_secrets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_secrets_path = Some(path.into());
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the network timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the token-store entry path for the configured user id.
    pub fn token_entry_path(&self) -> PathBuf {
        self.store_dir.join(format!("{}.json", self.user_id))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        let key_url = Url::parse(&self.key_url)
            .map_err(|e| AuthError::invalid_argument(format!("invalid key URL: {}", e)))?;
        if key_url.scheme() != "https" && key_url.scheme() != "http" {
            return Err(AuthError::invalid_argument(format!(
                "key URL must be http(s), got {}",
                key_url.scheme()
            )));
        }

        Url::parse(&self.token_url)
            .map_err(|e| AuthError::invalid_argument(format!("invalid token URL: {}", e)))?;

        if self.scopes.is_empty() {
            return Err(AuthError::invalid_argument(
                "at least one OAuth scope is required",
            ));
        }

        if self.user_id.is_empty() {
            return Err(AuthError::invalid_argument("user id cannot be empty"));
        }

        Ok(())
    }

    /// Returns the key-artifact file name stem inside `key_dir`.
    pub(crate) fn key_file_name(nonce: u64) -> String {
        format!("android_key-{:016x}.pem", nonce)
    }

    /// Returns the full path for a key artifact with the given nonce.
    pub(crate) fn key_path(&self, nonce: u64) -> PathBuf {
        self.key_dir.join(Self::key_file_name(nonce))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}
