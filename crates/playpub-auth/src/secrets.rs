//! Client-secrets loading and validation for the installed-application flow.

use std::path::Path;

use serde::Deserialize;
use tracing::error;

use crate::error::{AuthError, AuthResult};

/// Values still carrying this marker were never filled in from the APIs
/// console and make the deployment unusable.
const PLACEHOLDER_MARKER: &str = "[[INSERT";

/// The client-secrets resource compiled into the library.
const BUNDLED_SECRETS: &str = include_str!("../resources/google/client_secrets.json");

/// OAuth 2.0 client secrets for the installed-application flow.
#[derive(Debug, Clone)]
pub struct ClientSecrets {
    /// The OAuth 2.0 client ID from the APIs console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from the APIs console.
    pub client_secret: String,
}

/// Structure of the client-secrets JSON file.
///
/// Supports the APIs-console format with an "installed" or "web" section,
/// and the flat format with both fields at the root level.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<NestedSecrets>,
    web: Option<NestedSecrets>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

/// Secrets within a nested section of the JSON file.
#[derive(Debug, Deserialize)]
struct NestedSecrets {
    client_id: String,
    client_secret: String,
}

impl ClientSecrets {
    /// Creates client secrets from raw values.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads the client-secrets record bundled into the library.
    pub fn bundled() -> AuthResult<Self> {
        Self::from_json(BUNDLED_SECRETS)
    }

    /// Loads client secrets from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuthError::resource_missing(format!(
                "failed to read client secrets {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parses client secrets from a JSON string.
    pub fn from_json(json: &str) -> AuthResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json).map_err(|e| {
            AuthError::resource_missing(format!("failed to parse client secrets: {}", e))
        })?;

        if let Some(nested) = file.installed.or(file.web) {
            return Ok(Self::new(nested.client_id, nested.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(AuthError::resource_missing(
            "client secrets must contain an 'installed'/'web' section \
             or 'client_id'/'client_secret' at the root level",
        ))
    }

    /// Ensures the secrets were filled in from the APIs console.
    ///
    /// Placeholder values are a fatal configuration error: there is no safe
    /// fallback for this flow, so the caller is expected to halt the process
    /// (see [`Bootstrapper::init`](crate::Bootstrapper::init)).
    pub fn ensure_filled_in(&self) -> AuthResult<()> {
        if self.client_id.starts_with(PLACEHOLDER_MARKER)
            || self.client_secret.starts_with(PLACEHOLDER_MARKER)
        {
            error!(
                "enter the client ID and secret from the APIs console into \
                 resources/google/client_secrets.json"
            );
            return Err(AuthError::configuration_fatal(
                "client secrets still contain placeholder values",
            ));
        }
        Ok(())
    }
}
