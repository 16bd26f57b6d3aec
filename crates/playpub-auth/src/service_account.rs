//! Non-interactive service-account authorization.
//!
//! Fetches the private-key artifact from its fixed remote location,
//! materializes it to a local file, and signs a JWT assertion scoped to the
//! publishing API with the supplied service-account email as the signer
//! identity. Stateless across runs: every bootstrap fetches a fresh
//! artifact.

use std::fs;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rand::Rng as _;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::credential::{Credential, ServiceAccountCredential};
use crate::error::{AuthError, AuthResult};
use crate::transport::HttpTransport;

/// Assertion validity window in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// JWT claim set for the service-account assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Service-account authorization flow.
pub struct ServiceAccountFlow<'a> {
    config: &'a AuthConfig,
    transport: &'a HttpTransport,
}

impl<'a> ServiceAccountFlow<'a> {
    /// Creates a flow over the given configuration and transport.
    pub fn new(config: &'a AuthConfig, transport: &'a HttpTransport) -> Self {
        Self { config, transport }
    }

    /// Authorizes using the service account with the given email.
    pub async fn authorize(&self, email: &str) -> AuthResult<Credential> {
        if email.is_empty() {
            return Err(AuthError::invalid_argument(
                "service account email cannot be empty",
            ));
        }

        info!("authorizing using service account {}", email);

        // Unique per call so concurrent bootstraps cannot race on the path
        let nonce: u64 = rand::rng().random();
        let key_path = self.config.key_path(nonce);

        self.fetch_key(&key_path).await?;

        let result = self.build_credential(email, &key_path);

        // The artifact holds private-key material; never leave it behind
        if let Err(e) = fs::remove_file(&key_path) {
            warn!("failed to remove key artifact {:?}: {}", key_path, e);
        }

        result
    }

    /// Downloads the key artifact to the given local path.
    async fn fetch_key(&self, key_path: &std::path::Path) -> AuthResult<()> {
        let response = self
            .transport
            .client()
            .get(&self.config.key_url)
            .send()
            .await
            .map_err(|e| {
                AuthError::key_fetch(format!("failed to fetch key from {}", self.config.key_url))
                    .with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::key_fetch(format!(
                "key endpoint returned {} for {}",
                status, self.config.key_url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::key_fetch("failed to read key response body").with_source(e))?;

        if let Some(parent) = key_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::key_fetch(format!("failed to create key directory {:?}", parent))
                    .with_source(e)
            })?;
        }

        fs::write(key_path, &body).map_err(|e| {
            AuthError::key_fetch(format!("failed to write key artifact {:?}", key_path))
                .with_source(e)
        })?;

        info!("fetched key artifact to {:?}", key_path);
        Ok(())
    }

    /// Builds the signed-JWT credential from the fetched key file.
    fn build_credential(&self, email: &str, key_path: &std::path::Path) -> AuthResult<Credential> {
        let key_pem = fs::read(key_path).map_err(|e| {
            AuthError::key_fetch(format!("failed to read key artifact {:?}", key_path))
                .with_source(e)
        })?;

        let signing_key = EncodingKey::from_rsa_pem(&key_pem).map_err(|e| {
            AuthError::key_format("key artifact is not a valid RSA key container").with_source(e)
        })?;

        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::seconds(ASSERTION_LIFETIME_SECS);

        let claims = AssertionClaims {
            iss: email,
            scope: self.config.scopes.join(" "),
            aud: &self.config.token_url,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| {
                AuthError::security_init("failed to initialize JWT signing").with_source(e)
            })?;

        Ok(Credential::ServiceAccount(ServiceAccountCredential {
            issuer: email.to_string(),
            assertion,
            scopes: self.config.scopes.clone(),
            expires_at,
        }))
    }
}
