//! OAuth 2.0 authorization-code flow for the installed application.
//!
//! Implements the Authorization Code flow with PKCE (Proof Key for Code
//! Exchange). The consent step itself — getting the user in front of the
//! authorization URL and collecting the resulting code — is an external
//! collaborator behind the [`ConsentPrompt`] trait; this module only builds
//! the URL, exchanges the code for tokens, and refreshes them.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::secrets::ClientSecrets;
use crate::tokens::TokenInfo;
use crate::transport::HttpTransport;

/// Google's OAuth 2.0 authorization endpoint.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// The PKCE code verifier length in bytes, before base64 encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

/// The outcome of a consent step.
#[derive(Debug)]
pub struct ConsentResponse {
    /// The authorization code returned by the authorization server.
    pub code: String,
    /// The echoed `state` parameter, when the mechanism can echo it.
    ///
    /// Manual mechanisms (pasting a code from the browser) cannot; loopback
    /// receivers can and must.
    pub state: Option<String>,
}

/// External collaborator that walks the user through the consent step.
///
/// Implementations may open a browser and read a pasted code from stdin,
/// run a loopback HTTP receiver, or drive a headless test double. Declined
/// or timed-out consent is reported as a `UserCancelled` error.
pub trait ConsentPrompt: Send + Sync {
    /// The redirect URI the authorization request is built with.
    fn redirect_uri(&self) -> String;

    /// Presents `auth_url` to the user and returns the authorization code.
    fn obtain_code(&self, auth_url: &str) -> AuthResult<ConsentResponse>;
}

/// PKCE flow state (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    /// The code verifier (high-entropy random string).
    pub verifier: String,
    /// The code challenge (SHA-256 hash of verifier, base64url encoded).
    pub challenge: String,
    /// Random state for CSRF protection.
    pub state: String,
}

impl PkceFlow {
    /// Creates a new PKCE flow with random verifier and state.
    pub fn new() -> Self {
        let verifier = Self::generate_verifier();
        let challenge = Self::compute_challenge(&verifier);
        let state = Self::generate_state();

        Self {
            verifier,
            challenge,
            state,
        }
    }

    fn generate_verifier() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..CODE_VERIFIER_LENGTH).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    fn compute_challenge(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    fn generate_state() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..16).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    /// Builds the authorization URL.
    pub fn build_auth_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Installed-application authorization flow.
///
/// Owns the code exchange and refresh against the token endpoint; consent
/// is delegated to a [`ConsentPrompt`].
pub struct InstalledFlow<'a> {
    secrets: &'a ClientSecrets,
    config: &'a AuthConfig,
    transport: &'a HttpTransport,
}

impl<'a> InstalledFlow<'a> {
    /// Creates a flow over the given secrets and transport.
    pub fn new(
        secrets: &'a ClientSecrets,
        config: &'a AuthConfig,
        transport: &'a HttpTransport,
    ) -> Self {
        Self {
            secrets,
            config,
            transport,
        }
    }

    /// Runs the interactive authorization-code exchange.
    ///
    /// Builds a PKCE challenge, hands the authorization URL to the consent
    /// collaborator, verifies the echoed state when one is returned, and
    /// exchanges the code for tokens scoped to the configured scopes.
    pub async fn authorize(&self, consent: &dyn ConsentPrompt) -> AuthResult<TokenInfo> {
        let pkce = PkceFlow::new();
        let redirect_uri = consent.redirect_uri();
        let auth_url =
            pkce.build_auth_url(&self.secrets.client_id, &redirect_uri, &self.config.scopes);

        info!("starting installed-application consent step");
        debug!("authorization URL: {}", auth_url);

        let response = consent.obtain_code(&auth_url)?;

        if let Some(ref received_state) = response.state
            && *received_state != pkce.state
        {
            return Err(AuthError::user_cancelled(
                "authorization state mismatch - possible CSRF attack",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&response.code, &pkce.verifier, &redirect_uri)
            .await
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> AuthResult<TokenInfo> {
        let params = [
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .transport
            .client()
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                AuthError::network("token exchange request failed").with_source(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::network("failed to read token response").with_source(e))?;

        if !status.is_success() {
            return Err(AuthError::user_cancelled(format!(
                "token exchange rejected ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AuthError::network("invalid token endpoint response").with_source(e)
        })?;

        info!("obtained user tokens");
        Ok(TokenInfo::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
            self.config.scopes.clone(),
        ))
    }

    /// Refreshes an expired access token using the refresh token.
    ///
    /// Returns the new access token and its expiry time.
    pub async fn refresh_token(&self, refresh_token: &str) -> AuthResult<(String, Option<i64>)> {
        let params = [
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .transport
            .client()
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::network("token refresh request failed").with_source(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::network("failed to read refresh response").with_source(e))?;

        if !status.is_success() {
            return Err(AuthError::network(format!(
                "token refresh rejected ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AuthError::network("invalid token endpoint response").with_source(e)
        })?;

        info!("refreshed access token");
        Ok((token_response.access_token, token_response.expires_in))
    }
}

/// Response from the token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkce_verifier_length() {
        let flow = PkceFlow::new();
        // Base64 encoding of 32 bytes = 43 characters (no padding)
        assert_eq!(flow.verifier.len(), 43);
    }

    #[test]
    fn pkce_challenge_is_deterministic() {
        let verifier = "test-verifier-string";
        let challenge1 = PkceFlow::compute_challenge(verifier);
        let challenge2 = PkceFlow::compute_challenge(verifier);
        assert_eq!(challenge1, challenge2);
    }

    #[test]
    fn pkce_flows_are_random() {
        let flow1 = PkceFlow::new();
        let flow2 = PkceFlow::new();
        assert_ne!(flow1.challenge, flow2.challenge);
        assert_ne!(flow1.state, flow2.state);
    }

    #[test]
    fn auth_url_format() {
        let flow = PkceFlow::new();
        let url = flow.build_auth_url(
            "test-client.apps.googleusercontent.com",
            "urn:ietf:wg:oauth:2.0:oob",
            &["https://www.googleapis.com/auth/androidpublisher".to_string()],
        );

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id="));
        assert!(url.contains("redirect_uri="));
        assert!(url.contains("code_challenge="));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("state="));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("androidpublisher"));
    }

    #[test]
    fn token_response_parsing() {
        let json = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "token_type": "Bearer"
        }"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "at");
        assert_eq!(parsed.refresh_token, Some("rt".to_string()));
        assert_eq!(parsed.expires_in, Some(3600));
    }

    #[test]
    fn token_response_without_refresh() {
        let json = r#"{ "access_token": "at" }"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.refresh_token.is_none());
        assert!(parsed.expires_in.is_none());
    }
}
