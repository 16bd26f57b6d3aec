//! Authenticated publishing-API client handle.

use reqwest::Method;
use tracing::debug;

use crate::config::PUBLISHER_SCOPE;
use crate::credential::Credential;
use crate::error::{AuthError, AuthResult};
use crate::transport::HttpTransport;

/// Base URL for the Android Publisher API v3.
const PUBLISHER_API_BASE: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";

/// An authenticated handle to the publishing API.
///
/// Pure composition of transport, credential, and application name. The
/// credential is not validated against the remote service here - that
/// happens on the first real API call.
#[derive(Debug)]
pub struct PublisherClient {
    http: reqwest::Client,
    application_name: String,
    credential: Credential,
}

impl PublisherClient {
    /// Builds the client from a transport, a credential, and the
    /// application name.
    ///
    /// Fails with `ClientBuild` if the credential does not carry the
    /// publisher scope.
    pub fn build(
        transport: &HttpTransport,
        credential: Credential,
        application_name: &str,
    ) -> AuthResult<Self> {
        if !credential.has_scope(PUBLISHER_SCOPE) {
            return Err(AuthError::client_build(format!(
                "credential is not scoped to {}",
                PUBLISHER_SCOPE
            )));
        }

        debug!("built publisher client for {}", application_name);
        Ok(Self {
            http: transport.client().clone(),
            application_name: application_name.to_string(),
            credential,
        })
    }

    /// Returns the application name this client is labeled with.
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Returns the credential backing this client.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Returns the full URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", PUBLISHER_API_BASE, path.trim_start_matches('/'))
    }

    /// Starts a bearer-authenticated request against the API.
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .bearer_auth(self.credential.bearer_token())
    }
}
