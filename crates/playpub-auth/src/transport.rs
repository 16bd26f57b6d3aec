//! Shared HTTPS transport.

use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// A trusted HTTPS transport shared by every network call in a bootstrap.
///
/// Constructed at most once per [`Bootstrapper`](crate::Bootstrapper); see
/// the initialization guard there. All requests inherit the configured
/// timeout and user agent.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Constructs the transport from the configuration.
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AuthError::transport_init("failed to construct HTTPS transport").with_source(e)
            })?;

        debug!("constructed HTTPS transport");
        Ok(Self { client })
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
