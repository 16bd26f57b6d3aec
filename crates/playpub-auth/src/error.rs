//! Error types for authorization bootstrap operations.
//!
//! This module defines the error types that can occur while obtaining an
//! authenticated publishing-API client (transport setup, key fetching,
//! client-secrets validation, consent, token persistence).

use std::fmt;
use thiserror::Error;

/// The category of a bootstrap error.
///
/// This enum provides a high-level classification of errors for use in
/// caller-side handling and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    /// Bad input to the bootstrap entry point (e.g. empty application name).
    InvalidArgument,
    /// The trusted HTTPS transport could not be constructed.
    TransportInit,
    /// The private-key artifact could not be fetched or written locally.
    KeyFetch,
    /// The fetched key file is not a valid key container.
    KeyFormat,
    /// The signing engine could not be initialized or failed to sign.
    SecurityInit,
    /// The client-secrets resource is absent or malformed.
    ResourceMissing,
    /// Placeholder client secrets were shipped - the deployment is unusable.
    ConfigurationFatal,
    /// The consent step was declined, timed out, or is unavailable.
    UserCancelled,
    /// The token store could not be written.
    TokenPersist,
    /// The credential is structurally invalid for the client builder.
    ClientBuild,
    /// Network error talking to the token endpoint (exchange, refresh).
    Network,
}

impl AuthErrorCode {
    /// Returns true if this error is transient and the bootstrap may be
    /// retried by the caller. No layer inside the bootstrapper retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::KeyFetch | Self::Network)
    }

    /// Returns true if this error indicates an unusable deployment that
    /// must halt the process rather than be handled.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigurationFatal)
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::TransportInit => "transport_init",
            Self::KeyFetch => "key_fetch",
            Self::KeyFormat => "key_format",
            Self::SecurityInit => "security_init",
            Self::ResourceMissing => "resource_missing",
            Self::ConfigurationFatal => "configuration_fatal",
            Self::UserCancelled => "user_cancelled",
            Self::TokenPersist => "token_persist",
            Self::ClientBuild => "client_build",
            Self::Network => "network_error",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while bootstrapping an authenticated client.
#[derive(Debug, Error)]
pub struct AuthError {
    /// The error code categorizing this error.
    code: AuthErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AuthError {
    /// Creates a new bootstrap error with the given code and message.
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::InvalidArgument, message)
    }

    /// Creates a transport-initialization error.
    pub fn transport_init(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::TransportInit, message)
    }

    /// Creates a key-fetch error.
    pub fn key_fetch(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::KeyFetch, message)
    }

    /// Creates a key-format error.
    pub fn key_format(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::KeyFormat, message)
    }

    /// Creates a security-initialization error.
    pub fn security_init(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::SecurityInit, message)
    }

    /// Creates a resource-missing error.
    pub fn resource_missing(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::ResourceMissing, message)
    }

    /// Creates a fatal configuration error.
    pub fn configuration_fatal(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::ConfigurationFatal, message)
    }

    /// Creates a user-cancelled error.
    pub fn user_cancelled(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::UserCancelled, message)
    }

    /// Creates a token-persistence error.
    pub fn token_persist(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::TokenPersist, message)
    }

    /// Creates a client-build error.
    pub fn client_build(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::ClientBuild, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::Network, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> AuthErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Returns true if this error must halt the process.
    pub fn is_fatal(&self) -> bool {
        self.code.is_fatal()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for bootstrap operations.
pub type AuthResult<T> = Result<T, AuthError>;
