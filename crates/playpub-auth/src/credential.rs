//! Credential material produced by the two authorization strategies.

use chrono::{DateTime, Utc};

use crate::tokens::TokenInfo;

/// A signed-JWT credential for a service account.
///
/// Carries the signed assertion itself; exchanging it for a short-lived
/// bearer token happens on the first API call, not here.
#[derive(Debug, Clone)]
pub struct ServiceAccountCredential {
    /// The service-account email acting as the signer identity.
    pub issuer: String,
    /// The signed JWT assertion.
    pub assertion: String,
    /// The scopes the assertion was signed for.
    pub scopes: Vec<String>,
    /// When the assertion expires.
    pub expires_at: DateTime<Utc>,
}

/// Opaque authorization material sufficient to authenticate API calls.
///
/// Produced by exactly one strategy per bootstrap call and consumed
/// immediately by the client builder.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Non-interactive signed-JWT credential.
    ServiceAccount(ServiceAccountCredential),
    /// Interactive user token set.
    User(TokenInfo),
}

impl Credential {
    /// Returns the scopes this credential covers.
    pub fn scopes(&self) -> &[String] {
        match self {
            Self::ServiceAccount(sa) => &sa.scopes,
            Self::User(tokens) => &tokens.scopes,
        }
    }

    /// Returns true if the credential covers the given scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().iter().any(|s| s == scope)
    }

    /// Returns the bearer material for the Authorization header.
    pub fn bearer_token(&self) -> &str {
        match self {
            Self::ServiceAccount(sa) => &sa.assertion,
            Self::User(tokens) => &tokens.access_token,
        }
    }

    /// Returns true if the credential is expired.
    pub fn is_expired(&self) -> bool {
        match self {
            Self::ServiceAccount(sa) => Utc::now() >= sa.expires_at,
            Self::User(tokens) => tokens.is_expired(),
        }
    }
}
