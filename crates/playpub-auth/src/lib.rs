//! Authorization bootstrapper for the Google Play publishing API.
//!
//! This crate produces a ready-to-use authenticated [`PublisherClient`] by
//! selecting and executing exactly one of two mutually exclusive
//! credential-acquisition strategies:
//!
//! - **Service account** - non-interactive: fetches a private-key artifact
//!   from its fixed remote location and signs a JWT assertion scoped to the
//!   publishing API.
//! - **Installed application** - interactive: an OAuth 2.0
//!   authorization-code exchange (PKCE) whose tokens are persisted under the
//!   user's home directory and reused across runs.
//!
//! # Architecture
//!
//! ```text
//! bootstrap(app_name, service_account_email?)
//!        │
//!        ▼
//! ┌──────────────────┐     absent/empty email      ┌─────────────────────┐
//! │ Strategy::select ├────────────────────────────▶│ installed app flow  │
//! └────────┬─────────┘                             │ secrets → store →   │
//!          │ email present                         │ consent → exchange  │
//!          ▼                                       └──────────┬──────────┘
//! ┌──────────────────┐                                        │
//! │ service account  │                                        │
//! │ key fetch → JWT  │                                        │
//! └────────┬─────────┘                                        │
//!          │                 Credential                       │
//!          └─────────────────────┬────────────────────────────┘
//!                                ▼
//!                     PublisherClient::build
//! ```
//!
//! # Example
//!
//! ```ignore
//! use playpub_auth::{AuthConfig, Bootstrapper};
//!
//! let bootstrapper = Bootstrapper::new(AuthConfig::new())?;
//! let client = bootstrapper
//!     .init("com.example.app", Some("svc@acct.iam.gserviceaccount.com"))
//!     .await?;
//! assert_eq!(client.application_name(), "com.example.app");
//! ```

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod oauth;
pub mod secrets;
pub mod service_account;
pub mod tokens;
pub mod transport;

// Re-export main types at crate root
pub use bootstrap::{Bootstrapper, Strategy};
pub use client::PublisherClient;
pub use config::{AuthConfig, DEFAULT_USER_ID, GOOGLE_TOKEN_URL, PUBLISHER_SCOPE};
pub use credential::{Credential, ServiceAccountCredential};
pub use error::{AuthError, AuthErrorCode, AuthResult};
pub use oauth::{ConsentPrompt, ConsentResponse, InstalledFlow, PkceFlow};
pub use secrets::ClientSecrets;
pub use service_account::ServiceAccountFlow;
pub use tokens::{TokenInfo, TokenStore};
pub use transport::HttpTransport;
