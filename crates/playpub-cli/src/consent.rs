//! Browser-and-stdin consent collaborator.

use std::io::{BufRead, Write};

use tracing::warn;

use playpub_auth::{AuthError, AuthResult, ConsentPrompt, ConsentResponse};

/// Out-of-band redirect: the authorization server displays the code for the
/// user to copy instead of redirecting to a local receiver.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Consent collaborator for terminal sessions.
///
/// Opens the user's browser on the authorization URL (falling back to
/// printing it) and reads the pasted authorization code from stdin. Since
/// nothing echoes the `state` parameter back in this mechanism, the
/// response carries none.
pub struct BrowserConsent;

impl BrowserConsent {
    /// Creates the collaborator.
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrowserConsent {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentPrompt for BrowserConsent {
    fn redirect_uri(&self) -> String {
        OOB_REDIRECT_URI.to_string()
    }

    fn obtain_code(&self, auth_url: &str) -> AuthResult<ConsentResponse> {
        if let Err(e) = open::that(auth_url) {
            warn!("failed to open browser: {}", e);
        }
        eprintln!("\nOpen this URL in your browser if it did not open automatically:\n");
        eprintln!("  {}\n", auth_url);
        eprint!("Paste the authorization code here: ");
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| AuthError::user_cancelled("failed to read the code").with_source(e))?;

        let code = line.trim();
        if code.is_empty() {
            return Err(AuthError::user_cancelled("no authorization code entered"));
        }

        Ok(ConsentResponse {
            code: code.to_string(),
            state: None,
        })
    }
}
