//! Persisted user tokens for the installed-application flow.
//!
//! Tokens live in a store directory with one JSON entry per local user
//! identifier, so a successful interactive authorization is reused across
//! process runs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult};

/// An OAuth token set obtained from the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    pub scopes: Vec<String>,

    /// When the tokens were last obtained or refreshed.
    pub last_refresh: DateTime<Utc>,
}

impl TokenInfo {
    /// Creates a new token set from token-endpoint response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        let expires_at = expires_in_secs.map(|secs| {
            // Refresh a minute before the actual expiry
            Utc::now() + Duration::seconds(secs) - Duration::seconds(60)
        });

        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
            scopes,
            last_refresh: Utc::now(),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            // Tokens without an expiry are assumed valid
            None => false,
        }
    }

    /// Returns true if the token set covers all required scopes.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Updates the access token after a refresh.
    pub fn update_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs
            .map(|secs| Utc::now() + Duration::seconds(secs) - Duration::seconds(60));
        self.last_refresh = Utc::now();
    }

    /// Returns the time until expiry, if known.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|expires_at| expires_at - Utc::now())
    }
}

/// File-backed token store, one entry per local user identifier.
#[derive(Debug)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Creates a token store rooted at the given directory.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the entry path for a user identifier.
    pub fn entry_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }

    /// Loads the token entry for a user, if one exists.
    ///
    /// A corrupt entry is treated as absent (forcing re-authorization)
    /// rather than a hard failure.
    pub fn load(&self, user_id: &str) -> AuthResult<Option<TokenInfo>> {
        let path = self.entry_path(user_id);
        if !path.exists() {
            debug!("no token entry at {:?}", path);
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            AuthError::token_persist(format!("failed to read token entry {:?}", path))
                .with_source(e)
        })?;

        match serde_json::from_str::<TokenInfo>(&content) {
            Ok(tokens) => {
                info!("loaded tokens for {:?} from {:?}", user_id, path);
                Ok(Some(tokens))
            }
            Err(e) => {
                warn!("discarding corrupt token entry {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Saves the token entry for a user.
    ///
    /// Writes to a temporary file first and renames for atomicity; on Unix
    /// the entry is restricted to the owning user.
    pub fn save(&self, user_id: &str, tokens: &TokenInfo) -> AuthResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AuthError::token_persist(format!("failed to create store directory {:?}", self.dir))
                .with_source(e)
        })?;

        let path = self.entry_path(user_id);
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| AuthError::token_persist("failed to serialize tokens").with_source(e))?;

        fs::write(&temp_path, &content).map_err(|e| {
            AuthError::token_persist(format!("failed to write token entry {:?}", temp_path))
                .with_source(e)
        })?;

        fs::rename(&temp_path, &path).map_err(|e| {
            AuthError::token_persist(format!("failed to rename token entry {:?}", path))
                .with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&path, perms);
        }

        debug!("saved tokens for {:?} to {:?}", user_id, path);
        Ok(())
    }

    /// Removes the token entry for a user, if present.
    pub fn clear(&self, user_id: &str) -> AuthResult<()> {
        let path = self.entry_path(user_id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                AuthError::token_persist(format!("failed to remove token entry {:?}", path))
                    .with_source(e)
            })?;
            info!("cleared tokens for {:?}", user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, TokenStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn token_info_creation() {
        let token = TokenInfo::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec!["scope1".to_string()],
        );

        assert_eq!(token.access_token, "access-token");
        assert_eq!(token.refresh_token, Some("refresh-token".to_string()));
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());
    }

    #[test]
    fn token_info_expired() {
        let mut token = TokenInfo::new("access", None, Some(3600), vec![]);
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(token.is_expired());
    }

    #[test]
    fn token_info_no_expiry_is_valid() {
        let token = TokenInfo::new("access", None, None, vec![]);
        assert!(!token.is_expired());
        assert!(token.time_until_expiry().is_none());
    }

    #[test]
    fn token_info_scope_check() {
        let token = TokenInfo::new(
            "access",
            None,
            None,
            vec!["scope1".to_string(), "scope2".to_string()],
        );

        assert!(token.has_scopes(&["scope1".to_string()]));
        assert!(token.has_scopes(&["scope1".to_string(), "scope2".to_string()]));
        assert!(!token.has_scopes(&["scope3".to_string()]));
    }

    #[test]
    fn token_info_update_access_token() {
        let mut token = TokenInfo::new("old", Some("refresh".to_string()), Some(3600), vec![]);
        token.update_access_token("new", Some(7200));
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token, Some("refresh".to_string()));
        assert!(!token.is_expired());
    }

    #[test]
    fn store_save_and_load() {
        let (_dir, store) = temp_store();

        let token = TokenInfo::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec!["scope1".to_string()],
        );

        store.save("user", &token).unwrap();
        assert!(store.entry_path("user").exists());

        let loaded = store.load("user").unwrap().unwrap();
        assert_eq!(loaded.access_token, "access-token");
        assert_eq!(loaded.scopes, vec!["scope1".to_string()]);
    }

    #[test]
    fn store_entries_are_per_user() {
        let (_dir, store) = temp_store();

        let token = TokenInfo::new("a", None, None, vec![]);
        store.save("alice", &token).unwrap();

        assert!(store.load("alice").unwrap().is_some());
        assert!(store.load("bob").unwrap().is_none());
        assert_ne!(store.entry_path("alice"), store.entry_path("bob"));
    }

    #[test]
    fn store_load_missing_entry() {
        let (_dir, store) = temp_store();
        assert!(store.load("user").unwrap().is_none());
    }

    #[test]
    fn store_corrupt_entry_is_discarded() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.entry_path("user"), "not json").unwrap();

        assert!(store.load("user").unwrap().is_none());
    }

    #[test]
    fn store_clear() {
        let (_dir, store) = temp_store();

        let token = TokenInfo::new("access", None, None, vec![]);
        store.save("user", &token).unwrap();
        assert!(store.entry_path("user").exists());

        store.clear("user").unwrap();
        assert!(!store.entry_path("user").exists());
        assert!(store.load("user").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn store_entry_permissions_are_restrictive() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        let token = TokenInfo::new("access", None, None, vec![]);
        store.save("user", &token).unwrap();

        let mode = fs::metadata(store.entry_path("user"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
