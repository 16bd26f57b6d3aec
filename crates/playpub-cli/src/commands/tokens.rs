//! The `status` and `clear` subcommands.

use playpub_auth::{AuthConfig, TokenStore};

use crate::error::CliResult;

/// Shows the persisted-token state for the default user.
pub fn status() -> CliResult<()> {
    let config = AuthConfig::new();
    let store = TokenStore::new(&config.store_dir);

    println!("Token store: {}", store.dir().display());

    match store.load(&config.user_id)? {
        Some(tokens) => {
            println!("Entry:       {}", store.entry_path(&config.user_id).display());
            println!("Scopes:      {}", tokens.scopes.join(" "));
            println!(
                "State:       {}",
                if tokens.is_expired() {
                    "expired"
                } else {
                    "valid"
                }
            );
            println!(
                "Refreshable: {}",
                if tokens.refresh_token.is_some() {
                    "yes"
                } else {
                    "no"
                }
            );
            println!("Obtained:    {}", tokens.last_refresh.to_rfc3339());
        }
        None => {
            println!("No persisted tokens. Run 'playpub auth --app <name>' to authorize.");
        }
    }

    Ok(())
}

/// Removes the persisted tokens for the default user.
pub fn clear() -> CliResult<()> {
    let config = AuthConfig::new();
    let store = TokenStore::new(&config.store_dir);
    store.clear(&config.user_id)?;
    println!("Cleared persisted tokens for {:?}.", config.user_id);
    Ok(())
}
