//! CLI error type.

use thiserror::Error;

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// A bootstrap operation failed.
    #[error(transparent)]
    Auth(#[from] playpub_auth::AuthError),

    /// Local I/O failed (reading input, inspecting the store).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
