//! CLI subcommand implementations.

pub mod auth;
pub mod tokens;
