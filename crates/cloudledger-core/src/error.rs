//! Error types for the core library.

use thiserror::Error;

use crate::account::AccountIdentity;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Account configuration failed validation (unsupported region,
    /// malformed credentials). Surfaced to the caller, never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation referenced an identity that is not registered.
    #[error("account not found: {0}")]
    AccountNotFound(AccountIdentity),

    /// A service config factory failed; the account is not registered.
    #[error("service construction failed: {0}")]
    Construction(String),

    /// A periodic tick's provider call failed. Logged and non-fatal,
    /// the schedule keeps running.
    #[error("inventory sync failed: {0}")]
    Sync(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
