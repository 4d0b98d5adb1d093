//! Core error types

use thiserror::Error;

use crate::password::PasswordRule;

pub type CoreResult<T> = Result<T, CoreError>;

/// Outcomes of the access-control core.
///
/// Everything except `Database` and `Hash` is an expected, recoverable
/// result the caller is meant to branch on. A store or hasher failure is
/// fatal and propagates as-is.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("A user with this email already exists.")]
    EmailTaken,

    #[error("{0}")]
    WeakPassword(PasswordRule),

    /// Covers both unknown email and wrong password; the two are
    /// indistinguishable from the outside.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Invalid token.")]
    InvalidToken,

    /// Covers both missing and foreign-owned resources; the two are
    /// indistinguishable from the outside.
    #[error("Not found.")]
    NotFound,

    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Password hashing error: {0}")]
    Hash(String),
}
