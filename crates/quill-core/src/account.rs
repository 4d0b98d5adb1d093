//! User identity, tokens, and the account store contract

use std::fmt;

use async_trait::async_trait;
use validator::ValidateEmail;

use crate::error::{CoreError, CoreResult};

pub const MAX_EMAIL_CHARS: usize = 254;

/// Store-assigned user identifier.
///
/// Every authorization-sensitive call takes one of these explicitly; there
/// is no ambient "current user".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, normalized email address.
///
/// Parsing lowercases the value, so uniqueness comparisons in the store are
/// case-insensitive by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation {
                field: "email",
                reason: "may not be blank".into(),
            });
        }
        if trimmed.chars().count() > MAX_EMAIL_CHARS {
            return Err(CoreError::Validation {
                field: "email",
                reason: format!("must be at most {MAX_EMAIL_CHARS} characters"),
            });
        }
        if !trimmed.validate_email() {
            return Err(CoreError::Validation {
                field: "email",
                reason: "must be a valid email address".into(),
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: i64,
}

/// Registration payload. The email arrives pre-parsed so an unvalidated
/// address cannot reach the store.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Display-name changes. Email is deliberately absent: it is immutable
/// after registration.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// The single durable credential bound to a user.
#[derive(Clone, Debug)]
pub struct AuthToken {
    pub value: String,
    pub created_at: i64,
}

/// Credential store and token issuer.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create a user and issue their token, atomically.
    ///
    /// Returns `EmailTaken` if the normalized email exists, or
    /// `WeakPassword` with the first violated policy rule.
    async fn register(&self, new: NewAccount) -> CoreResult<(Account, AuthToken)>;

    /// Authenticate and return the user's token, minting one on first login.
    ///
    /// Unknown email and wrong password produce the same
    /// `InvalidCredentials` outcome. Repeated logins return the identical
    /// token value; tokens are never rotated.
    async fn login(&self, email: &str, password: &str) -> CoreResult<(Account, AuthToken)>;

    /// Map a presented token value to its user, or `InvalidToken`.
    async fn resolve_token(&self, token: &str) -> CoreResult<UserId>;

    /// Fetch a user's own profile.
    async fn account(&self, user: UserId) -> CoreResult<Account>;

    /// Update display names. Fields left as `None` are untouched.
    async fn update_profile(&self, user: UserId, update: ProfileUpdate) -> CoreResult<Account>;

    /// Re-hash with a new password after verifying the old one.
    ///
    /// The token survives a password change.
    async fn change_password(&self, user: UserId, old: &str, new: &str) -> CoreResult<()>;

    /// Delete the user after verifying their password.
    ///
    /// Cascades to the token and every owned note, todo list, and item.
    async fn delete_account(&self, user: UserId, password: &str) -> CoreResult<()>;
}
