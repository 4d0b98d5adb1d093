//! Password policy and hashing
//!
//! The policy is ASCII-oriented: the uppercase/lowercase/digit rules count
//! only ASCII characters, so letters outside ASCII never satisfy a case
//! rule. Length is counted in chars, not bytes.

use std::fmt;

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{CoreError, CoreResult};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// A policy rule a candidate password failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
}

impl PasswordRule {
    /// Fixed, stable message for this rule.
    pub fn message(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "Password must be at least 8 characters long",
            PasswordRule::Uppercase => "Password must contain at least 1 uppercase letter",
            PasswordRule::Lowercase => "Password must contain at least 1 lowercase letter",
            PasswordRule::Digit => "Password must contain at least 1 digit",
        }
    }
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Check a candidate password against every rule.
///
/// All violations are collected in declaration order; registration surfaces
/// the first. Pure function, no side effects. An empty string fails all four.
pub fn validate_password(candidate: &str) -> Vec<PasswordRule> {
    let mut violations = Vec::new();
    if candidate.chars().count() < MIN_PASSWORD_CHARS {
        violations.push(PasswordRule::MinLength);
    }
    if !candidate.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push(PasswordRule::Uppercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push(PasswordRule::Lowercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordRule::Digit);
    }
    violations
}

/// Argon2id work factor. Deliberately a constructor argument rather than a
/// library default so deployments and tests pin it explicitly.
#[derive(Clone, Copy, Debug)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Salted one-way password hasher (argon2id, PHC string output).
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: HashingParams,
}

impl PasswordHasher {
    /// Rejects work factors argon2 itself would refuse.
    pub fn new(params: HashingParams) -> CoreResult<Self> {
        Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| CoreError::Hash(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> CoreResult<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| CoreError::Hash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash with a fresh random salt. Returns a PHC-format string.
    pub fn hash(&self, password: &str) -> CoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CoreError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a candidate against a stored PHC string.
    ///
    /// The work factor comes from the stored string itself. A malformed
    /// stored hash verifies as false rather than erroring.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
