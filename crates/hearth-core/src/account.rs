//! Account identity as handed over by the authentication collaborator.

use crate::error::{HearthError, Result};
use crate::ids::AccountId;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Email shape accepted for provisioning: no whitespace, one `@`, a dotted domain.
static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX is a valid regex pattern")
});

/// Shortest textual account id considered plausible (a simple UUID without hyphens).
const MIN_ACCOUNT_ID_LENGTH: usize = 32;

/// Longest textual account id considered plausible (a hyphenated UUID with braces).
const MAX_ACCOUNT_ID_LENGTH: usize = 38;

/// A newly authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
}

impl Account {
    /// Build an account without validating it.
    pub fn new(id: AccountId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }

    /// Build an account from the raw id string the auth layer exposes.
    pub fn parse(raw_id: &str, email: &str) -> Result<Self> {
        let raw_id = raw_id.trim();
        if !(MIN_ACCOUNT_ID_LENGTH..=MAX_ACCOUNT_ID_LENGTH).contains(&raw_id.len()) {
            return Err(HearthError::validation(
                "account_id",
                format!(
                    "expected between {MIN_ACCOUNT_ID_LENGTH} and {MAX_ACCOUNT_ID_LENGTH} characters, got {}",
                    raw_id.len()
                ),
            ));
        }
        let id = raw_id
            .parse::<AccountId>()
            .map_err(|e| HearthError::validation("account_id", e.message))?;

        let account = Self::new(id, email.trim());
        account.validate()?;
        Ok(account)
    }

    /// Check the id and email before any store call is made.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(HearthError::validation("account_id", "must not be nil"));
        }
        validate_email(&self.email)
    }

    /// Lowercased email, used for identity-pattern matching.
    #[must_use]
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Validate an email address against the provisioning email shape.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(HearthError::validation("email", "is required"));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(HearthError::validation(
            "email",
            "must be a valid email address",
        ));
    }
    Ok(())
}
