//! Identity-based role expansion.
//!
//! A closed rule table maps predicates over the account email to extra
//! roles granted at provisioning time. The table is configuration: it is
//! empty unless loaded from JSON, for example
//!
//! ```json
//! [
//!   {
//!     "name": "fincas-staff",
//!     "matcher": { "type": "email_ends_with", "value": "@fincas.example" },
//!     "grants": [
//!       { "role_type": "property_administrator",
//!         "role_specific_data": { "company_name": "Fincas Example" } }
//!     ]
//!   }
//! ]
//! ```

use hearth_core::{Account, RoleType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A requested role beyond the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalRole {
    pub role_type: RoleType,
    #[serde(default)]
    pub role_specific_data: JsonValue,
}

impl AdditionalRole {
    /// Role with no explicit data; the seed projection fills it in.
    #[must_use]
    pub fn new(role_type: RoleType) -> Self {
        Self {
            role_type,
            role_specific_data: JsonValue::Null,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.role_specific_data = data;
        self
    }
}

/// Predicate over the account email. Comparisons ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum IdentityMatcher {
    EmailContains(String),
    EmailEndsWith(String),
    EmailEquals(String),
}

impl IdentityMatcher {
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        let email = account.normalized_email();
        match self {
            IdentityMatcher::EmailContains(needle) => email.contains(&needle.to_lowercase()),
            IdentityMatcher::EmailEndsWith(suffix) => email.ends_with(&suffix.to_lowercase()),
            IdentityMatcher::EmailEquals(other) => email == other.trim().to_lowercase(),
        }
    }
}

/// One role granted by a matching rule, with pre-populated data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionGrant {
    pub role_type: RoleType,
    #[serde(default)]
    pub role_specific_data: JsonValue,
}

/// `matcher → grants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionRule {
    pub name: String,
    pub matcher: IdentityMatcher,
    pub grants: Vec<ExpansionGrant>,
}

/// Ordered set of expansion rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionRuleTable {
    rules: Vec<ExpansionRule>,
}

impl ExpansionRuleTable {
    #[must_use]
    pub fn new(rules: Vec<ExpansionRule>) -> Self {
        Self { rules }
    }

    /// Parse a table from its JSON array form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn rules(&self) -> &[ExpansionRule] {
        &self.rules
    }

    /// Roles added for `account`, excluding the primary role, the explicit
    /// requests, and grants already produced by an earlier rule.
    #[must_use]
    pub fn expand(
        &self,
        account: &Account,
        primary: RoleType,
        explicit: &[AdditionalRole],
    ) -> Vec<AdditionalRole> {
        let mut seen: Vec<RoleType> = std::iter::once(primary)
            .chain(explicit.iter().map(|r| r.role_type))
            .collect();
        let mut expanded = Vec::new();

        for rule in self.rules.iter().filter(|r| r.matcher.matches(account)) {
            for grant in &rule.grants {
                if seen.contains(&grant.role_type) {
                    continue;
                }
                tracing::debug!(
                    account_id = %account.id,
                    rule = %rule.name,
                    role_type = %grant.role_type,
                    "Expansion rule granted role"
                );
                seen.push(grant.role_type);
                expanded.push(AdditionalRole {
                    role_type: grant.role_type,
                    role_specific_data: grant.role_specific_data.clone(),
                });
            }
        }

        expanded
    }
}
