//! Account-Scoped Records
//!
//! Both record stores the reconciler compares are keyed by account, so the
//! matching logic is written once against this trait.
//!
//! # Example
//!
//! ```
//! use hearth_core::{AccountId, AccountScoped};
//! use std::collections::HashSet;
//!
//! struct Grant {
//!     account_id: AccountId,
//! }
//!
//! impl AccountScoped for Grant {
//!     fn account_id(&self) -> AccountId {
//!         self.account_id
//!     }
//! }
//!
//! let grants = vec![Grant { account_id: AccountId::new() }];
//! let accounts: HashSet<AccountId> = hearth_core::account_ids(&grants);
//! assert_eq!(accounts.len(), 1);
//! ```

use crate::ids::AccountId;
use std::collections::HashSet;

/// A record that belongs to exactly one account.
pub trait AccountScoped {
    /// Returns the owning account.
    fn account_id(&self) -> AccountId;
}

/// Collect the distinct owning accounts of a slice of records.
pub fn account_ids<T: AccountScoped>(records: &[T]) -> HashSet<AccountId> {
    records.iter().map(AccountScoped::account_id).collect()
}
