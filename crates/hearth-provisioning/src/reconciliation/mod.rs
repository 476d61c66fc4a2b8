//! Administrator reconciliation.
//!
//! An account holding the property administrator role is represented twice:
//! a generic role record and a specialized administrator profile. The two
//! tables are written independently, so this module detects and repairs
//! divergence in both directions.

mod administrator;
pub mod placeholder;
mod types;

pub use administrator::AdministratorReconciler;
pub use placeholder::{
    is_temporary_tax_id, temporary_tax_id, PLACEHOLDER_COMPANY_NAME, PLACEHOLDER_CONTACT_EMAIL,
};
pub use types::{
    SyncAllReport, SyncOneOutcome, SynchronizedAdministrator, SynchronizedListing, UpdatedStore,
};
