//! Record stores for hearth.
//!
//! The provisioning engine talks to four logical tables through the traits
//! in [`store`]. Two implementations ship here:
//!
//! - [`MemoryStore`] - in-process, used by tests and embedded callers
//! - [`PgStore`] - PostgreSQL through `sqlx`, schema in `migrations/`
//!
//! Both enforce the uniqueness constraints the engine relies on and report
//! failures as [`StoreError`] with a structured [`StoreErrorKind`].

pub mod config;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod postgres;
pub mod store;

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, StoreError, StoreErrorKind, StoreResult};
pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use models::{
    AccountNotification, AccountProfile, AdministratorProfile, NewAdministratorProfile,
    NewNotification, NewRoleRecord, NotificationKind, RoleRecord,
};
pub use pool::DbPool;
pub use postgres::{classify_sqlx_error, PgStore};
pub use store::{
    AccountProfileStore, AdministratorProfileStore, NotificationStore, RoleRecordStore, Stores,
};
