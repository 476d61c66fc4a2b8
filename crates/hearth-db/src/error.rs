//! Error types for the hearth-db crate.
//!
//! Two families: [`DbError`] for pool and migration setup, and [`StoreError`]
//! for individual row operations. `StoreError` carries a structured
//! [`StoreErrorKind`] so callers never need to inspect message text to decide
//! whether an insert collided or may be retried.

use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Database setup errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Check if this error indicates a connection problem.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_))
    }

    /// Check if this error indicates a migration problem.
    #[must_use]
    pub fn is_migration_error(&self) -> bool {
        matches!(self, DbError::MigrationFailed(_))
    }
}

/// Classification of a failed row operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    /// A uniqueness constraint rejected the write; the row already exists.
    UniqueViolation,
    /// Network, timeout or pool exhaustion. The same call may succeed later.
    Transient,
    /// The addressed row does not exist.
    NotFound,
    /// Anything else. Retrying will not help.
    Other,
}

impl StoreErrorKind {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::UniqueViolation => "unique_violation",
            StoreErrorKind::Transient => "transient",
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::Other => "other",
        }
    }
}

impl Display for StoreErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message fragments that mark an otherwise unclassified failure as transient.
const TRANSIENT_MARKERS: [&str; 6] = [
    "timeout",
    "timed out",
    "connection",
    "network",
    "unavailable",
    "temporary",
];

/// PostgreSQL SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

/// SQLSTATEs outside class `08` that a later attempt may not hit:
/// cancellation, admin or crash shutdown, connection limits,
/// serialization failures and deadlocks.
const TRANSIENT_SQLSTATES: [&str; 7] = [
    "57014", "57P01", "57P02", "57P03", "53300", "40001", "40P01",
];

/// Class `08` is connection exceptions.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || TRANSIENT_SQLSTATES.contains(&code)
}

/// A failed operation against one logical table.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} error on {table}: {message}")]
pub struct StoreError {
    /// Classification used by retry and idempotence decisions.
    pub kind: StoreErrorKind,
    /// Logical table the operation addressed.
    pub table: &'static str,
    /// Backend error code, when the backend exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Backend error message.
    pub message: String,
}

impl StoreError {
    fn new(
        kind: StoreErrorKind,
        table: &'static str,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            table,
            code,
            message: message.into(),
        }
    }

    /// Create a uniqueness violation error.
    pub fn unique_violation(table: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            StoreErrorKind::UniqueViolation,
            table,
            Some(UNIQUE_VIOLATION_CODE.to_string()),
            message,
        )
    }

    /// Create a transient error.
    pub fn transient(table: &'static str, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Transient, table, None, message)
    }

    /// Create a not found error.
    pub fn not_found(table: &'static str, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, table, None, message)
    }

    /// Create a terminal error with an optional backend code.
    pub fn other(table: &'static str, code: Option<String>, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, table, code, message)
    }

    /// Classify an opaque backend failure.
    ///
    /// A backend code decides the kind on its own: `23505` is a uniqueness
    /// violation, connection-class and cancellation codes are transient,
    /// and every other code is terminal. Message content is only consulted
    /// when no code is present.
    pub fn classify(table: &'static str, code: Option<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        if let Some(sqlstate) = code.as_deref() {
            let kind = if sqlstate == UNIQUE_VIOLATION_CODE {
                StoreErrorKind::UniqueViolation
            } else if is_transient_sqlstate(sqlstate) {
                StoreErrorKind::Transient
            } else {
                StoreErrorKind::Other
            };
            return Self::new(kind, table, code, message);
        }

        let lowered = message.to_lowercase();
        if lowered.contains("duplicate key") {
            return Self::new(StoreErrorKind::UniqueViolation, table, code, message);
        }
        if TRANSIENT_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Self::new(StoreErrorKind::Transient, table, code, message);
        }
        Self::new(StoreErrorKind::Other, table, code, message)
    }

    /// Check if the write collided with an existing row.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        self.kind == StoreErrorKind::UniqueViolation
    }

    /// Check if this error is retryable.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind == StoreErrorKind::Transient
    }

    /// Check if this error indicates a missing row.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }

    /// `code: message` form used in result error lists.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.code {
            Some(code) => format!("{code}: {}", self.message),
            None => format!("{}: {}", self.kind, self.message),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
