//! PostgreSQL store.
//!
//! Runtime-checked `sqlx` queries over the schema in `migrations/`. Rows are
//! read into `*Row` structs and converted into the domain models, so a stored
//! role type the engine does not know surfaces as a terminal store error
//! instead of a panic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hearth_core::{AccountId, RoleRecordId, RoleType};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::tables::{
    ACCOUNT_NOTIFICATIONS, ACCOUNT_PROFILES, ADMINISTRATOR_PROFILES, ROLE_RECORDS,
};
use crate::models::{
    AccountNotification, AccountProfile, AdministratorProfile, NewAdministratorProfile,
    NewNotification, NewRoleRecord, NotificationKind, RoleRecord,
};
use crate::pool::DbPool;
use crate::store::{
    AccountProfileStore, AdministratorProfileStore, NotificationStore, RoleRecordStore,
};

/// Map a `sqlx` failure onto the store error taxonomy.
///
/// Structured signals decide first: SQLSTATE 23505, pool exhaustion and I/O.
/// Message content is the fallback for everything else.
pub fn classify_sqlx_error(table: &'static str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::unique_violation(table, db.message().to_string())
        }
        sqlx::Error::Database(db) => StoreError::classify(
            table,
            db.code().map(|c| c.into_owned()),
            db.message().to_string(),
        ),
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::transient(table, err.to_string()),
        sqlx::Error::RowNotFound => StoreError::not_found(table, err.to_string()),
        _ => StoreError::classify(table, None, err.to_string()),
    }
}

const ROLE_COLUMNS: &str = "id, account_id, role_type, is_verified, is_active, \
     role_specific_data, verified_at, created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, account_id, company_name, company_tax_id, contact_email, \
     contact_phone, license_number, created_at, updated_at";

const ACCOUNT_COLUMNS: &str =
    "id, email, full_name, phone, address, city, postal_code, country, created_at";

#[derive(Debug, FromRow)]
struct RoleRecordRow {
    id: Uuid,
    account_id: Uuid,
    role_type: String,
    is_verified: bool,
    is_active: bool,
    role_specific_data: Json<JsonValue>,
    verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoleRecordRow> for RoleRecord {
    type Error = StoreError;

    fn try_from(row: RoleRecordRow) -> Result<Self, Self::Error> {
        let role_type = row
            .role_type
            .parse::<RoleType>()
            .map_err(|e| StoreError::other(ROLE_RECORDS, None, e.to_string()))?;
        Ok(RoleRecord {
            id: RoleRecordId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            role_type,
            is_verified: row.is_verified,
            is_active: row.is_active,
            role_specific_data: row.role_specific_data.0,
            verified_at: row.verified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AdministratorProfileRow {
    id: Uuid,
    account_id: Uuid,
    company_name: String,
    company_tax_id: String,
    contact_email: String,
    contact_phone: Option<String>,
    license_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdministratorProfileRow> for AdministratorProfile {
    fn from(row: AdministratorProfileRow) -> Self {
        Self {
            id: row.id.into(),
            account_id: row.account_id.into(),
            company_name: row.company_name,
            company_tax_id: row.company_tax_id,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            license_number: row.license_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AccountProfileRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AccountProfileRow> for AccountProfile {
    fn from(row: AccountProfileRow) -> Self {
        Self {
            id: row.id.into(),
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            country: row.country,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    account_id: Uuid,
    kind: String,
    title: String,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for AccountNotification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            account_id: row.account_id.into(),
            kind: row
                .kind
                .parse::<NotificationKind>()
                .map_err(|e: String| StoreError::other(ACCOUNT_NOTIFICATIONS, None, e))?,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

/// Store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub fn new(pool: &DbPool) -> Self {
        Self {
            pool: pool.inner().clone(),
        }
    }

    fn roles_from_rows(rows: Vec<RoleRecordRow>) -> StoreResult<Vec<RoleRecord>> {
        rows.into_iter().map(RoleRecord::try_from).collect()
    }
}

#[async_trait]
impl RoleRecordStore for PgStore {
    #[instrument(skip(self), fields(account_id = %account_id, role_type = %role_type))]
    async fn find_role(
        &self,
        account_id: AccountId,
        role_type: RoleType,
    ) -> StoreResult<Option<RoleRecord>> {
        let row: Option<RoleRecordRow> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM role_records WHERE account_id = $1 AND role_type = $2"
        ))
        .bind(account_id.as_uuid())
        .bind(role_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ROLE_RECORDS, e))?;

        row.map(RoleRecord::try_from).transpose()
    }

    async fn find_role_by_id(&self, id: RoleRecordId) -> StoreResult<Option<RoleRecord>> {
        let row: Option<RoleRecordRow> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM role_records WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ROLE_RECORDS, e))?;

        row.map(RoleRecord::try_from).transpose()
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn list_roles(&self, account_id: AccountId) -> StoreResult<Vec<RoleRecord>> {
        let rows: Vec<RoleRecordRow> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM role_records WHERE account_id = $1 \
             ORDER BY created_at, id"
        ))
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ROLE_RECORDS, e))?;

        Self::roles_from_rows(rows)
    }

    async fn list_roles_by_type(
        &self,
        role_type: RoleType,
        verified_only: bool,
    ) -> StoreResult<Vec<RoleRecord>> {
        let rows: Vec<RoleRecordRow> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM role_records \
             WHERE role_type = $1 AND ($2 = false OR is_verified) \
             ORDER BY created_at, id"
        ))
        .bind(role_type.as_str())
        .bind(verified_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ROLE_RECORDS, e))?;

        Self::roles_from_rows(rows)
    }

    #[instrument(
        skip(self, role),
        fields(account_id = %role.account_id, role_type = %role.role_type)
    )]
    async fn insert_role(&self, role: NewRoleRecord) -> StoreResult<RoleRecord> {
        let row: RoleRecordRow = sqlx::query_as(&format!(
            "INSERT INTO role_records \
                 (account_id, role_type, is_verified, is_active, role_specific_data, verified_at) \
             VALUES ($1, $2, $3, $4, $5, CASE WHEN $3 THEN NOW() END) \
             RETURNING {ROLE_COLUMNS}"
        ))
        .bind(role.account_id.as_uuid())
        .bind(role.role_type.as_str())
        .bind(role.is_verified)
        .bind(role.is_active)
        .bind(Json(&role.role_specific_data))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ROLE_RECORDS, e))?;

        RoleRecord::try_from(row)
    }

    async fn set_role_active(&self, id: RoleRecordId, active: bool) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE role_records SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ROLE_RECORDS, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(
                ROLE_RECORDS,
                format!("role record {id}"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AdministratorProfileStore for PgStore {
    async fn find_profile(
        &self,
        account_id: AccountId,
    ) -> StoreResult<Option<AdministratorProfile>> {
        let row: Option<AdministratorProfileRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM administrator_profiles WHERE account_id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ADMINISTRATOR_PROFILES, e))?;

        Ok(row.map(Into::into))
    }

    async fn list_profiles(&self) -> StoreResult<Vec<AdministratorProfile>> {
        let rows: Vec<AdministratorProfileRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM administrator_profiles ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ADMINISTRATOR_PROFILES, e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, profile), fields(account_id = %profile.account_id))]
    async fn insert_profile(
        &self,
        profile: NewAdministratorProfile,
    ) -> StoreResult<AdministratorProfile> {
        let row: AdministratorProfileRow = sqlx::query_as(&format!(
            "INSERT INTO administrator_profiles \
                 (account_id, company_name, company_tax_id, contact_email, contact_phone, license_number) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(profile.account_id.as_uuid())
        .bind(&profile.company_name)
        .bind(&profile.company_tax_id)
        .bind(&profile.contact_email)
        .bind(&profile.contact_phone)
        .bind(&profile.license_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ADMINISTRATOR_PROFILES, e))?;

        Ok(row.into())
    }
}

#[async_trait]
impl AccountProfileStore for PgStore {
    async fn find_account(&self, account_id: AccountId) -> StoreResult<Option<AccountProfile>> {
        let row: Option<AccountProfileRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account_profiles WHERE id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ACCOUNT_PROFILES, e))?;

        Ok(row.map(Into::into))
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AccountProfile>> {
        let row: Option<AccountProfileRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account_profiles WHERE lower(email) = lower($1) LIMIT 1"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ACCOUNT_PROFILES, e))?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<AccountNotification> {
        let row: NotificationRow = sqlx::query_as(
            "INSERT INTO account_notifications (account_id, kind, title, message) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, account_id, kind, title, message, is_read, created_at",
        )
        .bind(notification.account_id.as_uuid())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_sqlx_error(ACCOUNT_NOTIFICATIONS, e))?;

        AccountNotification::try_from(row)
    }
}
