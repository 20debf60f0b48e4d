use sqlx::{FromRow, PgPool};

use tripcover_application::{PermissionRecord, RoleRecord, UpsertOutcome, UserRecord};
use tripcover_core::{AppError, AppResult, UserId};
use tripcover_domain::PermissionKey;

mod authorization;
mod catalog;
mod roles;
mod users;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for the permission catalog, roles, bindings
/// and per-user assignments.
///
/// All natural-key writes are `INSERT .. ON CONFLICT .. DO UPDATE` upserts, and
/// `xmax = 0` on the returned row tells an insert apart from an update.
#[derive(Clone)]
pub struct PostgresAccessControlRepository {
    pool: PgPool,
}

impl PostgresAccessControlRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    permission_id: uuid::Uuid,
    resource: String,
    action: String,
    description: String,
}

impl PermissionRow {
    fn into_record(self) -> AppResult<PermissionRecord> {
        Ok(PermissionRecord {
            permission_id: self.permission_id.to_string(),
            key: stored_key(self.resource.as_str(), self.action.as_str())?,
            description: self.description,
        })
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: uuid::Uuid,
    name: String,
    description: String,
    is_system: bool,
}

impl From<RoleRow> for RoleRecord {
    fn from(row: RoleRow) -> Self {
        Self {
            role_id: row.role_id.to_string(),
            name: row.name,
            description: row.description,
            is_system: row.is_system,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    user_id: uuid::Uuid,
    email: String,
    display_name: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            email: row.email,
            display_name: row.display_name,
        }
    }
}

fn stored_key(resource: &str, action: &str) -> AppResult<PermissionKey> {
    PermissionKey::parse(resource, action).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored permission '{resource}:{action}': {error}"
        ))
    })
}

fn parse_id(value: &str, label: &str) -> AppResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|_| AppError::NotFound(format!("{label} '{value}' was not found")))
}

fn upsert_outcome(inserted: bool) -> UpsertOutcome {
    if inserted {
        UpsertOutcome::Created
    } else {
        UpsertOutcome::Updated
    }
}

fn map_write_error(error: sqlx::Error, context: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => return AppError::Conflict(format!("{context}: already exists")),
            Some("23503") => {
                return AppError::NotFound(format!("{context}: referenced row was not found"));
            }
            _ => {}
        }
    }

    AppError::Internal(format!("{context}: {error}"))
}
