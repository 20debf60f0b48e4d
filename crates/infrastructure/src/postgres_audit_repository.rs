use async_trait::async_trait;
use sqlx::PgPool;

use tripcover_application::{AuditEvent, AuditRepository};
use tripcover_core::{AppError, AppResult};

/// Writes security audit events into `audit_log_entries`. Rows are never
/// updated or deleted by this adapter.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let AuditEvent {
            subject,
            action,
            resource_type,
            resource_id,
            detail,
        } = event;
        let action_name = action.as_str();

        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (subject, action, resource_type, resource_id, detail)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(subject.as_str())
        .bind(action_name)
        .bind(resource_type.as_str())
        .bind(resource_id.as_str())
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "could not record audit event '{action_name}' on {resource_type} '{resource_id}' by '{subject}': {error}"
            ))
        })?;

        Ok(())
    }
}
