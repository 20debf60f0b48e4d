use async_trait::async_trait;

use tripcover_application::{
    PermissionCatalogRepository, PermissionRecord, UpsertPermissionInput, Upserted,
};

use super::*;

#[derive(Debug, FromRow)]
struct UpsertedPermissionRow {
    #[sqlx(flatten)]
    permission: PermissionRow,
    inserted: bool,
}

#[async_trait]
impl PermissionCatalogRepository for PostgresAccessControlRepository {
    async fn upsert_permission(
        &self,
        input: UpsertPermissionInput,
    ) -> AppResult<Upserted<PermissionRecord>> {
        let row = sqlx::query_as::<_, UpsertedPermissionRow>(
            r#"
            INSERT INTO rbac_permissions (resource, action, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (resource, action) DO UPDATE
            SET description = EXCLUDED.description,
                updated_at = now()
            RETURNING
                id AS permission_id,
                resource,
                action,
                description,
                (xmax = 0) AS inserted
            "#,
        )
        .bind(input.key.resource().as_str())
        .bind(input.key.action().as_str())
        .bind(input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "failed to upsert permission"))?;

        Ok(Upserted {
            outcome: upsert_outcome(row.inserted),
            record: row.permission.into_record()?,
        })
    }

    async fn find_permission(&self, key: &PermissionKey) -> AppResult<Option<PermissionRecord>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id AS permission_id, resource, action, description
            FROM rbac_permissions
            WHERE resource = $1 AND action = $2
            "#,
        )
        .bind(key.resource().as_str())
        .bind(key.action().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(PermissionRow::into_record)
        .transpose()
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id AS permission_id, resource, action, description
            FROM rbac_permissions
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        let mut permissions = rows
            .into_iter()
            .map(PermissionRow::into_record)
            .collect::<AppResult<Vec<_>>>()?;
        permissions.sort_by(|left, right| left.key.cmp(&right.key));
        Ok(permissions)
    }

    async fn count_permissions(&self) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rbac_permissions")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count permissions: {error}")))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn update_permission_description(
        &self,
        key: &PermissionKey,
        description: &str,
    ) -> AppResult<PermissionRecord> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE rbac_permissions
            SET description = $3,
                updated_at = now()
            WHERE resource = $1 AND action = $2
            RETURNING id AS permission_id, resource, action, description
            "#,
        )
        .bind(key.resource().as_str())
        .bind(key.action().as_str())
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update permission description: {error}"))
        })?
        .ok_or_else(|| AppError::NotFound(format!("permission '{key}' was not found")))?
        .into_record()
    }
}
