use async_trait::async_trait;

use tripcover_application::{AuthorizationRepository, PermissionGrant};

use super::*;

#[derive(Debug, FromRow)]
struct GrantRow {
    resource: String,
    action: String,
    allow: bool,
    via_role: Option<String>,
}

#[async_trait]
impl AuthorizationRepository for PostgresAccessControlRepository {
    async fn permission_exists(&self, key: &PermissionKey) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM rbac_permissions
                WHERE resource = $1 AND action = $2
            )
            "#,
        )
        .bind(key.resource().as_str())
        .bind(key.action().as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve permission: {error}")))
    }

    async fn find_user_permission_override(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Option<bool>> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT overrides.allow
            FROM rbac_user_permissions AS overrides
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.user_id = $1
                AND permissions.resource = $2
                AND permissions.action = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(key.resource().as_str())
        .bind(key.action().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve user override: {error}")))
    }

    async fn list_role_decisions_for_user(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Vec<bool>> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT bindings.allow
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_role_permissions AS bindings
                ON bindings.role_id = user_roles.role_id
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = bindings.permission_id
            WHERE user_roles.user_id = $1
                AND permissions.resource = $2
                AND permissions.action = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(key.resource().as_str())
        .bind(key.action().as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role bindings: {error}")))
    }

    async fn list_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                permissions.resource,
                permissions.action,
                overrides.allow,
                NULL::TEXT AS via_role
            FROM rbac_user_permissions AS overrides
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.user_id = $1
            UNION ALL
            SELECT
                permissions.resource,
                permissions.action,
                bindings.allow,
                roles.name AS via_role
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            INNER JOIN rbac_role_permissions AS bindings
                ON bindings.role_id = user_roles.role_id
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = bindings.permission_id
            WHERE user_roles.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user grants: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(PermissionGrant {
                    key: stored_key(row.resource.as_str(), row.action.as_str())?,
                    allow: row.allow,
                    via_role: row.via_role,
                })
            })
            .collect()
    }
}
