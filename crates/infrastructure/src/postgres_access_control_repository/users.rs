use async_trait::async_trait;

use tripcover_application::{
    Upserted, UserAccessRepository, UserPermissionOverride, UserRoleAssignment,
};

use super::*;

#[derive(Debug, FromRow)]
struct UpsertedUserRow {
    #[sqlx(flatten)]
    user: UserRow,
    inserted: bool,
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    role_id: uuid::Uuid,
    role_name: String,
    assigned_at: String,
}

#[derive(Debug, FromRow)]
struct UserOverrideRow {
    permission_id: uuid::Uuid,
    resource: String,
    action: String,
    allow: bool,
}

#[async_trait]
impl UserAccessRepository for PostgresAccessControlRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id AS user_id, email, display_name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn upsert_user(&self, email: &str, display_name: &str) -> AppResult<Upserted<UserRecord>> {
        let row = sqlx::query_as::<_, UpsertedUserRow>(
            r#"
            INSERT INTO users (id, email, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name
            RETURNING
                id AS user_id,
                email,
                display_name,
                (xmax = 0) AS inserted
            "#,
        )
        .bind(UserId::new().as_uuid())
        .bind(email)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "failed to upsert user"))?;

        Ok(Upserted {
            outcome: upsert_outcome(row.inserted),
            record: row.user.into(),
        })
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(parse_id(role_id, "role")?)
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "failed to assign role"))?;

        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: &str) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(parse_id(role_id, "role")?)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role assignment: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT
                user_roles.role_id,
                roles.name AS role_name,
                to_char(user_roles.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS assigned_at
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
            ORDER BY roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user roles: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| UserRoleAssignment {
                user_id,
                role_id: row.role_id.to_string(),
                role_name: row.role_name,
                assigned_at: row.assigned_at,
            })
            .collect())
    }

    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO rbac_user_permissions (user_id, permission_id, allow)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, permission_id) DO UPDATE
            SET allow = EXCLUDED.allow
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(parse_id(permission_id, "permission")?)
        .bind(allow)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "failed to upsert user override"))?;

        Ok(upsert_outcome(inserted))
    }

    async fn remove_user_permission(&self, user_id: UserId, permission_id: &str) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_permissions
            WHERE user_id = $1 AND permission_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(parse_id(permission_id, "permission")?)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove user override: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "override '{user_id}:{permission_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_user_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let rows = sqlx::query_as::<_, UserOverrideRow>(
            r#"
            SELECT
                overrides.permission_id,
                permissions.resource,
                permissions.action,
                overrides.allow
            FROM rbac_user_permissions AS overrides
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user overrides: {error}")))?;

        let mut overrides = rows
            .into_iter()
            .map(|row| {
                Ok(UserPermissionOverride {
                    permission_id: row.permission_id.to_string(),
                    key: stored_key(row.resource.as_str(), row.action.as_str())?,
                    allow: row.allow,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        overrides.sort_by(|left, right| left.key.cmp(&right.key));
        Ok(overrides)
    }
}
