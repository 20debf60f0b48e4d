use std::collections::HashMap;

use async_trait::async_trait;

use tripcover_application::{
    CreateRoleInput, RoleDefinition, RolePermissionGrant, RoleRecord, RoleRepository,
    UpsertRoleInput, Upserted,
};

use super::*;

#[derive(Debug, FromRow)]
struct UpsertedRoleRow {
    #[sqlx(flatten)]
    role: RoleRow,
    inserted: bool,
}

#[derive(Debug, FromRow)]
struct RoleGrantRow {
    role_id: uuid::Uuid,
    permission_id: uuid::Uuid,
    resource: String,
    action: String,
    allow: bool,
}

impl PostgresAccessControlRepository {
    async fn load_roles(&self, name: Option<&str>) -> AppResult<Vec<RoleDefinition>> {
        let roles = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id AS role_id, name, description, is_system
            FROM rbac_roles
            WHERE ($1::TEXT IS NULL OR name = $1)
            ORDER BY name
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        let grants = sqlx::query_as::<_, RoleGrantRow>(
            r#"
            SELECT
                bindings.role_id,
                bindings.permission_id,
                permissions.resource,
                permissions.action,
                bindings.allow
            FROM rbac_role_permissions AS bindings
            INNER JOIN rbac_roles AS roles
                ON roles.id = bindings.role_id
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = bindings.permission_id
            WHERE ($1::TEXT IS NULL OR roles.name = $1)
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role bindings: {error}")))?;

        let mut grants_by_role: HashMap<uuid::Uuid, Vec<RolePermissionGrant>> = HashMap::new();
        for grant in grants {
            grants_by_role
                .entry(grant.role_id)
                .or_default()
                .push(RolePermissionGrant {
                    permission_id: grant.permission_id.to_string(),
                    key: stored_key(grant.resource.as_str(), grant.action.as_str())?,
                    allow: grant.allow,
                });
        }

        Ok(roles
            .into_iter()
            .map(|role| {
                let mut grants = grants_by_role.remove(&role.role_id).unwrap_or_default();
                grants.sort_by(|left, right| left.key.cmp(&right.key));
                RoleDefinition {
                    role: role.into(),
                    grants,
                }
            })
            .collect())
    }
}

#[async_trait]
impl RoleRepository for PostgresAccessControlRepository {
    async fn upsert_role(&self, input: UpsertRoleInput) -> AppResult<Upserted<RoleRecord>> {
        let row = sqlx::query_as::<_, UpsertedRoleRow>(
            r#"
            INSERT INTO rbac_roles (name, description, is_system)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET description = EXCLUDED.description,
                is_system = EXCLUDED.is_system,
                updated_at = now()
            RETURNING
                id AS role_id,
                name,
                description,
                is_system,
                (xmax = 0) AS inserted
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description)
        .bind(input.is_system)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "failed to upsert role"))?;

        Ok(Upserted {
            outcome: upsert_outcome(row.inserted),
            record: row.role.into(),
        })
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO rbac_roles (name, description, is_system)
            VALUES ($1, $2, false)
            RETURNING id
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, input.name.as_str()))?;

        for grant in &input.grants {
            let rows_affected = sqlx::query(
                r#"
                INSERT INTO rbac_role_permissions (role_id, permission_id, allow)
                SELECT $1, permissions.id, $4
                FROM rbac_permissions AS permissions
                WHERE permissions.resource = $2 AND permissions.action = $3
                ON CONFLICT (role_id, permission_id) DO UPDATE
                SET allow = EXCLUDED.allow
                "#,
            )
            .bind(role_id)
            .bind(grant.key.resource().as_str())
            .bind(grant.key.action().as_str())
            .bind(grant.allow)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to persist role bindings: {error}"))
            })?
            .rows_affected();

            if rows_affected == 0 {
                return Err(AppError::NotFound(format!(
                    "permission '{}' was not found",
                    grant.key
                )));
            }
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        self.find_role_by_name(input.name.as_str())
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("role '{}' vanished after creation", input.name))
            })
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(self.load_roles(Some(name)).await?.into_iter().next())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.load_roles(None).await
    }

    async fn update_role_description(
        &self,
        name: &str,
        description: &str,
    ) -> AppResult<RoleRecord> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE rbac_roles
            SET description = $2,
                updated_at = now()
            WHERE name = $1
            RETURNING id AS role_id, name, description, is_system
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?
        .map(RoleRecord::from)
        .ok_or_else(|| AppError::NotFound(format!("role '{name}' was not found")))
    }

    async fn delete_role(&self, name: &str) -> AppResult<()> {
        let is_system = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_system
            FROM rbac_roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{name}' was not found")))?;

        if is_system {
            return Err(AppError::Conflict(format!(
                "system role '{name}' cannot be deleted"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM rbac_roles
            WHERE name = $1 AND is_system = false
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        Ok(())
    }

    async fn count_roles(&self) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rbac_roles")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count roles: {error}")))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn upsert_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO rbac_role_permissions (role_id, permission_id, allow)
            VALUES ($1, $2, $3)
            ON CONFLICT (role_id, permission_id) DO UPDATE
            SET allow = EXCLUDED.allow
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(parse_id(role_id, "role")?)
        .bind(parse_id(permission_id, "permission")?)
        .bind(allow)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "failed to upsert role binding"))?;

        Ok(upsert_outcome(inserted))
    }

    async fn remove_role_permission(&self, role_id: &str, permission_id: &str) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_role_permissions
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(parse_id(role_id, "role")?)
        .bind(parse_id(permission_id, "permission")?)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role binding: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "binding '{role_id}:{permission_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn count_role_permissions(&self) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rbac_role_permissions")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to count role bindings: {error}"))
            })?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to create role: {error}"))
}
