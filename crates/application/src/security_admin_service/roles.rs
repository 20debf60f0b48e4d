use super::*;

use tripcover_core::NonEmptyString;
use tripcover_domain::SystemRole;

use crate::{CreateRoleInput, RoleRecord, UpsertOutcome};

impl SecurityAdminService {
    /// Returns all roles with their bindings.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<RoleDefinition>> {
        self.require(actor, "roles", Action::Read).await?;
        self.role_repository.list_roles().await
    }

    /// Returns one role with its bindings.
    pub async fn get_role(&self, actor: &UserIdentity, name: &str) -> AppResult<RoleDefinition> {
        self.require(actor, "roles", Action::Read).await?;
        self.find_role(name).await
    }

    /// Creates a custom role and emits an audit event.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<RoleDefinition> {
        self.require(actor, "roles", Action::Create).await?;

        let name = NonEmptyString::new(input.name.trim())?;
        if SystemRole::all()
            .iter()
            .any(|role| role.name().eq_ignore_ascii_case(name.as_str()))
        {
            return Err(AppError::Conflict(format!(
                "role name '{}' is reserved for a system role",
                name.as_str()
            )));
        }

        for grant in &input.grants {
            self.find_permission(&grant.key).await?;
        }

        let role = self
            .role_repository
            .create_role(CreateRoleInput {
                name: name.into(),
                description: input.description.trim().to_owned(),
                grants: input.grants,
            })
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRoleCreated,
            "rbac_role",
            role.role.name.clone(),
            format!(
                "created role '{}' with {} bindings",
                role.role.name,
                role.grants.len()
            ),
        )
        .await?;

        Ok(role)
    }

    /// Updates a role description and emits an audit event.
    pub async fn update_role_description(
        &self,
        actor: &UserIdentity,
        name: &str,
        description: &str,
    ) -> AppResult<RoleRecord> {
        self.require(actor, "roles", Action::Update).await?;

        let role = self
            .role_repository
            .update_role_description(name, description.trim())
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRoleUpdated,
            "rbac_role",
            role.name.clone(),
            format!("updated description of role '{}'", role.name),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a custom role. System roles yield `Conflict`.
    pub async fn delete_role(&self, actor: &UserIdentity, name: &str) -> AppResult<()> {
        self.require(actor, "roles", Action::Delete).await?;

        let role = self.find_role(name).await?;
        if role.role.is_system {
            return Err(AppError::Conflict(format!(
                "system role '{}' cannot be deleted",
                role.role.name
            )));
        }

        self.role_repository.delete_role(role.role.name.as_str()).await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRoleDeleted,
            "rbac_role",
            role.role.name.clone(),
            format!("deleted role '{}'", role.role.name),
        )
        .await
    }

    /// Writes an allow or deny binding between a role and a cataloged permission.
    pub async fn set_role_permission(
        &self,
        actor: &UserIdentity,
        role_name: &str,
        key: &PermissionKey,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        self.require(actor, "roles", Action::Update).await?;

        let role = self.find_role(role_name).await?;
        let permission = self.find_permission(key).await?;

        let outcome = self
            .role_repository
            .upsert_role_permission(
                role.role.role_id.as_str(),
                permission.permission_id.as_str(),
                allow,
            )
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRolePermissionSet,
            "rbac_role_permission",
            format!("{}:{key}", role.role.name),
            format!(
                "set '{key}' to {} on role '{}'",
                if allow { "allow" } else { "deny" },
                role.role.name
            ),
        )
        .await?;

        Ok(outcome)
    }

    /// Removes a binding so the role no longer has an opinion on the permission.
    pub async fn remove_role_permission(
        &self,
        actor: &UserIdentity,
        role_name: &str,
        key: &PermissionKey,
    ) -> AppResult<()> {
        self.require(actor, "roles", Action::Update).await?;

        let role = self.find_role(role_name).await?;
        let permission = self.find_permission(key).await?;

        self.role_repository
            .remove_role_permission(
                role.role.role_id.as_str(),
                permission.permission_id.as_str(),
            )
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRolePermissionRemoved,
            "rbac_role_permission",
            format!("{}:{key}", role.role.name),
            format!("removed '{key}' from role '{}'", role.role.name),
        )
        .await
    }
}
