use super::*;

use crate::{UpsertOutcome, UserPermissionOverride, UserRoleAssignment};

impl SecurityAdminService {
    /// Assigns a role to a user and emits an audit event.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.require(actor, "users", Action::Update).await?;

        let user = self.find_user(user_id).await?;
        let role = self.find_role(role_name).await?;

        self.user_repository
            .assign_role_to_user(user.user_id, role.role.role_id.as_str())
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRoleAssigned,
            "rbac_user_role",
            format!("{}:{}", user.user_id, role.role.name),
            format!("assigned role '{}' to '{}'", role.role.name, user.email),
        )
        .await
    }

    /// Removes a role assignment from a user and emits an audit event.
    pub async fn unassign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.require(actor, "users", Action::Update).await?;

        let user = self.find_user(user_id).await?;
        let role = self.find_role(role_name).await?;

        self.user_repository
            .remove_role_from_user(user.user_id, role.role.role_id.as_str())
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRoleUnassigned,
            "rbac_user_role",
            format!("{}:{}", user.user_id, role.role.name),
            format!("removed role '{}' from '{}'", role.role.name, user.email),
        )
        .await
    }

    /// Returns the roles held by a user.
    pub async fn list_user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        self.require(actor, "users", Action::Read).await?;

        let user = self.find_user(user_id).await?;
        self.user_repository.list_user_roles(user.user_id).await
    }

    /// Writes a direct per-user override that takes precedence over roles.
    pub async fn set_user_permission(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        key: &PermissionKey,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        self.require(actor, "users", Action::Update).await?;

        let user = self.find_user(user_id).await?;
        let permission = self.find_permission(key).await?;

        let outcome = self
            .user_repository
            .upsert_user_permission(user.user_id, permission.permission_id.as_str(), allow)
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityUserPermissionSet,
            "rbac_user_permission",
            format!("{}:{key}", user.user_id),
            format!(
                "set '{key}' to {} for '{}'",
                if allow { "allow" } else { "deny" },
                user.email
            ),
        )
        .await?;

        Ok(outcome)
    }

    /// Removes a direct per-user override.
    pub async fn remove_user_permission(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<()> {
        self.require(actor, "users", Action::Update).await?;

        let user = self.find_user(user_id).await?;
        let permission = self.find_permission(key).await?;

        self.user_repository
            .remove_user_permission(user.user_id, permission.permission_id.as_str())
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityUserPermissionRemoved,
            "rbac_user_permission",
            format!("{}:{key}", user.user_id),
            format!("removed override '{key}' for '{}'", user.email),
        )
        .await
    }

    /// Returns the direct overrides of a user.
    pub async fn list_user_permissions(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        self.require(actor, "users", Action::Read).await?;

        let user = self.find_user(user_id).await?;
        self.user_repository.list_user_permissions(user.user_id).await
    }
}
