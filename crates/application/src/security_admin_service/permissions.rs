use super::*;

use crate::{AuditLogEntry, AuditLogQuery};

const AUDIT_LOG_MAX_LIMIT: usize = 200;

impl SecurityAdminService {
    /// Returns the permission catalog.
    pub async fn list_permissions(&self, actor: &UserIdentity) -> AppResult<Vec<PermissionRecord>> {
        self.require(actor, "permissions", Action::Read).await?;
        self.catalog_repository.list_permissions().await
    }

    /// Updates the description of a cataloged permission.
    pub async fn update_permission_description(
        &self,
        actor: &UserIdentity,
        key: &PermissionKey,
        description: &str,
    ) -> AppResult<PermissionRecord> {
        self.require(actor, "permissions", Action::Update).await?;

        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "permission description must not be empty".to_owned(),
            ));
        }

        let permission = self
            .catalog_repository
            .update_permission_description(key, description)
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityPermissionUpdated,
            "rbac_permission",
            key.to_string(),
            format!("updated description of permission '{key}'"),
        )
        .await?;

        Ok(permission)
    }

    /// Returns recent audit log entries.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        mut query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.require(actor, "logs", Action::Read).await?;

        query.limit = query.limit.clamp(1, AUDIT_LOG_MAX_LIMIT);
        self.audit_log_repository.list_recent_entries(query).await
    }
}
