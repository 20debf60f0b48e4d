use std::sync::Arc;

use tripcover_core::{AppError, AppResult, UserId, UserIdentity};
use tripcover_domain::{Action, AuditAction, PermissionKey, ResourceName};

use crate::{
    AuditEvent, AuditLogRepository, AuditRepository, AuthorizationService,
    PermissionCatalogRepository, PermissionRecord, RoleDefinition, RoleRepository,
    UserAccessRepository, UserRecord,
};

mod assignments;
mod permissions;
mod roles;

#[cfg(test)]
mod tests;

/// Application service for security administration workflows.
///
/// Every operation is gated by the acting user's effective permissions and
/// leaves an audit trail for mutations.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    catalog_repository: Arc<dyn PermissionCatalogRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserAccessRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

impl SecurityAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        catalog_repository: Arc<dyn PermissionCatalogRepository>,
        role_repository: Arc<dyn RoleRepository>,
        user_repository: Arc<dyn UserAccessRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            authorization_service,
            catalog_repository,
            role_repository,
            user_repository,
            audit_repository,
            audit_log_repository,
        }
    }

    async fn require(&self, actor: &UserIdentity, resource: &str, action: Action) -> AppResult<()> {
        let key = PermissionKey::new(ResourceName::new(resource)?, action);
        self.authorization_service
            .require_permission(actor.user_id(), &key)
            .await
    }

    async fn append_audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }

    async fn find_role(&self, name: &str) -> AppResult<RoleDefinition> {
        self.role_repository
            .find_role_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' was not found")))
    }

    async fn find_permission(&self, key: &PermissionKey) -> AppResult<PermissionRecord> {
        self.catalog_repository
            .find_permission(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{key}' was not found")))
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }
}
