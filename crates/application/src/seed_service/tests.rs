use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tripcover_core::{AppError, AppResult, UserId};
use tripcover_domain::PermissionKey;

use crate::{
    CreateRoleInput, PermissionCatalogRepository, PermissionRecord, RoleDefinition,
    RoleRepository, RoleRecord, UpsertOutcome, UpsertPermissionInput, UpsertRoleInput, Upserted,
    UserAccessRepository, UserPermissionOverride, UserRecord, UserRoleAssignment,
};

use super::{SeedAdmin, SeedService};

#[derive(Default)]
struct EmptyCatalogRepository;

#[async_trait]
impl PermissionCatalogRepository for EmptyCatalogRepository {
    async fn upsert_permission(
        &self,
        _input: UpsertPermissionInput,
    ) -> AppResult<Upserted<PermissionRecord>> {
        Err(AppError::Internal("catalog is read-only in this test".to_owned()))
    }

    async fn find_permission(&self, _key: &PermissionKey) -> AppResult<Option<PermissionRecord>> {
        Ok(None)
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        Ok(Vec::new())
    }

    async fn count_permissions(&self) -> AppResult<u64> {
        Ok(0)
    }

    async fn update_permission_description(
        &self,
        key: &PermissionKey,
        _description: &str,
    ) -> AppResult<PermissionRecord> {
        Err(AppError::NotFound(format!("permission '{key}' was not found")))
    }
}

#[derive(Default)]
struct RecordingRoleRepository {
    upserted_roles: Mutex<Vec<String>>,
}

#[async_trait]
impl RoleRepository for RecordingRoleRepository {
    async fn upsert_role(&self, input: UpsertRoleInput) -> AppResult<Upserted<RoleRecord>> {
        self.upserted_roles.lock().await.push(input.name.clone());
        Ok(Upserted {
            record: RoleRecord {
                role_id: input.name.clone(),
                name: input.name,
                description: input.description,
                is_system: input.is_system,
            },
            outcome: UpsertOutcome::Created,
        })
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        Err(AppError::Conflict(format!("role '{}' already exists", input.name)))
    }

    async fn find_role_by_name(&self, _name: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(None)
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(Vec::new())
    }

    async fn update_role_description(
        &self,
        name: &str,
        _description: &str,
    ) -> AppResult<RoleRecord> {
        Err(AppError::NotFound(format!("role '{name}' was not found")))
    }

    async fn delete_role(&self, name: &str) -> AppResult<()> {
        Err(AppError::NotFound(format!("role '{name}' was not found")))
    }

    async fn count_roles(&self) -> AppResult<u64> {
        Ok(self.upserted_roles.lock().await.len() as u64)
    }

    async fn upsert_role_permission(
        &self,
        _role_id: &str,
        _permission_id: &str,
        _allow: bool,
    ) -> AppResult<UpsertOutcome> {
        Ok(UpsertOutcome::Created)
    }

    async fn remove_role_permission(&self, _role_id: &str, _permission_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn count_role_permissions(&self) -> AppResult<u64> {
        Ok(0)
    }
}

#[derive(Default)]
struct NoUsersRepository;

#[async_trait]
impl UserAccessRepository for NoUsersRepository {
    async fn find_user(&self, _user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(None)
    }

    async fn upsert_user(&self, email: &str, display_name: &str) -> AppResult<Upserted<UserRecord>> {
        Ok(Upserted {
            record: UserRecord {
                user_id: UserId::new(),
                email: email.to_owned(),
                display_name: display_name.to_owned(),
            },
            outcome: UpsertOutcome::Created,
        })
    }

    async fn assign_role_to_user(&self, _user_id: UserId, _role_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn remove_role_from_user(&self, _user_id: UserId, _role_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn list_user_roles(&self, _user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        Ok(Vec::new())
    }

    async fn upsert_user_permission(
        &self,
        _user_id: UserId,
        _permission_id: &str,
        _allow: bool,
    ) -> AppResult<UpsertOutcome> {
        Ok(UpsertOutcome::Created)
    }

    async fn remove_user_permission(&self, _user_id: UserId, _permission_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn list_user_permissions(
        &self,
        _user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn role_bootstrap_before_catalog_is_a_misconfiguration() {
    let role_repository = Arc::new(RecordingRoleRepository::default());
    let service = SeedService::new(
        Arc::new(EmptyCatalogRepository),
        role_repository.clone(),
        Arc::new(NoUsersRepository),
    );

    let result = service.bootstrap_system_roles().await;
    assert!(matches!(result, Err(AppError::Misconfiguration(_))));
    assert!(role_repository.upserted_roles.lock().await.is_empty());
}

#[tokio::test]
async fn admin_bootstrap_requires_the_admin_role() {
    let service = SeedService::new(
        Arc::new(EmptyCatalogRepository),
        Arc::new(RecordingRoleRepository::default()),
        Arc::new(NoUsersRepository),
    );

    let result = service
        .bootstrap_admin(SeedAdmin {
            email: "ops@tripcover.test".to_owned(),
            display_name: "Ops".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn admin_bootstrap_rejects_invalid_email() {
    let service = SeedService::new(
        Arc::new(EmptyCatalogRepository),
        Arc::new(RecordingRoleRepository::default()),
        Arc::new(NoUsersRepository),
    );

    let result = service
        .bootstrap_admin(SeedAdmin {
            email: "   ".to_owned(),
            display_name: "Ops".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}
