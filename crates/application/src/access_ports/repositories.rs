use async_trait::async_trait;

use tripcover_core::{AppResult, UserId};
use tripcover_domain::PermissionKey;

use super::records::{
    CreateRoleInput, PermissionGrant, PermissionRecord, RoleDefinition, RoleRecord,
    UpsertOutcome, UpsertPermissionInput, UpsertRoleInput, Upserted, UserPermissionOverride,
    UserRecord, UserRoleAssignment,
};

/// Repository port for the permission catalog.
#[async_trait]
pub trait PermissionCatalogRepository: Send + Sync {
    /// Inserts or updates the permission keyed by (resource, action).
    async fn upsert_permission(
        &self,
        input: UpsertPermissionInput,
    ) -> AppResult<Upserted<PermissionRecord>>;

    /// Finds a permission by natural key.
    async fn find_permission(&self, key: &PermissionKey) -> AppResult<Option<PermissionRecord>>;

    /// Lists the whole catalog ordered by resource and action.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>>;

    /// Counts catalog rows.
    async fn count_permissions(&self) -> AppResult<u64>;

    /// Updates the description of an existing permission.
    async fn update_permission_description(
        &self,
        key: &PermissionKey,
        description: &str,
    ) -> AppResult<PermissionRecord>;
}

/// Repository port for roles and their permission bindings.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Inserts or updates the role keyed by name.
    async fn upsert_role(&self, input: UpsertRoleInput) -> AppResult<Upserted<RoleRecord>>;

    /// Creates a non-system role with bindings, failing on a duplicate name.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition>;

    /// Finds a role and its bindings by name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleDefinition>>;

    /// Lists roles with bindings ordered by name.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Updates a role description.
    async fn update_role_description(&self, name: &str, description: &str)
    -> AppResult<RoleRecord>;

    /// Deletes a non-system role together with its bindings and assignments.
    async fn delete_role(&self, name: &str) -> AppResult<()>;

    /// Counts roles.
    async fn count_roles(&self) -> AppResult<u64>;

    /// Inserts or updates the binding keyed by (role, permission).
    async fn upsert_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome>;

    /// Removes a binding, returning `NotFound` when absent.
    async fn remove_role_permission(&self, role_id: &str, permission_id: &str) -> AppResult<()>;

    /// Counts bindings across all roles.
    async fn count_role_permissions(&self) -> AppResult<u64>;
}

/// Repository port for users and their direct assignments.
#[async_trait]
pub trait UserAccessRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Inserts or updates a user keyed by email.
    async fn upsert_user(&self, email: &str, display_name: &str) -> AppResult<Upserted<UserRecord>>;

    /// Assigns a role to a user; assigning twice is a no-op.
    async fn assign_role_to_user(&self, user_id: UserId, role_id: &str) -> AppResult<()>;

    /// Removes a role assignment, returning `NotFound` when absent.
    async fn remove_role_from_user(&self, user_id: UserId, role_id: &str) -> AppResult<()>;

    /// Lists role assignments of a user ordered by role name.
    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>>;

    /// Inserts or updates the direct override keyed by (user, permission).
    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome>;

    /// Removes a direct override, returning `NotFound` when absent.
    async fn remove_user_permission(&self, user_id: UserId, permission_id: &str) -> AppResult<()>;

    /// Lists direct overrides of a user ordered by permission key.
    async fn list_user_permissions(&self, user_id: UserId)
    -> AppResult<Vec<UserPermissionOverride>>;
}

/// Read port consumed by the effective permission resolver.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Returns whether the key is present in the permission catalog.
    async fn permission_exists(&self, key: &PermissionKey) -> AppResult<bool>;

    /// Returns the direct override for the user and key, if any.
    async fn find_user_permission_override(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Option<bool>>;

    /// Returns the `allow` flag of every binding for the key across the user's roles.
    async fn list_role_decisions_for_user(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Vec<bool>>;

    /// Lists every direct override and role binding reaching the user.
    async fn list_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>>;
}
