use tripcover_core::UserId;
use tripcover_domain::PermissionKey;

/// Whether an upsert inserted a new row or touched an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was inserted.
    Created,
    /// An existing row matched the natural key and was updated in place.
    Updated,
}

/// Upserted record paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<T> {
    /// Stored record after the upsert.
    pub record: T,
    /// Insert or update marker.
    pub outcome: UpsertOutcome,
}

impl<T> Upserted<T> {
    /// Returns whether the upsert inserted a new row.
    #[must_use]
    pub fn was_created(&self) -> bool {
        self.outcome == UpsertOutcome::Created
    }
}

/// Permission catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    /// Stable permission identifier.
    pub permission_id: String,
    /// Natural (resource, action) key.
    pub key: PermissionKey,
    /// Human-readable description.
    pub description: String,
}

/// Input payload for catalog upserts keyed by (resource, action).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertPermissionInput {
    /// Natural key of the permission.
    pub key: PermissionKey,
    /// Description written on insert and on update.
    pub description: String,
}

/// Role row without its bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    /// Stable role identifier.
    pub role_id: String,
    /// Unique role name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Indicates a built-in role that cannot be deleted.
    pub is_system: bool,
}

/// Input payload for role upserts keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRoleInput {
    /// Unique role name.
    pub name: String,
    /// Description written on insert and on update.
    pub description: String,
    /// System flag written on insert and on update.
    pub is_system: bool,
}

/// One allow/deny binding between a role and a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionGrant {
    /// Bound permission identifier.
    pub permission_id: String,
    /// Bound permission key.
    pub key: PermissionKey,
    /// `true` grants, `false` explicitly denies.
    pub allow: bool,
}

/// Role definition with its bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Role row.
    pub role: RoleRecord,
    /// Bindings ordered by permission key.
    pub grants: Vec<RolePermissionGrant>,
}

/// Requested binding for a new role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrantInput {
    /// Cataloged permission key.
    pub key: PermissionKey,
    /// `true` grants, `false` explicitly denies.
    pub allow: bool,
}

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Bindings to attach to the role.
    pub grants: Vec<RoleGrantInput>,
}

/// User row referenced by assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub user_id: UserId,
    /// Canonical email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
}

/// Assignment projection mapping a user to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAssignment {
    /// Assigned user.
    pub user_id: UserId,
    /// Role identifier.
    pub role_id: String,
    /// Role name.
    pub role_name: String,
    /// Assignment timestamp in RFC3339.
    pub assigned_at: String,
}

/// Direct per-user allow/deny override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPermissionOverride {
    /// Overridden permission identifier.
    pub permission_id: String,
    /// Overridden permission key.
    pub key: PermissionKey,
    /// `true` grants, `false` explicitly denies.
    pub allow: bool,
}

/// Grant reaching a user either directly or through one of their roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    /// Permission key.
    pub key: PermissionKey,
    /// `true` grants, `false` explicitly denies.
    pub allow: bool,
    /// Role name when the grant comes from a role, `None` for direct overrides.
    pub via_role: Option<String>,
}
