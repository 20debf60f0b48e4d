use serde::{Deserialize, Serialize};
use tripcover_application::{
    AuditLogEntry, PermissionRecord, RoleDefinition, RolePermissionGrant, UpsertOutcome,
    UserPermissionOverride, UserRoleAssignment,
};
use ts_rs::TS;

/// API representation of a cataloged permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub permission: String,
    pub resource: String,
    pub action: String,
    pub description: String,
}

impl From<PermissionRecord> for PermissionResponse {
    fn from(value: PermissionRecord) -> Self {
        Self {
            permission_id: value.permission_id,
            permission: value.key.to_string(),
            resource: value.key.resource().as_str().to_owned(),
            action: value.key.action().as_str().to_owned(),
            description: value.description,
        }
    }
}

/// Incoming payload for description updates on permissions and roles.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-description-request.ts"
)]
pub struct UpdateDescriptionRequest {
    pub description: String,
}

/// One requested binding in `resource:ACTION` form.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-grant-request.ts"
)]
pub struct RoleGrantRequest {
    pub permission: String,
    pub allow: bool,
}

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub grants: Vec<RoleGrantRequest>,
}

/// Binding of a role as returned to the frontend.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-grant-response.ts"
)]
pub struct RoleGrantResponse {
    pub permission: String,
    pub allow: bool,
}

impl From<RolePermissionGrant> for RoleGrantResponse {
    fn from(value: RolePermissionGrant) -> Self {
        Self {
            permission: value.key.to_string(),
            allow: value.allow,
        }
    }
}

/// API representation of an RBAC role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub grants: Vec<RoleGrantResponse>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role.role_id,
            name: value.role.name,
            description: value.role.description,
            is_system: value.role.is_system,
            grants: value.grants.into_iter().map(RoleGrantResponse::from).collect(),
        }
    }
}

/// Incoming payload for role bindings and user overrides.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/set-permission-request.ts"
)]
pub struct SetPermissionRequest {
    pub allow: bool,
}

/// Whether a write inserted a new row or updated an existing one.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/upsert-result-response.ts"
)]
pub struct UpsertResultResponse {
    pub created: bool,
}

impl From<UpsertOutcome> for UpsertResultResponse {
    fn from(value: UpsertOutcome) -> Self {
        Self {
            created: value == UpsertOutcome::Created,
        }
    }
}

/// API representation of a role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
    pub assigned_at: String,
}

impl From<UserRoleAssignment> for RoleAssignmentResponse {
    fn from(value: UserRoleAssignment) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            role_id: value.role_id,
            role_name: value.role_name,
            assigned_at: value.assigned_at,
        }
    }
}

/// API representation of a direct per-user override.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-permission-response.ts"
)]
pub struct UserPermissionResponse {
    pub permission_id: String,
    pub permission: String,
    pub allow: bool,
}

impl From<UserPermissionOverride> for UserPermissionResponse {
    fn from(value: UserPermissionOverride) -> Self {
        Self {
            permission_id: value.permission_id,
            permission: value.key.to_string(),
            allow: value.allow,
        }
    }
}

/// Query parameters for audit log listing.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-query-request.ts"
)]
pub struct AuditLogQueryRequest {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub subject: Option<String>,
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub subject: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            subject: value.subject,
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at,
        }
    }
}
