mod access;
mod common;
mod security;

pub use access::{AccessCheckQuery, AccessCheckResponse, CurrentAccessResponse, EffectivePermissionResponse};
pub use common::{HealthDependencyStatus, HealthResponse, UserIdentityResponse};
pub use security::{
    AuditLogEntryResponse, AuditLogQueryRequest, CreateRoleRequest, PermissionResponse,
    RoleAssignmentResponse, RoleGrantRequest, RoleGrantResponse, RoleResponse,
    SetPermissionRequest, UpdateDescriptionRequest, UpsertResultResponse, UserPermissionResponse,
};
