mod audit;
mod records;
mod repositories;

pub use audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};
pub use records::{
    CreateRoleInput, PermissionGrant, PermissionRecord, RoleDefinition, RoleGrantInput,
    RolePermissionGrant, RoleRecord, UpsertOutcome, UpsertPermissionInput, UpsertRoleInput,
    Upserted, UserPermissionOverride, UserRecord, UserRoleAssignment,
};
pub use repositories::{
    AuthorizationRepository, PermissionCatalogRepository, RoleRepository, UserAccessRepository,
};
