//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod authorization_service;
mod security_admin_service;
mod seed_service;
mod session_service;

pub use access_ports::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    AuthorizationRepository, CreateRoleInput, PermissionCatalogRepository, PermissionGrant,
    PermissionRecord, RoleDefinition, RoleGrantInput, RolePermissionGrant, RoleRecord,
    RoleRepository, UpsertOutcome, UpsertPermissionInput, UpsertRoleInput, Upserted,
    UserAccessRepository, UserPermissionOverride, UserRecord, UserRoleAssignment,
};
pub use authorization_service::{
    AccessResolution, AuthorizationService, DecisionSource, EffectivePermission,
};
pub use security_admin_service::SecurityAdminService;
pub use seed_service::{CatalogSeedReport, RoleSeedReport, SeedAdmin, SeedReport, SeedService};
pub use session_service::{IssuedSession, SessionRepository, SessionService};
