//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod permission;
mod role;
mod security;

pub use permission::{
    Action, CATALOG_RESOURCES, PermissionKey, RESOURCE_NAME_MAX_LENGTH, ResourceName,
    catalog_keys,
};
pub use role::SystemRole;
pub use security::{AccessDecision, AuditAction};
