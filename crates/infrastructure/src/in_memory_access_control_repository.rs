use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use tripcover_application::{
    AuditLogEntry, PermissionRecord, RoleDefinition, RolePermissionGrant, RoleRecord,
    UpsertOutcome, UserRecord,
};
use tripcover_core::{AppError, AppResult, UserId};
use tripcover_domain::PermissionKey;

mod access;
mod catalog;
mod sessions;


/// In-memory implementation of every access control port.
///
/// Used as the test double for services and routers, and for local runs
/// without a database. All tables live behind one lock so multi-table writes
/// stay consistent.
#[derive(Debug, Default)]
pub struct InMemoryAccessControlRepository {
    state: RwLock<AccessState>,
}

#[derive(Debug, Default)]
struct AccessState {
    permissions: BTreeMap<PermissionKey, PermissionRecord>,
    roles: BTreeMap<String, RoleRecord>,
    role_bindings: HashMap<(String, String), bool>,
    users: HashMap<UserId, UserRecord>,
    user_roles: BTreeMap<(UserId, String), DateTime<Utc>>,
    user_overrides: HashMap<(UserId, String), bool>,
    sessions: HashMap<String, (UserId, DateTime<Utc>)>,
    audit_entries: Vec<AuditLogEntry>,
}

impl InMemoryAccessControlRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccessState {
    fn permission_by_id(&self, permission_id: &str) -> AppResult<&PermissionRecord> {
        self.permissions
            .values()
            .find(|permission| permission.permission_id == permission_id)
            .ok_or_else(|| AppError::NotFound(format!("permission '{permission_id}' was not found")))
    }

    fn role_by_id(&self, role_id: &str) -> AppResult<&RoleRecord> {
        self.roles
            .values()
            .find(|role| role.role_id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    fn permission_id(&self, key: &PermissionKey) -> Option<&str> {
        self.permissions
            .get(key)
            .map(|permission| permission.permission_id.as_str())
    }

    fn role_definition(&self, role: &RoleRecord) -> RoleDefinition {
        let mut grants: Vec<RolePermissionGrant> = self
            .role_bindings
            .iter()
            .filter(|((role_id, _), _)| role_id == &role.role_id)
            .filter_map(|((_, permission_id), allow)| {
                self.permission_by_id(permission_id)
                    .ok()
                    .map(|permission| RolePermissionGrant {
                        permission_id: permission_id.clone(),
                        key: permission.key.clone(),
                        allow: *allow,
                    })
            })
            .collect();
        grants.sort_by(|left, right| left.key.cmp(&right.key));

        RoleDefinition {
            role: role.clone(),
            grants,
        }
    }

    fn role_ids_for_user(&self, user_id: UserId) -> impl Iterator<Item = &String> {
        self.user_roles
            .keys()
            .filter(move |(assigned_user, _)| *assigned_user == user_id)
            .map(|(_, role_id)| role_id)
    }

    fn remove_role_rows(&mut self, role_id: &str) {
        self.role_bindings
            .retain(|(bound_role, _), _| bound_role != role_id);
        self.user_roles
            .retain(|(_, assigned_role), _| assigned_role != role_id);
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn upsert_outcome(existed: bool) -> UpsertOutcome {
    if existed {
        UpsertOutcome::Updated
    } else {
        UpsertOutcome::Created
    }
}
