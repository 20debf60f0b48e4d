use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tripcover_core::{AppError, AppResult, UserId, UserIdentity};
use tripcover_domain::{Action, AuditAction, PermissionKey};

use crate::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    AuthorizationRepository, AuthorizationService, CreateRoleInput, PermissionCatalogRepository,
    PermissionGrant, PermissionRecord, RoleDefinition, RoleGrantInput, RolePermissionGrant,
    RoleRecord, RoleRepository, UpsertOutcome, UpsertPermissionInput, UpsertRoleInput, Upserted,
    UserAccessRepository, UserPermissionOverride, UserRecord, UserRoleAssignment,
};

use super::SecurityAdminService;

#[derive(Default)]
struct StoreState {
    permissions: Vec<PermissionRecord>,
    roles: Vec<RoleDefinition>,
    users: Vec<UserRecord>,
    user_roles: Vec<(UserId, String)>,
    overrides: Vec<(UserId, String, bool)>,
    audit: Vec<AuditEvent>,
}

#[derive(Default)]
struct FakeAccessStore {
    state: Mutex<StoreState>,
}

fn key(value: &str) -> PermissionKey {
    value.parse().unwrap_or_else(|_| panic!("invalid test key {value}"))
}

impl FakeAccessStore {
    async fn with_permission(self, value: &str) -> Self {
        {
            let mut state = self.state.lock().await;
            let id = format!("perm-{}", state.permissions.len());
            let key = key(value);
            state.permissions.push(PermissionRecord {
                permission_id: id,
                description: key.default_description(),
                key,
            });
        }
        self
    }

    async fn with_role(self, name: &str, is_system: bool, grants: &[(&str, bool)]) -> Self {
        {
            let mut state = self.state.lock().await;
            let grants = grants
                .iter()
                .map(|(value, allow)| {
                    let key = key(value);
                    let permission_id = state
                        .permissions
                        .iter()
                        .find(|permission| permission.key == key)
                        .map(|permission| permission.permission_id.clone())
                        .unwrap_or_default();
                    RolePermissionGrant {
                        permission_id,
                        key,
                        allow: *allow,
                    }
                })
                .collect();
            state.roles.push(RoleDefinition {
                role: RoleRecord {
                    role_id: format!("role-{name}"),
                    name: name.to_owned(),
                    description: String::new(),
                    is_system,
                },
                grants,
            });
        }
        self
    }

    async fn with_user(self, user_id: UserId, email: &str, roles: &[&str]) -> Self {
        {
            let mut state = self.state.lock().await;
            state.users.push(UserRecord {
                user_id,
                email: email.to_owned(),
                display_name: email.to_owned(),
            });
            for role in roles {
                state.user_roles.push((user_id, format!("role-{role}")));
            }
        }
        self
    }

    async fn audit_actions(&self) -> Vec<AuditAction> {
        self.state
            .lock()
            .await
            .audit
            .iter()
            .map(|event| event.action)
            .collect()
    }
}

#[async_trait]
impl PermissionCatalogRepository for FakeAccessStore {
    async fn upsert_permission(
        &self,
        _input: UpsertPermissionInput,
    ) -> AppResult<Upserted<PermissionRecord>> {
        Err(AppError::Internal("not used".to_owned()))
    }

    async fn find_permission(&self, key: &PermissionKey) -> AppResult<Option<PermissionRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .find(|permission| &permission.key == key)
            .cloned())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        Ok(self.state.lock().await.permissions.clone())
    }

    async fn count_permissions(&self) -> AppResult<u64> {
        Ok(self.state.lock().await.permissions.len() as u64)
    }

    async fn update_permission_description(
        &self,
        key: &PermissionKey,
        description: &str,
    ) -> AppResult<PermissionRecord> {
        let mut state = self.state.lock().await;
        let permission = state
            .permissions
            .iter_mut()
            .find(|permission| &permission.key == key)
            .ok_or_else(|| AppError::NotFound(format!("permission '{key}' was not found")))?;
        permission.description = description.to_owned();
        Ok(permission.clone())
    }
}

#[async_trait]
impl RoleRepository for FakeAccessStore {
    async fn upsert_role(&self, _input: UpsertRoleInput) -> AppResult<Upserted<RoleRecord>> {
        Err(AppError::Internal("not used".to_owned()))
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|role| role.role.name == input.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let grants = input
            .grants
            .into_iter()
            .map(|grant| RolePermissionGrant {
                permission_id: String::new(),
                key: grant.key,
                allow: grant.allow,
            })
            .collect();
        let role = RoleDefinition {
            role: RoleRecord {
                role_id: format!("role-{}", input.name),
                name: input.name,
                description: input.description,
                is_system: false,
            },
            grants,
        };
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.role.name == name)
            .cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(self.state.lock().await.roles.clone())
    }

    async fn update_role_description(
        &self,
        name: &str,
        description: &str,
    ) -> AppResult<RoleRecord> {
        let mut state = self.state.lock().await;
        let role = state
            .roles
            .iter_mut()
            .find(|role| role.role.name == name)
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' was not found")))?;
        role.role.description = description.to_owned();
        Ok(role.role.clone())
    }

    async fn delete_role(&self, name: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.roles.retain(|role| role.role.name != name);
        let role_id = format!("role-{name}");
        state.user_roles.retain(|(_, assigned)| assigned != &role_id);
        Ok(())
    }

    async fn count_roles(&self) -> AppResult<u64> {
        Ok(self.state.lock().await.roles.len() as u64)
    }

    async fn upsert_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        let mut state = self.state.lock().await;
        let key = state
            .permissions
            .iter()
            .find(|permission| permission.permission_id == permission_id)
            .map(|permission| permission.key.clone())
            .ok_or_else(|| AppError::NotFound(format!("permission '{permission_id}'")))?;
        let role = state
            .roles
            .iter_mut()
            .find(|role| role.role.role_id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}'")))?;

        if let Some(grant) = role
            .grants
            .iter_mut()
            .find(|grant| grant.permission_id == permission_id)
        {
            grant.allow = allow;
            return Ok(UpsertOutcome::Updated);
        }

        role.grants.push(RolePermissionGrant {
            permission_id: permission_id.to_owned(),
            key,
            allow,
        });
        Ok(UpsertOutcome::Created)
    }

    async fn remove_role_permission(&self, role_id: &str, permission_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(role) = state
            .roles
            .iter_mut()
            .find(|role| role.role.role_id == role_id)
        {
            role.grants
                .retain(|grant| grant.permission_id != permission_id);
        }
        Ok(())
    }

    async fn count_role_permissions(&self) -> AppResult<u64> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .map(|role| role.grants.len() as u64)
            .sum())
    }
}

#[async_trait]
impl UserAccessRepository for FakeAccessStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.user_id == user_id)
            .cloned())
    }

    async fn upsert_user(&self, _email: &str, _display_name: &str) -> AppResult<Upserted<UserRecord>> {
        Err(AppError::Internal("not used".to_owned()))
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let assignment = (user_id, role_id.to_owned());
        if !state.user_roles.contains(&assignment) {
            state.user_roles.push(assignment);
        }
        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let before = state.user_roles.len();
        state
            .user_roles
            .retain(|(user, role)| !(user == &user_id && role == role_id));
        if state.user_roles.len() == before {
            return Err(AppError::NotFound("assignment was not found".to_owned()));
        }
        Ok(())
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|(user, _)| user == &user_id)
            .filter_map(|(_, role_id)| {
                state
                    .roles
                    .iter()
                    .find(|role| &role.role.role_id == role_id)
                    .map(|role| UserRoleAssignment {
                        user_id,
                        role_id: role_id.clone(),
                        role_name: role.role.name.clone(),
                        assigned_at: String::new(),
                    })
            })
            .collect())
    }

    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .overrides
            .iter_mut()
            .find(|(user, permission, _)| user == &user_id && permission == permission_id)
        {
            existing.2 = allow;
            return Ok(UpsertOutcome::Updated);
        }
        state
            .overrides
            .push((user_id, permission_id.to_owned(), allow));
        Ok(UpsertOutcome::Created)
    }

    async fn remove_user_permission(&self, user_id: UserId, permission_id: &str) -> AppResult<()> {
        self.state
            .lock()
            .await
            .overrides
            .retain(|(user, permission, _)| !(user == &user_id && permission == permission_id));
        Ok(())
    }

    async fn list_user_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let state = self.state.lock().await;
        Ok(state
            .overrides
            .iter()
            .filter(|(user, _, _)| user == &user_id)
            .filter_map(|(_, permission_id, allow)| {
                state
                    .permissions
                    .iter()
                    .find(|permission| &permission.permission_id == permission_id)
                    .map(|permission| UserPermissionOverride {
                        permission_id: permission_id.clone(),
                        key: permission.key.clone(),
                        allow: *allow,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAccessStore {
    async fn permission_exists(&self, key: &PermissionKey) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .any(|permission| &permission.key == key))
    }

    async fn find_user_permission_override(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Option<bool>> {
        let state = self.state.lock().await;
        let Some(permission) = state.permissions.iter().find(|permission| &permission.key == key)
        else {
            return Ok(None);
        };
        Ok(state
            .overrides
            .iter()
            .find(|(user, permission_id, _)| {
                user == &user_id && permission_id == &permission.permission_id
            })
            .map(|(_, _, allow)| *allow))
    }

    async fn list_role_decisions_for_user(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Vec<bool>> {
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|(user, _)| user == &user_id)
            .filter_map(|(_, role_id)| state.roles.iter().find(|role| &role.role.role_id == role_id))
            .flat_map(|role| role.grants.iter())
            .filter(|grant| &grant.key == key)
            .map(|grant| grant.allow)
            .collect())
    }

    async fn list_grants_for_user(&self, _user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl AuditRepository for FakeAccessStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.audit.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for FakeAccessStore {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .state
            .lock()
            .await
            .audit
            .iter()
            .rev()
            .take(query.limit)
            .enumerate()
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                subject: event.subject.clone(),
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: String::new(),
            })
            .collect())
    }
}

fn build_service(store: Arc<FakeAccessStore>) -> SecurityAdminService {
    let authorization_service = AuthorizationService::new(store.clone(), store.clone());
    SecurityAdminService::new(
        authorization_service,
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
    )
}

fn actor(user_id: UserId) -> UserIdentity {
    UserIdentity::new(user_id, "Actor", "actor@tripcover.test")
}

async fn seeded_store(admin: UserId, customer: UserId) -> Arc<FakeAccessStore> {
    let mut store = FakeAccessStore::default();
    for value in [
        "roles:READ",
        "roles:CREATE",
        "roles:UPDATE",
        "roles:DELETE",
        "users:READ",
        "users:UPDATE",
        "permissions:READ",
        "permissions:UPDATE",
        "logs:READ",
        "orders:DELETE",
    ] {
        store = store.with_permission(value).await;
    }

    let admin_grants = [
        ("roles:READ", true),
        ("roles:CREATE", true),
        ("roles:UPDATE", true),
        ("roles:DELETE", true),
        ("users:READ", true),
        ("users:UPDATE", true),
        ("permissions:READ", true),
        ("permissions:UPDATE", true),
        ("logs:READ", true),
        ("orders:DELETE", true),
    ];

    let store = store
        .with_role("Admin", true, &admin_grants)
        .await
        .with_role("Customer", true, &[])
        .await
        .with_user(admin, "admin@tripcover.test", &["Admin"])
        .await
        .with_user(customer, "traveler@tripcover.test", &["Customer"])
        .await;

    Arc::new(store)
}

#[tokio::test]
async fn system_roles_cannot_be_deleted() {
    let admin = UserId::new();
    let store = seeded_store(admin, UserId::new()).await;
    let service = build_service(store.clone());

    let result = service.delete_role(&actor(admin), "Customer").await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(
        store
            .find_role_by_name("Customer")
            .await
            .unwrap_or_default()
            .is_some()
    );
    assert!(store.audit_actions().await.is_empty());
}

#[tokio::test]
async fn custom_roles_can_be_created_and_deleted_with_audit() {
    let admin = UserId::new();
    let store = seeded_store(admin, UserId::new()).await;
    let service = build_service(store.clone());

    let created = service
        .create_role(
            &actor(admin),
            CreateRoleInput {
                name: " Claims Agent ".to_owned(),
                description: "Handles claims".to_owned(),
                grants: vec![RoleGrantInput {
                    key: key("orders:DELETE"),
                    allow: false,
                }],
            },
        )
        .await;
    assert!(matches!(&created, Ok(role) if role.role.name == "Claims Agent" && !role.role.is_system));

    let deleted = service.delete_role(&actor(admin), "Claims Agent").await;
    assert!(deleted.is_ok());
    assert_eq!(
        store.audit_actions().await,
        vec![
            AuditAction::SecurityRoleCreated,
            AuditAction::SecurityRoleDeleted
        ]
    );
}

#[tokio::test]
async fn create_role_rejects_reserved_and_uncataloged_input() {
    let admin = UserId::new();
    let store = seeded_store(admin, UserId::new()).await;
    let service = build_service(store);

    let reserved = service
        .create_role(
            &actor(admin),
            CreateRoleInput {
                name: "manager".to_owned(),
                description: String::new(),
                grants: Vec::new(),
            },
        )
        .await;
    assert!(matches!(reserved, Err(AppError::Conflict(_))));

    let uncataloged = service
        .create_role(
            &actor(admin),
            CreateRoleInput {
                name: "Auditor".to_owned(),
                description: String::new(),
                grants: vec![RoleGrantInput {
                    key: key("reports:READ"),
                    allow: true,
                }],
            },
        )
        .await;
    assert!(matches!(uncataloged, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn customers_cannot_administer_roles() {
    let customer = UserId::new();
    let store = seeded_store(UserId::new(), customer).await;
    let service = build_service(store.clone());

    let listed = service.list_roles(&actor(customer)).await;
    assert!(matches!(listed, Err(AppError::Forbidden(_))));

    let deleted = service.delete_role(&actor(customer), "Admin").await;
    assert!(matches!(deleted, Err(AppError::Forbidden(_))));
    assert!(store.audit_actions().await.is_empty());
}

#[tokio::test]
async fn user_override_changes_effective_access() {
    let admin = UserId::new();
    let customer = UserId::new();
    let store = seeded_store(admin, customer).await;
    let service = build_service(store.clone());
    let authorization = AuthorizationService::new(store.clone(), store.clone());
    let target = key("orders:DELETE");

    assert!(!authorization
        .has_permission(customer, &target)
        .await
        .unwrap_or(true));

    let outcome = service
        .set_user_permission(&actor(admin), customer, &target, true)
        .await;
    assert!(matches!(outcome, Ok(UpsertOutcome::Created)));
    assert!(authorization
        .has_permission(customer, &target)
        .await
        .unwrap_or(false));

    let overrides = service
        .list_user_permissions(&actor(admin), customer)
        .await
        .unwrap_or_default();
    assert_eq!(overrides.len(), 1);
    assert!(overrides[0].allow);

    let removed = service
        .remove_user_permission(&actor(admin), customer, &target)
        .await;
    assert!(removed.is_ok());
    assert!(!authorization
        .has_permission(customer, &target)
        .await
        .unwrap_or(true));
}

#[tokio::test]
async fn role_deny_binding_overrides_other_role_allow() {
    let admin = UserId::new();
    let store = seeded_store(admin, UserId::new()).await;
    let service = build_service(store.clone());
    let target = key("orders:DELETE");

    let created = service
        .create_role(
            &actor(admin),
            CreateRoleInput {
                name: "Restricted".to_owned(),
                description: String::new(),
                grants: Vec::new(),
            },
        )
        .await;
    assert!(created.is_ok());

    let set = service
        .set_role_permission(&actor(admin), "Restricted", &target, false)
        .await;
    assert!(matches!(set, Ok(UpsertOutcome::Created)));

    let assigned = service.assign_role(&actor(admin), admin, "Restricted").await;
    assert!(assigned.is_ok());

    let authorization = AuthorizationService::new(store.clone(), store.clone());
    assert!(!authorization
        .has_permission(admin, &target)
        .await
        .unwrap_or(true));

    let roles = service
        .list_user_roles(&actor(admin), admin)
        .await
        .unwrap_or_default();
    assert_eq!(roles.len(), 2);
}

#[tokio::test]
async fn assignment_to_unknown_role_is_not_found() {
    let admin = UserId::new();
    let customer = UserId::new();
    let store = seeded_store(admin, customer).await;
    let service = build_service(store);

    let result = service.assign_role(&actor(admin), customer, "Ghost").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let unknown_user = service.assign_role(&actor(admin), UserId::new(), "Customer").await;
    assert!(matches!(unknown_user, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn permission_description_updates_are_validated_and_audited() {
    let admin = UserId::new();
    let store = seeded_store(admin, UserId::new()).await;
    let service = build_service(store.clone());
    let target = key("orders:DELETE");

    let blank = service
        .update_permission_description(&actor(admin), &target, "   ")
        .await;
    assert!(matches!(blank, Err(AppError::Validation(_))));

    let updated = service
        .update_permission_description(&actor(admin), &target, "Allows cancelling orders")
        .await;
    assert!(matches!(&updated, Ok(permission) if permission.description == "Allows cancelling orders"));

    let entries = service
        .list_audit_log(
            &actor(admin),
            AuditLogQuery {
                limit: 0,
                offset: 0,
                action: None,
                subject: None,
            },
        )
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::SecurityPermissionUpdated.as_str());
    assert_eq!(entries[0].subject, admin.to_string());
}

#[tokio::test]
async fn listing_permissions_requires_read_access() {
    let admin = UserId::new();
    let customer = UserId::new();
    let store = seeded_store(admin, customer).await;
    let service = build_service(store);

    let listed = service.list_permissions(&actor(admin)).await;
    assert!(matches!(&listed, Ok(permissions) if permissions.len() == 10));
    assert!(listed
        .unwrap_or_default()
        .iter()
        .any(|permission| permission.key.action() == Action::Delete));

    let denied = service.list_permissions(&actor(customer)).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}
