use async_trait::async_trait;

use tripcover_application::{
    AuthorizationRepository, PermissionGrant, Upserted, UserAccessRepository,
    UserPermissionOverride, UserRoleAssignment,
};

use super::*;

#[async_trait]
impl UserAccessRepository for InMemoryAccessControlRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn upsert_user(&self, email: &str, display_name: &str) -> AppResult<Upserted<UserRecord>> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.values_mut().find(|user| user.email == email) {
            user.display_name = display_name.to_owned();
            return Ok(Upserted {
                record: user.clone(),
                outcome: UpsertOutcome::Updated,
            });
        }

        let user = UserRecord {
            user_id: UserId::new(),
            email: email.to_owned(),
            display_name: display_name.to_owned(),
        };
        state.users.insert(user.user_id, user.clone());
        Ok(Upserted {
            record: user,
            outcome: UpsertOutcome::Created,
        })
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }
        state.role_by_id(role_id)?;

        state
            .user_roles
            .entry((user_id, role_id.to_owned()))
            .or_insert_with(Utc::now);
        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: &str) -> AppResult<()> {
        self.state
            .write()
            .await
            .user_roles
            .remove(&(user_id, role_id.to_owned()))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!("role assignment '{user_id}:{role_id}' was not found"))
            })
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let state = self.state.read().await;
        let mut assignments = state
            .user_roles
            .iter()
            .filter(|((assigned_user, _), _)| *assigned_user == user_id)
            .map(|((_, role_id), assigned_at)| {
                let role = state.role_by_id(role_id)?;
                Ok(UserRoleAssignment {
                    user_id,
                    role_id: role_id.clone(),
                    role_name: role.name.clone(),
                    assigned_at: assigned_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        assignments.sort_by(|left, right| left.role_name.cmp(&right.role_name));
        Ok(assignments)
    }

    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }
        state.permission_by_id(permission_id)?;

        let previous = state
            .user_overrides
            .insert((user_id, permission_id.to_owned()), allow);
        Ok(upsert_outcome(previous.is_some()))
    }

    async fn remove_user_permission(&self, user_id: UserId, permission_id: &str) -> AppResult<()> {
        self.state
            .write()
            .await
            .user_overrides
            .remove(&(user_id, permission_id.to_owned()))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!("override '{user_id}:{permission_id}' was not found"))
            })
    }

    async fn list_user_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let state = self.state.read().await;
        let mut overrides = state
            .user_overrides
            .iter()
            .filter(|((overridden_user, _), _)| *overridden_user == user_id)
            .map(|((_, permission_id), allow)| {
                let permission = state.permission_by_id(permission_id)?;
                Ok(UserPermissionOverride {
                    permission_id: permission_id.clone(),
                    key: permission.key.clone(),
                    allow: *allow,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        overrides.sort_by(|left, right| left.key.cmp(&right.key));
        Ok(overrides)
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAccessControlRepository {
    async fn permission_exists(&self, key: &PermissionKey) -> AppResult<bool> {
        Ok(self.state.read().await.permissions.contains_key(key))
    }

    async fn find_user_permission_override(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Option<bool>> {
        let state = self.state.read().await;
        Ok(state.permission_id(key).and_then(|permission_id| {
            state
                .user_overrides
                .get(&(user_id, permission_id.to_owned()))
                .copied()
        }))
    }

    async fn list_role_decisions_for_user(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<Vec<bool>> {
        let state = self.state.read().await;
        let Some(permission_id) = state.permission_id(key) else {
            return Ok(Vec::new());
        };

        Ok(state
            .role_ids_for_user(user_id)
            .filter_map(|role_id| {
                state
                    .role_bindings
                    .get(&(role_id.clone(), permission_id.to_owned()))
                    .copied()
            })
            .collect())
    }

    async fn list_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        let state = self.state.read().await;
        let mut grants = Vec::new();

        for ((overridden_user, permission_id), allow) in &state.user_overrides {
            if *overridden_user != user_id {
                continue;
            }
            grants.push(PermissionGrant {
                key: state.permission_by_id(permission_id)?.key.clone(),
                allow: *allow,
                via_role: None,
            });
        }

        for role_id in state.role_ids_for_user(user_id) {
            let role = state.role_by_id(role_id)?;
            for ((bound_role, permission_id), allow) in &state.role_bindings {
                if bound_role != role_id {
                    continue;
                }
                grants.push(PermissionGrant {
                    key: state.permission_by_id(permission_id)?.key.clone(),
                    allow: *allow,
                    via_role: Some(role.name.clone()),
                });
            }
        }

        Ok(grants)
    }
}
