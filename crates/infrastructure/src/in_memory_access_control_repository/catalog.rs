use async_trait::async_trait;

use tripcover_application::{
    CreateRoleInput, PermissionCatalogRepository, RoleRepository, UpsertPermissionInput,
    UpsertRoleInput, Upserted,
};

use super::*;

#[async_trait]
impl PermissionCatalogRepository for InMemoryAccessControlRepository {
    async fn upsert_permission(
        &self,
        input: UpsertPermissionInput,
    ) -> AppResult<Upserted<PermissionRecord>> {
        let mut state = self.state.write().await;
        let existed = state.permissions.contains_key(&input.key);
        let record = state
            .permissions
            .entry(input.key.clone())
            .or_insert_with(|| PermissionRecord {
                permission_id: new_id(),
                key: input.key,
                description: String::new(),
            });
        record.description = input.description;

        Ok(Upserted {
            record: record.clone(),
            outcome: upsert_outcome(existed),
        })
    }

    async fn find_permission(&self, key: &PermissionKey) -> AppResult<Option<PermissionRecord>> {
        Ok(self.state.read().await.permissions.get(key).cloned())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .cloned()
            .collect())
    }

    async fn count_permissions(&self) -> AppResult<u64> {
        Ok(self.state.read().await.permissions.len() as u64)
    }

    async fn update_permission_description(
        &self,
        key: &PermissionKey,
        description: &str,
    ) -> AppResult<PermissionRecord> {
        let mut state = self.state.write().await;
        let record = state
            .permissions
            .get_mut(key)
            .ok_or_else(|| AppError::NotFound(format!("permission '{key}' was not found")))?;
        record.description = description.to_owned();
        Ok(record.clone())
    }
}

#[async_trait]
impl RoleRepository for InMemoryAccessControlRepository {
    async fn upsert_role(&self, input: UpsertRoleInput) -> AppResult<Upserted<RoleRecord>> {
        let mut state = self.state.write().await;
        let existed = state.roles.contains_key(&input.name);
        let record = state
            .roles
            .entry(input.name.clone())
            .or_insert_with(|| RoleRecord {
                role_id: new_id(),
                name: input.name,
                description: String::new(),
                is_system: false,
            });
        record.description = input.description;
        record.is_system = input.is_system;

        Ok(Upserted {
            record: record.clone(),
            outcome: upsert_outcome(existed),
        })
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        if state.roles.contains_key(&input.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let mut bindings = Vec::with_capacity(input.grants.len());
        for grant in &input.grants {
            let permission_id = state
                .permission_id(&grant.key)
                .ok_or_else(|| AppError::NotFound(format!("permission '{}' was not found", grant.key)))?;
            bindings.push((permission_id.to_owned(), grant.allow));
        }

        let role = RoleRecord {
            role_id: new_id(),
            name: input.name.clone(),
            description: input.description,
            is_system: false,
        };
        for (permission_id, allow) in bindings {
            state
                .role_bindings
                .insert((role.role_id.clone(), permission_id), allow);
        }
        state.roles.insert(input.name, role.clone());

        Ok(state.role_definition(&role))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .get(name)
            .map(|role| state.role_definition(role)))
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .values()
            .map(|role| state.role_definition(role))
            .collect())
    }

    async fn update_role_description(
        &self,
        name: &str,
        description: &str,
    ) -> AppResult<RoleRecord> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .get_mut(name)
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' was not found")))?;
        role.description = description.to_owned();
        Ok(role.clone())
    }

    async fn delete_role(&self, name: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .get(name)
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' was not found")))?;

        if role.is_system {
            return Err(AppError::Conflict(format!(
                "system role '{name}' cannot be deleted"
            )));
        }

        let role_id = role.role_id.clone();
        state.roles.remove(name);
        state.remove_role_rows(role_id.as_str());
        Ok(())
    }

    async fn count_roles(&self) -> AppResult<u64> {
        Ok(self.state.read().await.roles.len() as u64)
    }

    async fn upsert_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
        allow: bool,
    ) -> AppResult<UpsertOutcome> {
        let mut state = self.state.write().await;
        state.role_by_id(role_id)?;
        state.permission_by_id(permission_id)?;

        let previous = state
            .role_bindings
            .insert((role_id.to_owned(), permission_id.to_owned()), allow);
        Ok(upsert_outcome(previous.is_some()))
    }

    async fn remove_role_permission(&self, role_id: &str, permission_id: &str) -> AppResult<()> {
        self.state
            .write()
            .await
            .role_bindings
            .remove(&(role_id.to_owned(), permission_id.to_owned()))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!("binding '{role_id}:{permission_id}' was not found"))
            })
    }

    async fn count_role_permissions(&self) -> AppResult<u64> {
        Ok(self.state.read().await.role_bindings.len() as u64)
    }
}
