use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use tripcover_core::{AppError, AppResult, UserId};
use tripcover_domain::PermissionKey;

use crate::{AuthorizationRepository, PermissionCatalogRepository};

mod resolution;


pub use resolution::{AccessResolution, DecisionSource};

use resolution::decide;

/// Effective permission of one catalog entry for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermission {
    /// Catalog key.
    pub key: PermissionKey,
    /// Resolved decision and its origin.
    pub resolution: AccessResolution,
}

/// Effective permission resolver.
///
/// Direct user overrides win over role bindings, an explicit role deny wins over
/// any role allow, and everything else fails closed.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    catalog_repository: Arc<dyn PermissionCatalogRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        catalog_repository: Arc<dyn PermissionCatalogRepository>,
    ) -> Self {
        Self {
            repository,
            catalog_repository,
        }
    }

    /// Resolves the decision for a user and a (resource, action) pair.
    pub async fn resolve(&self, user_id: UserId, key: &PermissionKey) -> AppResult<AccessResolution> {
        if !self.repository.permission_exists(key).await? {
            debug!(%user_id, permission = %key, "denying uncatalogued permission");
            return Ok(AccessResolution::deny(DecisionSource::UnknownPermission));
        }

        let user_override = self
            .repository
            .find_user_permission_override(user_id, key)
            .await?;

        let role_decisions = if user_override.is_some() {
            Vec::new()
        } else {
            self.repository
                .list_role_decisions_for_user(user_id, key)
                .await?
        };

        let resolution = decide(user_override, role_decisions.as_slice());
        debug!(
            %user_id,
            permission = %key,
            decision = resolution.decision.as_str(),
            source = resolution.source.as_str(),
            "resolved permission"
        );

        Ok(resolution)
    }

    /// Ensures the user is allowed the permission, returning `Forbidden` otherwise.
    pub async fn require_permission(&self, user_id: UserId, key: &PermissionKey) -> AppResult<()> {
        let resolution = self.resolve(user_id, key).await?;
        if resolution.decision.is_allowed() {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is not allowed '{key}'"
        )))
    }

    /// Returns whether the user is currently allowed the permission.
    pub async fn has_permission(&self, user_id: UserId, key: &PermissionKey) -> AppResult<bool> {
        Ok(self.resolve(user_id, key).await?.decision.is_allowed())
    }

    /// Resolves every cataloged permission for the user.
    pub async fn effective_permissions(&self, user_id: UserId) -> AppResult<Vec<EffectivePermission>> {
        let catalog = self.catalog_repository.list_permissions().await?;
        let grants = self.repository.list_grants_for_user(user_id).await?;

        let mut overrides: HashMap<PermissionKey, bool> = HashMap::new();
        let mut role_decisions: HashMap<PermissionKey, Vec<bool>> = HashMap::new();
        for grant in grants {
            match grant.via_role {
                Some(_) => role_decisions.entry(grant.key).or_default().push(grant.allow),
                None => {
                    overrides.insert(grant.key, grant.allow);
                }
            }
        }

        Ok(catalog
            .into_iter()
            .map(|permission| {
                let resolution = decide(
                    overrides.get(&permission.key).copied(),
                    role_decisions
                        .get(&permission.key)
                        .map(Vec::as_slice)
                        .unwrap_or_default(),
                );

                EffectivePermission {
                    key: permission.key,
                    resolution,
                }
            })
            .collect())
    }
}
