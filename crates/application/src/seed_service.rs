//! Idempotent bootstrap of the permission catalog and the system roles.
//!
//! Every write is an upsert keyed by a natural key, so the routine can be
//! re-run against a populated database and resumed after a partial failure.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;
use tripcover_core::{AppError, AppResult};
use tripcover_domain::{PermissionKey, SystemRole, catalog_keys};

use crate::{
    PermissionCatalogRepository, RoleRepository, UpsertOutcome, UpsertPermissionInput,
    UpsertRoleInput, UserAccessRepository, UserRecord,
};

#[cfg(test)]
mod tests;

/// Row counts touched by the permission catalog builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSeedReport {
    /// Newly inserted permissions.
    pub created: usize,
    /// Existing permissions whose description was refreshed.
    pub updated: usize,
    /// Catalog size after the run.
    pub total: u64,
}

/// Row counts touched by the role bootstrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSeedReport {
    /// Newly inserted system roles.
    pub roles_created: usize,
    /// Existing roles refreshed in place.
    pub roles_updated: usize,
    /// Newly inserted role bindings.
    pub bindings_created: usize,
    /// Existing role bindings refreshed in place.
    pub bindings_updated: usize,
}

/// Administrator account ensured at the end of a seed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    /// Login email, used as the natural key.
    pub email: String,
    /// Display name.
    pub display_name: String,
}

/// Summary of a full seed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Catalog step counts.
    pub catalog: CatalogSeedReport,
    /// Role step counts.
    pub roles: RoleSeedReport,
    /// Administrator ensured by the run, if requested.
    pub admin: Option<UserRecord>,
}

/// Application service running the seeding routine.
#[derive(Clone)]
pub struct SeedService {
    catalog_repository: Arc<dyn PermissionCatalogRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserAccessRepository>,
}

impl SeedService {
    /// Creates a new service from required repositories.
    #[must_use]
    pub fn new(
        catalog_repository: Arc<dyn PermissionCatalogRepository>,
        role_repository: Arc<dyn RoleRepository>,
        user_repository: Arc<dyn UserAccessRepository>,
    ) -> Self {
        Self {
            catalog_repository,
            role_repository,
            user_repository,
        }
    }

    /// Runs the catalog builder, then the role bootstrapper, then the optional admin step.
    pub async fn run(&self, admin: Option<SeedAdmin>) -> AppResult<SeedReport> {
        let catalog = self.build_permission_catalog().await?;
        let roles = self.bootstrap_system_roles().await?;

        let admin = match admin {
            Some(admin) => Some(self.bootstrap_admin(admin).await?),
            None => None,
        };

        Ok(SeedReport {
            catalog,
            roles,
            admin,
        })
    }

    /// Ensures exactly one permission row per cataloged (resource, action) pair.
    pub async fn build_permission_catalog(&self) -> AppResult<CatalogSeedReport> {
        let mut report = CatalogSeedReport::default();

        for key in catalog_keys()? {
            let description = key.default_description();
            let upserted = self
                .catalog_repository
                .upsert_permission(UpsertPermissionInput { key, description })
                .await?;

            if upserted.was_created() {
                report.created += 1;
            } else {
                report.updated += 1;
            }
        }

        report.total = self.catalog_repository.count_permissions().await?;
        info!(
            created = report.created,
            updated = report.updated,
            total = report.total,
            "permission catalog seeded"
        );

        Ok(report)
    }

    /// Upserts the system roles and their default allow bindings.
    ///
    /// Fails with `Misconfiguration` unless every cataloged key is stored.
    pub async fn bootstrap_system_roles(&self) -> AppResult<RoleSeedReport> {
        let catalog = self.catalog_repository.list_permissions().await?;
        if catalog.is_empty() {
            return Err(AppError::Misconfiguration(
                "permissions not seeded; build the permission catalog before bootstrapping roles"
                    .to_owned(),
            ));
        }

        let stored: HashSet<&PermissionKey> =
            catalog.iter().map(|permission| &permission.key).collect();
        let missing: Vec<String> = catalog_keys()?
            .into_iter()
            .filter(|key| !stored.contains(key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Misconfiguration(format!(
                "permission catalog is incomplete; missing {}",
                missing.join(", ")
            )));
        }

        let mut report = RoleSeedReport::default();

        for system_role in SystemRole::all() {
            let upserted = self
                .role_repository
                .upsert_role(UpsertRoleInput {
                    name: system_role.name().to_owned(),
                    description: system_role.description().to_owned(),
                    is_system: true,
                })
                .await?;

            if upserted.was_created() {
                report.roles_created += 1;
            } else {
                report.roles_updated += 1;
            }

            let role = upserted.record;
            let mut granted = 0_usize;
            for permission in catalog
                .iter()
                .filter(|permission| system_role.grants(&permission.key))
            {
                let outcome = self
                    .role_repository
                    .upsert_role_permission(
                        role.role_id.as_str(),
                        permission.permission_id.as_str(),
                        true,
                    )
                    .await?;

                match outcome {
                    UpsertOutcome::Created => report.bindings_created += 1,
                    UpsertOutcome::Updated => report.bindings_updated += 1,
                }
                granted += 1;
            }

            info!(role = role.name.as_str(), granted, "system role bootstrapped");
        }

        Ok(report)
    }

    /// Ensures the administrator user exists and holds the Admin role.
    pub async fn bootstrap_admin(&self, admin: SeedAdmin) -> AppResult<UserRecord> {
        let email = admin.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation(format!(
                "seed admin email '{}' is invalid",
                admin.email
            )));
        }

        let admin_role_name = SystemRole::Admin.name();
        let admin_role = self
            .role_repository
            .find_role_by_name(admin_role_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{admin_role_name}' was not found"))
            })?;

        let user = self
            .user_repository
            .upsert_user(email.as_str(), admin.display_name.trim())
            .await?
            .record;

        self.user_repository
            .assign_role_to_user(user.user_id, admin_role.role.role_id.as_str())
            .await?;

        info!(user_id = %user.user_id, email = user.email.as_str(), "seed admin ensured");
        Ok(user)
    }
}
