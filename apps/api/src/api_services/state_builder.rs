use std::sync::Arc;

use sqlx::PgPool;
use tripcover_application::{
    AuditLogRepository, AuditRepository, AuthorizationRepository, AuthorizationService,
    PermissionCatalogRepository, RoleRepository, SecurityAdminService, SessionRepository,
    SessionService, UserAccessRepository,
};
use tripcover_infrastructure::{
    PostgresAccessControlRepository, PostgresAuditLogRepository, PostgresAuditRepository,
    PostgresSessionRepository,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

struct RepositorySet {
    catalog_repository: Arc<dyn PermissionCatalogRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserAccessRepository>,
    authorization_repository: Arc<dyn AuthorizationRepository>,
    session_repository: Arc<dyn SessionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let access_control = Arc::new(PostgresAccessControlRepository::new(pool.clone()));
    let repositories = RepositorySet {
        catalog_repository: access_control.clone(),
        role_repository: access_control.clone(),
        user_repository: access_control.clone(),
        authorization_repository: access_control,
        session_repository: Arc::new(PostgresSessionRepository::new(pool.clone())),
        audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        audit_log_repository: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
    };

    assemble(repositories, config.session_ttl, Some(pool))
}

/// Builds state over one in-memory repository, optionally swapping the
/// resolver's backing store.
#[cfg(test)]
pub fn build_in_memory_state(
    repository: Arc<tripcover_infrastructure::InMemoryAccessControlRepository>,
    authorization_repository: Option<Arc<dyn AuthorizationRepository>>,
) -> AppState {
    let repositories = RepositorySet {
        catalog_repository: repository.clone(),
        role_repository: repository.clone(),
        user_repository: repository.clone(),
        authorization_repository: authorization_repository.unwrap_or_else(|| repository.clone()),
        session_repository: repository.clone(),
        audit_repository: repository.clone(),
        audit_log_repository: repository,
    };

    assemble(repositories, chrono::Duration::minutes(5), None)
}

fn assemble(
    repositories: RepositorySet,
    session_ttl: chrono::Duration,
    postgres_pool: Option<PgPool>,
) -> AppState {
    let authorization_service = AuthorizationService::new(
        repositories.authorization_repository,
        repositories.catalog_repository.clone(),
    );
    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        repositories.catalog_repository,
        repositories.role_repository,
        repositories.user_repository.clone(),
        repositories.audit_repository,
        repositories.audit_log_repository,
    );
    let session_service = SessionService::new(
        repositories.session_repository,
        repositories.user_repository,
        session_ttl,
    );

    AppState {
        authorization_service,
        security_admin_service,
        session_service,
        postgres_pool,
    }
}
