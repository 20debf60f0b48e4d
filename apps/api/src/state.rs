use sqlx::PgPool;
use tripcover_application::{AuthorizationService, SecurityAdminService, SessionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub security_admin_service: SecurityAdminService,
    pub session_service: SessionService,
    /// `None` when the state is backed by in-memory repositories.
    pub postgres_pool: Option<PgPool>,
}
