use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, delete, get, post, put};
use tower_http::trace::TraceLayer;
use tripcover_core::AppError;
use tripcover_domain::Action;

use crate::middleware::{self, RequiredPermission};
use crate::state::AppState;
use crate::handlers;

mod cors;


const PERMISSIONS_READ: RequiredPermission = RequiredPermission::new("permissions", Action::Read);
const PERMISSIONS_UPDATE: RequiredPermission =
    RequiredPermission::new("permissions", Action::Update);
const ROLES_READ: RequiredPermission = RequiredPermission::new("roles", Action::Read);
const ROLES_CREATE: RequiredPermission = RequiredPermission::new("roles", Action::Create);
const ROLES_UPDATE: RequiredPermission = RequiredPermission::new("roles", Action::Update);
const ROLES_DELETE: RequiredPermission = RequiredPermission::new("roles", Action::Delete);
const USERS_READ: RequiredPermission = RequiredPermission::new("users", Action::Read);
const USERS_UPDATE: RequiredPermission = RequiredPermission::new("users", Action::Update);
const LOGS_READ: RequiredPermission = RequiredPermission::new("logs", Action::Read);

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let guard = |route: MethodRouter<AppState>, permission: RequiredPermission| {
        route
            .route_layer(from_fn_with_state(
                app_state.clone(),
                middleware::require_permission,
            ))
            .layer(axum::Extension(permission))
    };

    let security_routes = Router::new()
        .route(
            "/api/security/permissions",
            guard(
                get(handlers::security::list_permissions_handler),
                PERMISSIONS_READ,
            ),
        )
        .route(
            "/api/security/permissions/{resource}/{action}",
            guard(
                put(handlers::security::update_permission_handler),
                PERMISSIONS_UPDATE,
            ),
        )
        .route(
            "/api/security/roles",
            guard(get(handlers::security::list_roles_handler), ROLES_READ).merge(guard(
                post(handlers::security::create_role_handler),
                ROLES_CREATE,
            )),
        )
        .route(
            "/api/security/roles/{role_name}",
            guard(get(handlers::security::get_role_handler), ROLES_READ)
                .merge(guard(
                    put(handlers::security::update_role_handler),
                    ROLES_UPDATE,
                ))
                .merge(guard(
                    delete(handlers::security::delete_role_handler),
                    ROLES_DELETE,
                )),
        )
        .route(
            "/api/security/roles/{role_name}/permissions/{resource}/{action}",
            guard(
                put(handlers::security::set_role_permission_handler)
                    .delete(handlers::security::remove_role_permission_handler),
                ROLES_UPDATE,
            ),
        )
        .route(
            "/api/security/users/{user_id}/roles",
            guard(
                get(handlers::security::list_user_roles_handler),
                USERS_READ,
            ),
        )
        .route(
            "/api/security/users/{user_id}/roles/{role_name}",
            guard(
                put(handlers::security::assign_user_role_handler)
                    .delete(handlers::security::unassign_user_role_handler),
                USERS_UPDATE,
            ),
        )
        .route(
            "/api/security/users/{user_id}/permissions",
            guard(
                get(handlers::security::list_user_permissions_handler),
                USERS_READ,
            ),
        )
        .route(
            "/api/security/users/{user_id}/permissions/{resource}/{action}",
            guard(
                put(handlers::security::set_user_permission_handler)
                    .delete(handlers::security::remove_user_permission_handler),
                USERS_UPDATE,
            ),
        )
        .route(
            "/api/security/audit-log",
            guard(get(handlers::security::list_audit_log_handler), LOGS_READ),
        );

    let protected_routes = Router::new()
        .route(
            "/api/access/check",
            get(handlers::access::check_access_handler),
        )
        .route(
            "/api/access/me",
            get(handlers::access::current_access_handler),
        )
        .route("/auth/logout", post(handlers::auth::logout_handler))
        .merge(security_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
