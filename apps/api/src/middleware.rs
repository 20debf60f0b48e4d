use axum::extract::{Extension, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, warn};
use tripcover_core::{AppError, UserIdentity};
use tripcover_domain::{Action, PermissionKey, ResourceName};

use crate::error::ApiResult;
use crate::state::AppState;

/// Raw bearer token presented with the current request.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Permission a route group demands before its handlers run.
#[derive(Debug, Clone, Copy)]
pub struct RequiredPermission {
    resource: &'static str,
    action: Action,
}

impl RequiredPermission {
    pub const fn new(resource: &'static str, action: Action) -> Self {
        Self { resource, action }
    }

    fn key(&self) -> Result<PermissionKey, AppError> {
        Ok(PermissionKey::new(ResourceName::new(self.resource)?, self.action))
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?
        .to_owned();

    let identity = state.session_service.authenticate(token.as_str()).await?;

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}

/// Lets the request through only when the resolver allows the route's permission.
///
/// Resolver failures surface as 500 and never reach the handler.
pub async fn require_permission(
    State(state): State<AppState>,
    Extension(required): Extension<RequiredPermission>,
    Extension(user): Extension<UserIdentity>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let key = required.key()?;

    let resolution = state
        .authorization_service
        .resolve(user.user_id(), &key)
        .await
        .map_err(|failure| {
            error!(user_id = %user.user_id(), permission = %key, %failure, "permission check failed");
            AppError::Internal("permission check failed".to_owned())
        })?;

    if !resolution.decision.is_allowed() {
        warn!(
            user_id = %user.user_id(),
            permission = %key,
            source = resolution.source.as_str(),
            "permission denied"
        );
        return Err(AppError::Forbidden(format!(
            "user '{}' is not allowed '{key}'",
            user.user_id()
        ))
        .into());
    }

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
