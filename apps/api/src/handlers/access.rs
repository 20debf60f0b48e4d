use axum::Json;
use axum::extract::{Extension, Query, State};
use tripcover_core::UserIdentity;
use tripcover_domain::PermissionKey;

use crate::dto::{
    AccessCheckQuery, AccessCheckResponse, CurrentAccessResponse, EffectivePermissionResponse,
    UserIdentityResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves one (resource, action) pair for the caller.
///
/// Well-formed keys outside the catalog resolve to a deny rather than an error.
pub async fn check_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AccessCheckQuery>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let key = PermissionKey::parse(query.resource.trim(), query.action.trim())?;
    let resolution = state
        .authorization_service
        .resolve(user.user_id(), &key)
        .await?;

    Ok(Json(AccessCheckResponse::new(&key, resolution)))
}

pub async fn current_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<CurrentAccessResponse>> {
    let permissions = state
        .authorization_service
        .effective_permissions(user.user_id())
        .await?
        .into_iter()
        .map(EffectivePermissionResponse::from)
        .collect();

    Ok(Json(CurrentAccessResponse {
        user: UserIdentityResponse::from(&user),
        permissions,
    }))
}
