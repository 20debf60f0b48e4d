use super::*;

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let user_id = UserId::from_str(user_id.as_str())?;
    let assignments = state
        .security_admin_service
        .list_user_roles(&user, user_id)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_name)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::from_str(user_id.as_str())?;
    state
        .security_admin_service
        .assign_role(&user, user_id, role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_name)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::from_str(user_id.as_str())?;
    state
        .security_admin_service
        .unassign_role(&user, user_id, role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<UserPermissionResponse>>> {
    let user_id = UserId::from_str(user_id.as_str())?;
    let overrides = state
        .security_admin_service
        .list_user_permissions(&user, user_id)
        .await?
        .into_iter()
        .map(UserPermissionResponse::from)
        .collect();

    Ok(Json(overrides))
}

pub async fn set_user_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, resource, action)): Path<(String, String, String)>,
    Json(payload): Json<SetPermissionRequest>,
) -> ApiResult<(StatusCode, Json<UpsertResultResponse>)> {
    let user_id = UserId::from_str(user_id.as_str())?;
    let key = PermissionKey::parse(resource.as_str(), action.as_str())?;
    let outcome = state
        .security_admin_service
        .set_user_permission(&user, user_id, &key, payload.allow)
        .await?;

    Ok(upsert_response(outcome))
}

pub async fn remove_user_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, resource, action)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::from_str(user_id.as_str())?;
    let key = PermissionKey::parse(resource.as_str(), action.as_str())?;
    state
        .security_admin_service
        .remove_user_permission(&user, user_id, &key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
