use super::*;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .security_admin_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((resource, action)): Path<(String, String)>,
    Json(payload): Json<UpdateDescriptionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let key = PermissionKey::parse(resource.as_str(), action.as_str())?;
    let permission = state
        .security_admin_service
        .update_permission_description(&user, &key, payload.description.as_str())
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}
