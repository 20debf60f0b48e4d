use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_name): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .security_admin_service
        .get_role(&user, role_name.as_str())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let grants = payload
        .grants
        .iter()
        .map(|grant| {
            Ok(RoleGrantInput {
                key: PermissionKey::from_str(grant.permission.trim())?,
                allow: grant.allow,
            })
        })
        .collect::<Result<Vec<_>, tripcover_core::AppError>>()?;

    let role = state
        .security_admin_service
        .create_role(
            &user,
            CreateRoleInput {
                name: payload.name,
                description: payload.description,
                grants,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_name): Path<String>,
    Json(payload): Json<UpdateDescriptionRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .update_role_description(&user, role_name.as_str(), payload.description.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .delete_role(&user, role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_name, resource, action)): Path<(String, String, String)>,
    Json(payload): Json<SetPermissionRequest>,
) -> ApiResult<(StatusCode, Json<UpsertResultResponse>)> {
    let key = PermissionKey::parse(resource.as_str(), action.as_str())?;
    let outcome = state
        .security_admin_service
        .set_role_permission(&user, role_name.as_str(), &key, payload.allow)
        .await?;

    Ok(upsert_response(outcome))
}

pub async fn remove_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_name, resource, action)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let key = PermissionKey::parse(resource.as_str(), action.as_str())?;
    state
        .security_admin_service
        .remove_role_permission(&user, role_name.as_str(), &key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
