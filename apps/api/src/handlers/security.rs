use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use tripcover_application::{CreateRoleInput, RoleGrantInput, UpsertOutcome};
use tripcover_core::{UserId, UserIdentity};
use tripcover_domain::PermissionKey;

use crate::dto::{
    AuditLogEntryResponse, AuditLogQueryRequest, CreateRoleRequest, PermissionResponse,
    RoleAssignmentResponse, RoleResponse, SetPermissionRequest, UpdateDescriptionRequest,
    UpsertResultResponse, UserPermissionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod audit;
mod permissions;
mod roles;
mod users;

pub use audit::list_audit_log_handler;
pub use permissions::{list_permissions_handler, update_permission_handler};
pub use roles::{
    create_role_handler, delete_role_handler, get_role_handler, list_roles_handler,
    remove_role_permission_handler, set_role_permission_handler, update_role_handler,
};
pub use users::{
    assign_user_role_handler, list_user_permissions_handler, list_user_roles_handler,
    remove_user_permission_handler, set_user_permission_handler, unassign_user_role_handler,
};

fn upsert_response(outcome: UpsertOutcome) -> (StatusCode, Json<UpsertResultResponse>) {
    let status = match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    };

    (status, Json(UpsertResultResponse::from(outcome)))
}
