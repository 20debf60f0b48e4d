use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tracing::info;
use tripcover_core::UserIdentity;

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::state::AppState;

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Extension(token): Extension<SessionToken>,
) -> ApiResult<StatusCode> {
    state.session_service.revoke_session(token.0.as_str()).await?;
    info!(user_id = %user.user_id(), "session revoked");

    Ok(StatusCode::NO_CONTENT)
}
