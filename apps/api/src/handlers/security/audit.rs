use super::*;

use tripcover_application::AuditLogQuery;

const DEFAULT_AUDIT_LOG_LIMIT: usize = 50;

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AuditLogQueryRequest>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .security_admin_service
        .list_audit_log(
            &user,
            AuditLogQuery {
                limit: query.limit.unwrap_or(DEFAULT_AUDIT_LOG_LIMIT),
                offset: query.offset.unwrap_or_default(),
                action: non_blank(query.action),
                subject: non_blank(query.subject),
            },
        )
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
