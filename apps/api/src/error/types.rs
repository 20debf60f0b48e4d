use axum::http::StatusCode;
use serde::Serialize;
use ts_rs::TS;

/// Body returned with every non-2xx Tripcover API response.
///
/// `status` repeats the HTTP status code so clients that only keep the JSON
/// body can still branch on it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    status: u16,
    message: String,
}

impl ErrorResponse {
    pub(super) fn for_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}
