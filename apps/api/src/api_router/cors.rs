use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tripcover_core::AppError;

/// Verbs used by the security admin and access routes.
const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Bearer session tokens travel in `Authorization`, never in cookies.
const ALLOWED_HEADERS: [HeaderName; 2] = [AUTHORIZATION, CONTENT_TYPE];

fn frontend_origin(frontend_url: &str) -> Result<HeaderValue, AppError> {
    let trimmed = frontend_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "FRONTEND_URL must name the storefront origin".to_owned(),
        ));
    }

    HeaderValue::from_str(trimmed).map_err(|error| {
        AppError::Validation(format!(
            "FRONTEND_URL '{frontend_url}' is not a usable origin: {error}"
        ))
    })
}

pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(frontend_origin(frontend_url)?)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS))
}
