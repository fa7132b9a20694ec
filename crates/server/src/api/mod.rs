use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Datelike, Utc};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{BulkEmailRequest, EmailRequest, EmailResponse},
};
use tracing::{info, warn};

use crate::{app_state::AppState, home::render_home};

const PAGE_SCRIPT: &str = include_str!("../../static/js/main.js");

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_home(&state.faq_items, Utc::now().year()))
}

/// Browser-side FAQ toggles and form handler referenced by the home page.
pub async fn page_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        PAGE_SCRIPT,
    )
}

/// Verdict for the page's form. Always 200; a rejected address comes back
/// with `is_valid: false` and the reason.
pub async fn validate_path(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Json<EmailResponse> {
    Json(state.validator.verdict(&email).await)
}

pub async fn validate_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<EmailResponse> {
    state.validator.validate(&req.email).await.map(Json).map_err(|reason| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, reason.to_string())),
        )
    })
}

pub async fn check_disposable(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Json<EmailResponse> {
    Json(state.validator.check_disposable(&req.email).await)
}

pub async fn check_mx_record(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Json<EmailResponse> {
    Json(state.validator.check_mx_record(&req.email).await)
}

pub async fn bulk_validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkEmailRequest>,
) -> ApiResult<Vec<EmailResponse>> {
    check_bulk_size(req.email.len(), state.max_bulk_emails).map_err(|error| {
        warn!(count = req.email.len(), "bulk request over limit");
        (StatusCode::BAD_REQUEST, Json(error))
    })?;

    let responses = state.validator.validate_bulk(&req.email).await;
    let valid = responses.iter().filter(|r| r.is_valid).count();
    info!(count = responses.len(), valid, "bulk validation finished");
    Ok(Json(responses))
}

pub async fn not_found() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, "route not found")),
    )
}

pub(crate) fn check_bulk_size(count: usize, max: usize) -> Result<(), ApiError> {
    if count > max {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("Maximum {max} emails allowed per request"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
