//! HTTP surface of the email validator: the home page, the validation
//! endpoint its form calls, and the JSON API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use validation::{
    CachedMxResolver, DisposableDomains, DnsMxResolver, EmailValidator, HttpDomainList,
    StaticDomainList,
};

pub mod api;
pub mod app_state;
pub mod config;
pub mod home;

use app_state::AppState;
use config::Settings;

/// Bulk requests top out well under this with the default address limit.
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let v1 = Router::new()
        .route("/validate-email", post(api::validate_email))
        .route("/check-disposable", post(api::check_disposable))
        .route("/check-mx-record", post(api::check_mx_record))
        .route("/bulk-email-validate", post(api::bulk_validate));

    Router::new()
        .route("/healthz", get(api::healthz))
        .route("/", get(api::home))
        .route(home::PAGE_SCRIPT_PATH, get(api::page_script))
        .route("/api/validate/:email", get(api::validate_path))
        .nest("/api/v1", v1)
        .fallback(api::not_found)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Validator backed by the configured disposable list and live DNS.
pub fn build_validator(settings: &Settings) -> anyhow::Result<EmailValidator> {
    let disposable = if settings.disposable_url.trim().is_empty() {
        DisposableDomains::new(StaticDomainList(Vec::new()))
    } else {
        DisposableDomains::new(HttpDomainList::new(settings.disposable_url.clone())?)
    };
    let mx = CachedMxResolver::new(DnsMxResolver::new(), settings.mx_cache_capacity);
    Ok(EmailValidator::new(Arc::new(disposable), Arc::new(mx)))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
