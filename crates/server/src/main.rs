use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use server::{
    app_state::AppState,
    build_router, build_validator,
    config::{load_faq, load_settings},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let faq_items = load_faq(&settings.faq_path).unwrap_or_else(|error| {
        warn!(error = %format!("{error:#}"), "serving home page without FAQ entries");
        Vec::new()
    });

    let validator = build_validator(&settings)?;
    // Prefetch; a failure here is retried on first lookup.
    validator.disposable_domains().refresh().await;

    let state = AppState {
        validator,
        faq_items: Arc::new(faq_items),
        max_bulk_emails: settings.max_bulk_emails,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
