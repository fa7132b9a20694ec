use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use page_core::{
    faq::TOGGLE_SELECTOR,
    validate_form::{EMAIL_INPUT_ID, FORM_ID, RESULT_ID},
    Document, Fetch, HttpFetch,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Loads the home page from a running server, submits one address through
/// its form and prints what the page shows.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,
    #[arg(long)]
    email: String,
    /// Also expand every FAQ entry and print the questions.
    #[arg(long)]
    faq: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    let fetch = Arc::new(HttpFetch::new(&args.server_url)?);
    let home = fetch.get("/").await.context("failed to load home page")?;
    if home.status != 200 {
        bail!("home page answered with status {}", home.status);
    }
    let html = String::from_utf8(home.body).context("home page is not UTF-8")?;
    let document = Document::parse(&html).context("home page markup is malformed")?;

    let bindings = page_core::init(&document, fetch);
    info!(?bindings, "page loaded");
    if !bindings.validation_form {
        bail!("home page has no #{FORM_ID} form");
    }

    if args.faq {
        for control in document.query_selector_all(TOGGLE_SELECTOR) {
            control.click().settle().await;
            println!("faq: {}", control.text_content().trim());
        }
    }

    let input = document
        .get_element_by_id(EMAIL_INPUT_ID)
        .with_context(|| format!("home page has no #{EMAIL_INPUT_ID} input"))?;
    input.set_value(&args.email);

    let form = document
        .get_element_by_id(FORM_ID)
        .with_context(|| format!("home page has no #{FORM_ID} form"))?;
    form.request_submit().settle().await;

    let result = document
        .get_element_by_id(RESULT_ID)
        .map(|element| element.text_content())
        .unwrap_or_default();
    if result.is_empty() {
        bail!("validation request did not produce a result; see logs");
    }
    println!("{}: {result}", args.email);
    Ok(())
}
