use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::FaqItem;
use tracing::warn;
use validation::{disposable::DEFAULT_DISPOSABLE_URL, mx::DEFAULT_MX_CACHE_CAPACITY};

pub const DEFAULT_MAX_BULK_EMAILS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    /// Empty disables the remote list; no domain is then disposable.
    pub disposable_url: String,
    pub faq_path: String,
    pub mx_cache_capacity: u64,
    pub max_bulk_emails: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            disposable_url: DEFAULT_DISPOSABLE_URL.into(),
            faq_path: "faq.json".into(),
            mx_cache_capacity: DEFAULT_MX_CACHE_CAPACITY,
            max_bulk_emails: DEFAULT_MAX_BULK_EMAILS,
        }
    }
}

/// Defaults, then `server.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

/// Flat `key = "value"` pairs. Unknown keys and unparseable numbers are
/// ignored.
pub(crate) fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(error) => {
            warn!(%error, "ignoring malformed server.toml");
            return;
        }
    };

    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("disposable_url") {
        settings.disposable_url = v.clone();
    }
    if let Some(v) = file_cfg.get("faq_path") {
        settings.faq_path = v.clone();
    }
    if let Some(parsed) = file_cfg.get("mx_cache_capacity").and_then(|v| v.parse().ok()) {
        settings.mx_cache_capacity = parsed;
    }
    if let Some(parsed) = file_cfg.get("max_bulk_emails").and_then(|v| v.parse().ok()) {
        settings.max_bulk_emails = parsed;
    }
}

pub(crate) fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("APP__DISPOSABLE_URL") {
        settings.disposable_url = v;
    }

    if let Some(v) = var("APP__FAQ_PATH") {
        settings.faq_path = v;
    }

    if let Some(v) = var("APP__MX_CACHE_CAPACITY") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.mx_cache_capacity = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__MX_CACHE_CAPACITY"),
        }
    }

    if let Some(v) = var("APP__MAX_BULK_EMAILS") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.max_bulk_emails = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__MAX_BULK_EMAILS"),
        }
    }
}

/// Reads the FAQ entries: a JSON array of `{question, answer}` objects.
pub fn load_faq(path: impl AsRef<Path>) -> anyhow::Result<Vec<FaqItem>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read FAQ file '{}'", path.display()))?;
    let items = serde_json::from_str(&raw)
        .with_context(|| format!("FAQ file '{}' is not a list of entries", path.display()))?;
    Ok(items)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
