use std::{collections::HashSet, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Public list of throwaway mail domains, served as a JSON array of strings.
pub const DEFAULT_DISPOSABLE_URL: &str =
    "https://raw.githubusercontent.com/disposable/disposable-email-domains/master/domains.json";

#[async_trait]
pub trait DomainListSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>>;
}

/// Upper bound on one list download. Lookups wait behind a load in flight.
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpDomainList {
    http: Client,
    url: String,
}

impl HttpDomainList {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_LIST_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("failed to build disposable list HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DomainListSource for HttpDomainList {
    async fn fetch(&self) -> Result<Vec<String>> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("failed to fetch disposable domains from {}", self.url))?
            .error_for_status()?;
        let domains: Vec<String> = res
            .json()
            .await
            .context("disposable domain list is not a JSON array of strings")?;
        Ok(domains)
    }
}

/// Fixed list, used when no remote list is configured.
pub struct StaticDomainList(pub Vec<String>);

#[async_trait]
impl DomainListSource for StaticDomainList {
    async fn fetch(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Lazily loaded set of disposable domains.
///
/// The list is fetched on first use. A failed fetch leaves the set unloaded,
/// so lookups answer "not disposable" and the next lookup tries again.
pub struct DisposableDomains {
    source: Box<dyn DomainListSource>,
    domains: RwLock<Option<HashSet<String>>>,
}

impl DisposableDomains {
    pub fn new(source: impl DomainListSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            domains: RwLock::new(None),
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.domains.read().await.is_some()
    }

    pub async fn contains(&self, domain: &str) -> bool {
        let domain = domain.to_ascii_lowercase();
        if let Some(domains) = self.domains.read().await.as_ref() {
            return domains.contains(&domain);
        }

        self.load().await;
        self.domains
            .read()
            .await
            .as_ref()
            .is_some_and(|domains| domains.contains(&domain))
    }

    pub async fn refresh(&self) {
        self.domains.write().await.take();
        self.load().await;
    }

    async fn load(&self) {
        let mut guard = self.domains.write().await;
        if guard.is_some() {
            return;
        }

        match self.source.fetch().await {
            Ok(list) => {
                let domains: HashSet<String> = list
                    .into_iter()
                    .map(|domain| domain.trim().to_ascii_lowercase())
                    .filter(|domain| !domain.is_empty())
                    .collect();
                info!(count = domains.len(), "loaded disposable domain list");
                *guard = Some(domains);
            }
            Err(error) => {
                warn!(error = %format!("{error:#}"), "failed to load disposable domain list");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use anyhow::anyhow;

    use super::*;

    struct FlakySource {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
    }

    #[async_trait]
    impl DomainListSource for FlakySource {
        async fn fetch(&self) -> Result<Vec<String>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(anyhow!("list host unreachable"));
            }
            Ok(vec!["Mailinator.com".to_string(), " trash.test ".to_string()])
        }
    }

    #[tokio::test]
    async fn loads_once_and_matches_case_insensitively() {
        let calls = Arc::new(AtomicUsize::new(0));
        let domains = DisposableDomains::new(FlakySource {
            calls: calls.clone(),
            fail_first: 0,
        });

        assert!(domains.contains("MAILINATOR.COM").await);
        assert!(domains.contains("trash.test").await);
        assert!(!domains.contains("gmail.com").await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_answers_false_and_retries_next_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let domains = DisposableDomains::new(FlakySource {
            calls: calls.clone(),
            fail_first: 1,
        });

        assert!(!domains.contains("mailinator.com").await);
        assert!(!domains.is_loaded().await);
        assert!(domains.contains("mailinator.com").await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_refetches_the_list() {
        let calls = Arc::new(AtomicUsize::new(0));
        let domains = DisposableDomains::new(FlakySource {
            calls: calls.clone(),
            fail_first: 0,
        });

        assert!(domains.contains("mailinator.com").await);
        domains.refresh().await;
        assert!(domains.is_loaded().await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
