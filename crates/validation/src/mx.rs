use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    TokioAsyncResolver,
};

pub const DEFAULT_MX_CACHE_CAPACITY: u64 = 10_000;

#[async_trait]
pub trait MxResolver: Send + Sync {
    /// True when the domain publishes at least one MX record. Resolution
    /// failures of any kind count as "no MX".
    async fn has_mx(&self, domain: &str) -> bool;
}

pub struct DnsMxResolver {
    resolver: TokioAsyncResolver,
}

impl DnsMxResolver {
    pub fn new() -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

impl Default for DnsMxResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MxResolver for DnsMxResolver {
    async fn has_mx(&self, domain: &str) -> bool {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(error) => {
                debug!(%domain, %error, "mx lookup failed");
                false
            }
        }
    }
}

/// Remembers answers per lowercased domain, bounded by entry count.
pub struct CachedMxResolver<R> {
    inner: R,
    answers: Cache<String, bool>,
}

impl<R: MxResolver> CachedMxResolver<R> {
    pub fn new(inner: R, capacity: u64) -> Self {
        Self {
            inner,
            answers: Cache::new(capacity),
        }
    }
}

#[async_trait]
impl<R: MxResolver> MxResolver for CachedMxResolver<R> {
    async fn has_mx(&self, domain: &str) -> bool {
        let key = domain.to_ascii_lowercase();
        if let Some(answer) = self.answers.get(&key).await {
            return answer;
        }
        let answer = self.inner.has_mx(&key).await;
        self.answers.insert(key, answer).await;
        answer
    }
}
