use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid base url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("response body is not the expected JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Status and raw body of a completed request. A non-2xx status is still a
/// completed request; callers decide from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET a same-origin path such as `/api/validate/x`.
    async fn get(&self, path: &str) -> Result<FetchResponse, FetchError>;
}

/// [`Fetch`] over HTTP against a fixed origin.
pub struct HttpFetch {
    http: Client,
    base_url: Url,
}

impl HttpFetch {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn get(&self, path: &str) -> Result<FetchResponse, FetchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                message: e.to_string(),
            })?;
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let res = self.http.get(url.clone()).send().await.map_err(transport)?;
        let status = res.status().as_u16();
        let body = res.bytes().await.map_err(transport)?;
        Ok(FetchResponse::new(status, body.to_vec()))
    }
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`,
/// byte-wise over UTF-8, with uppercase hex digits.
pub fn encode_uri_component(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for b in src.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(to_hex_upper(b >> 4));
            out.push(to_hex_upper(b & 0x0F));
        }
    }
    out
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

fn to_hex_upper(nibble: u8) -> char {
    char::from(b"0123456789ABCDEF"[usize::from(nibble & 0x0F)])
}
