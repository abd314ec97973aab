//! HTTP transport abstraction
//!
//! Every remote read (version list, file trees, record files, metadata) goes
//! through the [`Transport`] trait. The production implementation,
//! [`HttpTransport`], wraps a shared blocking `reqwest` client configured with
//! a fixed per-request timeout, transient-status retries with exponential
//! backoff, and an optional bearer token. [`mock::MockTransport`] serves
//! canned responses for tests and offline hosts.
//!
//! # Status handling
//!
//! A transport returns whatever final status the server produced; mapping
//! statuses to errors (404 tolerated for record files, everything else
//! fatal) is the caller's business. Only failures to get any response at all
//! surface as [`Error::Connectivity`].

pub mod mock;
pub mod retry;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::Result;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use retry::{BackoffPolicy, RetryPolicy};
use std::thread;
use tracing::{debug, warn};

/// Final response of a GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// The response itself when 2xx, [`Error::RemoteFetch`] otherwise
    pub fn require_success(self, url: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::RemoteFetch {
                url: url.to_string(),
                status: self.status,
            })
        }
    }

    /// Decode the body as one JSON document
    pub fn json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| Error::parse(url, e))
    }
}

/// Blocking GET-only transport
///
/// Implementations are shared across threads for the lifetime of a service.
pub trait Transport: Send + Sync {
    /// Issue a GET and return the final response (after any retries)
    ///
    /// # Errors
    ///
    /// [`Error::Connectivity`] when no response could be obtained.
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Client settings shared by every request: timeout, GitHub media type, token
fn client_builder(config: &ClientConfig) -> Result<ClientBuilder> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    if let Some(token) = &config.token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| {
                Error::Validation("token contains invalid header characters".to_string())
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(Client::builder()
        .timeout(config.http.timeout())
        .default_headers(headers)
        .user_agent(concat!("qsimbench/", env!("CARGO_PKG_VERSION"))))
}

/// `reqwest`-backed transport with retries
pub struct HttpTransport {
    client: Client,
    policy: RetryPolicy,
}

impl HttpTransport {
    /// Build the shared client from the configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = client_builder(config)?
            .build()
            .map_err(|e| Error::Connectivity(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            policy: RetryPolicy::from(&config.http),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let mut attempt = 0u32;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let retryable = self.policy.is_retryable_status(status);
                    if retryable && attempt < self.policy.max_retries {
                        attempt += 1;
                        let delay = self.policy.delay_for_attempt(attempt);
                        warn!(%url, status, attempt, ?delay, "transient HTTP status, retrying");
                        thread::sleep(delay);
                        continue;
                    }
                    let body = resp
                        .text()
                        .map_err(|e| Error::Connectivity(format!("{url}: {e}")))?;
                    debug!(%url, status, bytes = body.len(), "GET complete");
                    return Ok(HttpResponse { status, body });
                }
                Err(e) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay_for_attempt(attempt);
                    warn!(%url, attempt, ?delay, error = %e, "request failed, retrying");
                    thread::sleep(delay);
                }
                Err(e) => return Err(Error::Connectivity(format!("{url}: {e}"))),
            }
        }
    }
}
