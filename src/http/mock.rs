//! Mock transport for testing
//!
//! Serves canned responses keyed by exact URL without touching the network,
//! making tests fast and deterministic.
//!
//! # Features
//!
//! - Per-URL status and body
//! - Unknown URLs answer 404 (what a raw-content host does)
//! - Per-URL or global connection failures
//! - Thread-safe request log for asserting on network access
//!
//! # Example
//!
//! ```
//! use qsimbench::http::Transport;
//! use qsimbench::http::mock::MockTransport;
//!
//! let transport = MockTransport::new()
//!     .with_response("https://example.org/versions.json", 200, "[\"v1\"]");
//!
//! let resp = transport.get("https://example.org/versions.json").unwrap();
//! assert_eq!(resp.body, "[\"v1\"]");
//! assert_eq!(transport.get("https://example.org/missing").unwrap().status, 404);
//! assert_eq!(transport.request_count(), 2);
//! ```

use super::{HttpResponse, Transport};
use crate::error::Error;
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Route {
    Respond(HttpResponse),
    Unreachable,
}

/// In-memory [`Transport`]
///
/// Clones share routes and the request log, so a test can keep one handle
/// while the service owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
    offline: Arc<Mutex<bool>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MockTransport::set_response`]
    pub fn with_response(self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.set_response(url, status, body);
        self
    }

    /// Answer `url` with `status` and `body`
    pub fn set_response(&self, url: &str, status: u16, body: impl Into<String>) {
        lock(&self.routes).insert(url.to_string(), Route::Respond(HttpResponse::new(status, body)));
    }

    /// Make `url` fail as if the host could not be reached
    pub fn set_unreachable(&self, url: &str) {
        lock(&self.routes).insert(url.to_string(), Route::Unreachable);
    }

    /// Fail every request with a connection error while `offline`
    pub fn set_offline(&self, offline: bool) {
        *lock(&self.offline) = offline;
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// How many times `url` was requested
    pub fn requests_for(&self, url: &str) -> usize {
        lock(&self.requests).iter().filter(|u| *u == url).count()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        lock(&self.requests).push(url.to_string());

        if *lock(&self.offline) {
            return Err(Error::Connectivity(format!("{url}: mock transport offline")));
        }

        match lock(&self.routes).get(url) {
            Some(Route::Respond(resp)) => Ok(resp.clone()),
            Some(Route::Unreachable) => Err(Error::Connectivity(format!("{url}: unreachable"))),
            None => Ok(HttpResponse::new(404, "404: Not Found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_url_is_not_found() {
        let transport = MockTransport::new();
        let resp = transport.get("https://example.org/nothing").unwrap();
        assert!(resp.is_not_found());
    }

    #[test]
    fn test_unreachable_and_offline() {
        let transport = MockTransport::new().with_response("https://a/ok", 200, "x");
        transport.set_unreachable("https://a/down");
        assert!(transport.get("https://a/ok").is_ok());
        assert_eq!(
            transport.get("https://a/down").unwrap_err().kind(),
            crate::ErrorKind::Connectivity
        );

        transport.set_offline(true);
        assert!(transport.get("https://a/ok").is_err());
        transport.set_offline(false);
        assert!(transport.get("https://a/ok").is_ok());
    }

    #[test]
    fn test_clones_share_request_log() {
        let transport = MockTransport::new();
        let handle = transport.clone();
        transport.get("https://a/1").unwrap();
        transport.get("https://a/1").unwrap();
        assert_eq!(handle.requests_for("https://a/1"), 2);
        handle.clear_requests();
        assert_eq!(transport.request_count(), 0);
    }
}
