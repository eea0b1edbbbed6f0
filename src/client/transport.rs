//! HTTP transport seam
//!
//! Two implementations:
//! - `ReqwestTransport`: real HTTP via reqwest (production)
//! - `MockTransport`: canned responses by path, records every request (testing)

use crate::error::{TraceError, TraceResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

/// An outgoing request, fully resolved
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status, content type and body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// 200 with a JSON-LD body
    pub fn json_ld(body: &serde_json::Value) -> Self {
        Self::new(200, "application/ld+json", body.to_string())
    }

    pub fn status(status: u16) -> Self {
        Self::new(status, "", "")
    }
}

/// Sends requests to the provenance store.
///
/// Status codes are reported, not interpreted; the client decides what
/// counts as failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> TraceResult<HttpResponse>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> TraceResult<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url.clone()),
            Method::Post => self.client.post(request.url.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TraceError::Transport(format!("{}: {}", request.url, e)))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| TraceError::Transport(format!("reading body from {}: {}", request.url, e)))?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Mock transport for testing. Answers from a table keyed by method and
/// path suffix, 404 otherwise.
#[derive(Default)]
pub struct MockTransport {
    responses: HashMap<(Method, String), HttpResponse>,
    failing: bool,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every send fails as if the host were unreachable
    pub fn unreachable() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Register a response for requests whose path ends with `path`
    pub fn with_response(mut self, method: Method, path: impl Into<String>, response: HttpResponse) -> Self {
        self.responses.insert((method, path.into()), response);
        self
    }

    /// Register a JSON-LD GET response
    pub fn with_get(self, path: impl Into<String>, body: serde_json::Value) -> Self {
        self.with_response(Method::Get, path, HttpResponse::json_ld(&body))
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn lookup(&self, method: Method, path: &str) -> Option<&HttpResponse> {
        self.responses
            .iter()
            .filter(|((m, suffix), _)| *m == method && path.ends_with(suffix.as_str()))
            .max_by_key(|((_, suffix), _)| suffix.len())
            .map(|(_, response)| response)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> TraceResult<HttpResponse> {
        let method = request.method;
        let path = request.url.path().to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if self.failing {
            return Err(TraceError::Transport("mock transport configured as unreachable".into()));
        }
        Ok(self
            .lookup(method, &path)
            .cloned()
            .unwrap_or_else(|| HttpResponse::status(404)))
    }
}
