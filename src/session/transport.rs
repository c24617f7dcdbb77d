//! HTTP transport seam
//!
//! The session talks to the network through [`Transport`] so tests can
//! script upstream behaviour without sockets.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Method};
use std::time::Duration;

use crate::error::{InstantDomainsError, Result};
use crate::types::ClientConfig;

/// One outgoing HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form fields, sent urlencoded
    pub form: Option<Vec<(String, String)>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            form: None,
        }
    }

    /// Set a header, replacing any existing value under the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A received response, whatever its status
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL after redirects
    pub url: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.body).map_err(|e| {
            InstantDomainsError::malformed(
                format!("invalid JSON from {}: {}", self.url, e),
                Some(self.body.clone()),
            )
        })
    }
}

/// Executes single HTTP exchanges for a session
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. Non-2xx statuses are returned, not raised.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Release pooled connections and cookies
    fn close(&self) {}
}

/// Production transport backed by a cookie-storing `reqwest::Client`
pub struct ReqwestTransport {
    client: RwLock<Option<Client>>,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.concurrency.max(1))
            .build()
            .map_err(|e| InstantDomainsError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: RwLock::new(Some(client)),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        // Clone out of the lock; the client is Arc-backed and must not be
        // borrowed across the await.
        let client = self
            .client
            .read()
            .clone()
            .ok_or(InstantDomainsError::SessionClosed)?;

        let mut builder = client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(fields) = &request.form {
            builder = builder.form(fields);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                InstantDomainsError::transport(
                    format!("Request timed out after {}s", self.timeout.as_secs()),
                    Some(request.url.clone()),
                )
            } else {
                InstantDomainsError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await?;

        Ok(HttpResponse { status, url, body })
    }

    fn close(&self) {
        // Dropping the last client handle tears down the pool and cookie jar
        self.client.write().take();
    }
}
