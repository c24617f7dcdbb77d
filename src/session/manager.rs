//! Session lifecycle and the signed-request primitive

use parking_lot::Mutex;
use reqwest::Method;
use std::sync::Arc;

use super::headers::browser_headers;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::{InstantDomainsError, Result};
use crate::types::{ClientConfig, SearchMetrics};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Cold,
    Warming,
    Ready,
    Failed,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Cold => write!(f, "cold"),
            SessionState::Warming => write!(f, "warming"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Failed => write!(f, "failed"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Per-request extras layered over the browser header profile
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn referer(self, referer: impl Into<String>) -> Self {
        self.header("Referer", referer)
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }
}

/// Owns one cookie-bearing session shared by every search
pub struct SessionManager {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    state: Mutex<SessionState>,
    metrics: Arc<SearchMetrics>,
}

impl SessionManager {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            state: Mutex::new(SessionState::Cold),
            metrics: Arc::new(SearchMetrics::new()),
        }
    }

    /// Run the landing page, geography and auth/session calls in order.
    ///
    /// Must succeed once before any search. A failed warmup poisons the
    /// session; build a new one to try again.
    pub async fn warmup(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            match *state {
                SessionState::Cold => *state = SessionState::Warming,
                SessionState::Ready => {
                    tracing::debug!("Session already warmed up, skipping");
                    return Ok(());
                }
                SessionState::Closed => return Err(InstantDomainsError::SessionClosed),
                other => {
                    return Err(InstantDomainsError::session_not_ready(format!(
                        "cannot warm up a {} session",
                        other
                    )))
                }
            }
        }

        tracing::info!("Warming up session...");
        let result = self.run_warmup().await;

        let mut state = self.state.lock();
        if *state == SessionState::Warming {
            *state = if result.is_ok() {
                SessionState::Ready
            } else {
                SessionState::Failed
            };
        }

        match &result {
            Ok(()) => tracing::info!("Session warmup complete"),
            Err(e) => tracing::error!(error = %e, "Session warmup failed"),
        }
        result
    }

    async fn run_warmup(&self) -> Result<()> {
        let referer = self.config.referer();

        self.dispatch(Method::GET, &referer, RequestOptions::new()).await?;
        tracing::debug!("Initial cookies set from landing page");

        let geography = format!("{}/services/geography", self.config.api_base_url);
        self.dispatch(Method::GET, &geography, RequestOptions::new().referer(&referer))
            .await?;

        let auth_session = format!("{}/services/auth/session", self.config.api_base_url);
        self.dispatch(Method::GET, &auth_session, RequestOptions::new().referer(&referer))
            .await?;

        Ok(())
    }

    /// Issue a request on the warmed-up session.
    ///
    /// `path_or_url` may be absolute or a path relative to the API base.
    /// Non-2xx answers become [`InstantDomainsError::UpstreamHttp`]; nothing
    /// is retried.
    pub async fn request(
        &self,
        method: Method,
        path_or_url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        self.ensure_ready()?;
        self.dispatch(method, path_or_url, options).await
    }

    /// Fail unless warmup has completed and the session is still open
    pub fn ensure_ready(&self) -> Result<()> {
        match *self.state.lock() {
            SessionState::Ready => Ok(()),
            SessionState::Cold => Err(InstantDomainsError::session_not_ready(
                "warmup() has not been called",
            )),
            SessionState::Warming => Err(InstantDomainsError::session_not_ready(
                "warmup is still in progress",
            )),
            SessionState::Failed => Err(InstantDomainsError::session_not_ready(
                "warmup failed, this session cannot be used",
            )),
            SessionState::Closed => Err(InstantDomainsError::SessionClosed),
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        path_or_url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        let url = self.resolve_url(path_or_url);

        let mut request = HttpRequest::new(method, url.clone());
        for (name, value) in browser_headers() {
            request.set_header(name, value);
        }
        for (name, value) in options.headers {
            request.set_header(name, value);
        }
        request.form = options.form;

        self.metrics.increment_requests();
        tracing::debug!(method = %request.method, url = %url, "Sending request");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Request failed");
                return Err(e);
            }
        };

        if !response.is_success() {
            tracing::error!(
                url = %response.url,
                status = response.status,
                body = %truncate(&response.body, 200),
                "HTTP error"
            );
            return Err(InstantDomainsError::upstream_http(
                response.status,
                response.body,
                response.url,
            ));
        }

        Ok(response)
    }

    fn resolve_url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else if path_or_url.starts_with('/') {
            format!("{}{}", self.config.api_base_url, path_or_url)
        } else {
            format!("{}/{}", self.config.api_base_url, path_or_url)
        }
    }

    /// Release pooled connections. Later calls are no-ops.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Closed {
            return;
        }
        *state = SessionState::Closed;
        drop(state);

        self.transport.close();
        tracing::debug!("HTTP client session closed");
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<SearchMetrics> {
        Arc::clone(&self.metrics)
    }
}

fn truncate(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Answers every request with the status chosen for its URL
    struct ScriptedTransport {
        seen: Mutex<Vec<HttpRequest>>,
        fail_on: Option<&'static str>,
        closed: Mutex<u32>,
    }

    impl ScriptedTransport {
        fn new(fail_on: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                fail_on,
                closed: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            let url = request.url.clone();
            self.seen.lock().push(request);
            let status = match self.fail_on {
                Some(fragment) if url.contains(fragment) => 503,
                _ => 200,
            };
            Ok(HttpResponse::new(status, url, "{}"))
        }

        fn close(&self) {
            *self.closed.lock() += 1;
        }
    }

    fn session(transport: Arc<ScriptedTransport>) -> SessionManager {
        SessionManager::new(ClientConfig::default(), transport)
    }

    #[tokio::test]
    async fn test_warmup_sequence() {
        let transport = ScriptedTransport::new(None);
        let session = session(transport.clone());

        session.warmup().await.unwrap();
        assert!(session.is_ready());

        let seen = transport.seen.lock();
        let urls: Vec<&str> = seen.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://instantdomainsearch.com/",
                "https://api.instantdomainsearch.com/services/geography",
                "https://api.instantdomainsearch.com/services/auth/session",
            ]
        );
        assert!(seen.iter().all(|r| r.method == Method::GET));
        assert_eq!(seen[0].header_value("Referer"), None);
        assert_eq!(seen[1].header_value("Referer"), Some("https://instantdomainsearch.com/"));
        assert_eq!(seen[2].header_value("Referer"), Some("https://instantdomainsearch.com/"));
        assert!(seen.iter().all(|r| r.header_value("User-Agent").is_some()));
    }

    #[tokio::test]
    async fn test_second_warmup_is_noop() {
        let transport = ScriptedTransport::new(None);
        let session = session(transport.clone());
        session.warmup().await.unwrap();
        session.warmup().await.unwrap();
        assert_eq!(transport.seen.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_warmup_poisons_session() {
        let transport = ScriptedTransport::new(Some("geography"));
        let session = session(transport.clone());

        let err = session.warmup().await.unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(session.state(), SessionState::Failed);
        // auth/session is never reached
        assert_eq!(transport.seen.lock().len(), 2);

        assert!(matches!(
            session.warmup().await,
            Err(InstantDomainsError::SessionNotReady { .. })
        ));
        assert!(matches!(
            session.request(Method::GET, "/services/fix/x", RequestOptions::new()).await,
            Err(InstantDomainsError::SessionNotReady { .. })
        ));
    }

    #[tokio::test]
    async fn test_request_before_warmup_sends_nothing() {
        let transport = ScriptedTransport::new(None);
        let session = session(transport.clone());
        let result = session
            .request(Method::GET, "/services/zone-names/acme", RequestOptions::new())
            .await;
        assert!(matches!(result, Err(InstantDomainsError::SessionNotReady { .. })));
        assert!(transport.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_request_overrides_and_resolves() {
        let transport = ScriptedTransport::new(None);
        let session = session(transport.clone());
        session.warmup().await.unwrap();

        session
            .request(
                Method::POST,
                "/services/verisign/check",
                RequestOptions::new()
                    .header("Accept", "*/*")
                    .form(vec![("hash".to_string(), "1".to_string())]),
            )
            .await
            .unwrap();

        let seen = transport.seen.lock();
        let last = seen.last().unwrap();
        assert_eq!(last.url, "https://api.instantdomainsearch.com/services/verisign/check");
        assert_eq!(last.header_value("Accept"), Some("*/*"));
        assert_eq!(last.form_value("hash"), Some("1"));
        assert_eq!(session.metrics().snapshot().upstream_requests, 4);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let transport = ScriptedTransport::new(Some("zone-names"));
        let session = session(transport);
        session.warmup().await.unwrap();

        let err = session
            .request(Method::GET, "services/zone-names/acme", RequestOptions::new())
            .await
            .unwrap_err();
        match err {
            InstantDomainsError::UpstreamHttp { status, body, url } => {
                assert_eq!(status, 503);
                assert_eq!(body, "{}");
                assert!(url.ends_with("/services/zone-names/acme"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let transport = ScriptedTransport::new(None);
        let session = session(transport.clone());
        session.warmup().await.unwrap();

        session.close();
        session.close();
        assert_eq!(*transport.closed.lock(), 1);
        assert!(matches!(
            session.request(Method::GET, "/", RequestOptions::new()).await,
            Err(InstantDomainsError::SessionClosed)
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
