//! Client facade: one session, one search orchestrator

use std::sync::Arc;

use crate::error::Result;
use crate::search::DomainSearch;
use crate::session::{ReqwestTransport, SessionManager, Transport};
use crate::types::{ClientConfig, MetricsSnapshot, SearchOutcome, SearchResult};

/// Entry point for callers: `warmup`, any number of searches, then `close`.
///
/// ```rust,ignore
/// use instant_domains::{ClientConfig, InstantDomainsClient};
///
/// let client = InstantDomainsClient::new(ClientConfig::default())?;
/// client.warmup().await?;
/// let result = client.search("dealerflow", &["com", "io"], true).await?;
/// for candidate in result.available() {
///     println!("{}", candidate.domain());
/// }
/// client.close();
/// ```
pub struct InstantDomainsClient {
    session: Arc<SessionManager>,
    search: DomainSearch,
}

impl InstantDomainsClient {
    /// Create a client backed by a real HTTP session
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client over any transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let session = Arc::new(SessionManager::new(config, transport));
        let search = DomainSearch::new(Arc::clone(&session));
        Self { session, search }
    }

    pub async fn warmup(&self) -> Result<()> {
        self.session.warmup().await
    }

    pub async fn search<S: AsRef<str>>(
        &self,
        term: &str,
        tlds: &[S],
        include_suggestions: bool,
    ) -> Result<SearchResult> {
        self.search.search(term, tlds, include_suggestions).await
    }

    pub async fn search_many<T, S>(
        &self,
        terms: &[T],
        tlds: &[S],
        include_suggestions: bool,
    ) -> Vec<SearchOutcome>
    where
        T: AsRef<str>,
        S: AsRef<str>,
    {
        self.search.search_many(terms, tlds, include_suggestions).await
    }

    /// Release the session. Searches still in flight will fail.
    pub fn close(&self) {
        self.session.close();
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Direct access to the orchestrator for timeouts and progress callbacks
    pub fn searcher(&self) -> &DomainSearch {
        &self.search
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.session.metrics().snapshot()
    }
}
