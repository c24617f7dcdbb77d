//! Core types and structures for instant-domains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{InstantDomainsError, Result};

/// A fully-qualified domain and whether it can be registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCandidate {
    domain: String,
    is_available: bool,
}

impl DomainCandidate {
    pub fn new(domain: impl Into<String>, is_available: bool) -> Self {
        Self {
            domain: domain.into(),
            is_available,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }
}

impl std::fmt::Display for DomainCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.is_available { "available" } else { "taken" };
        write!(f, "{}: {}", self.domain, status)
    }
}

/// Combined result of one search term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The term exactly as the caller passed it
    pub query: String,
    /// Candidates from the zone-names lookup, in upstream order
    pub main_results: Vec<DomainCandidate>,
    /// Candidates from the suggestion bulk check, in upstream order
    pub suggested_results: Vec<DomainCandidate>,
    pub searched_at: DateTime<Utc>,
}

impl SearchResult {
    pub fn new(
        query: impl Into<String>,
        main_results: Vec<DomainCandidate>,
        suggested_results: Vec<DomainCandidate>,
    ) -> Self {
        Self {
            query: query.into(),
            main_results,
            suggested_results,
            searched_at: Utc::now(),
        }
    }

    /// Every available candidate, main results first
    pub fn available(&self) -> impl Iterator<Item = &DomainCandidate> {
        self.main_results
            .iter()
            .chain(self.suggested_results.iter())
            .filter(|c| c.is_available())
    }
}

/// Per-term outcome of a concurrent search batch
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub term: String,
    pub result: Result<SearchResult>,
}

impl SearchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Site root, used for the landing page and as the Referer
    pub base_url: String,
    /// Host serving the `/services/...` endpoints
    pub api_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Locality hint sent with listing calls
    pub city: String,
    pub country: String,
    pub zone_limit: u32,
    pub fix_limit: u32,
    /// Maximum searches in flight during `search_many`
    pub concurrency: usize,
    /// Caller-level deadline for each search in `search_many`
    pub search_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://instantdomainsearch.com".to_string(),
            api_base_url: "https://api.instantdomainsearch.com".to_string(),
            timeout: Duration::from_secs(30),
            city: "Houston".to_string(),
            country: "US".to_string(),
            zone_limit: 64,
            fix_limit: 32,
            concurrency: 8,
            search_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from `INSTANT_DOMAINS_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("INSTANT_DOMAINS_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("INSTANT_DOMAINS_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("INSTANT_DOMAINS_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number("INSTANT_DOMAINS_TIMEOUT_SECS", &secs)?);
        }
        if let Some(city) = lookup("INSTANT_DOMAINS_CITY") {
            config.city = city;
        }
        if let Some(country) = lookup("INSTANT_DOMAINS_COUNTRY") {
            config.country = country;
        }
        if let Some(n) = lookup("INSTANT_DOMAINS_CONCURRENCY") {
            let n = parse_number("INSTANT_DOMAINS_CONCURRENCY", &n)?;
            if n == 0 {
                return Err(InstantDomainsError::config(
                    "INSTANT_DOMAINS_CONCURRENCY must be at least 1",
                ));
            }
            config.concurrency = n as usize;
        }
        if let Some(secs) = lookup("INSTANT_DOMAINS_SEARCH_TIMEOUT_SECS") {
            let secs = parse_number("INSTANT_DOMAINS_SEARCH_TIMEOUT_SECS", &secs)?;
            config.search_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Referer value the upstream expects on API calls
    pub fn referer(&self) -> String {
        format!("{}/", self.base_url)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| crate::config_error!("{} must be a non-negative integer, got '{}'", key, value))
}

/// Lock-free counters shared between the client and concurrent searches
#[derive(Debug, Default)]
pub struct SearchMetrics {
    searches_started: AtomicU64,
    searches_succeeded: AtomicU64,
    searches_failed: AtomicU64,
    upstream_requests: AtomicU64,
    bulk_checks: AtomicU64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_started(&self) {
        self.searches_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_succeeded(&self) {
        self.searches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.searches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_requests(&self) {
        self.upstream_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_bulk_checks(&self) {
        self.bulk_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            searches_started: self.searches_started.load(Ordering::Relaxed),
            searches_succeeded: self.searches_succeeded.load(Ordering::Relaxed),
            searches_failed: self.searches_failed.load(Ordering::Relaxed),
            upstream_requests: self.upstream_requests.load(Ordering::Relaxed),
            bulk_checks: self.bulk_checks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub searches_started: u64,
    pub searches_succeeded: u64,
    pub searches_failed: u64,
    pub upstream_requests: u64,
    pub bulk_checks: u64,
}
