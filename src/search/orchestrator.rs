//! Multi-step search protocol over a shared session

use futures::future::join_all;
use regex::Regex;
use reqwest::Method;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use super::parser::{parse_bulk_check_results, parse_fix_suggestions, parse_zone_results};
use crate::error::{InstantDomainsError, Result};
use crate::session::headers::FORM_CONTENT_TYPE;
use crate::session::{RequestOptions, SessionManager};
use crate::signer::SignedRequestParams;
use crate::types::{SearchMetrics, SearchOutcome, SearchResult};

/// TLDs searched when the caller passes none
pub const COMMON_TLDS: &[&str] = &[
    "com", "net", "org", "ai", "io", "xyz", "app", "shop", "info", "co", "store", "site",
    "online", "dev", "tech", "pro", "live", "lol", "club", "vip", "link", "top", "me", "tv",
    "blog", "cloud", "design", "studio", "art", "fun", "one", "world", "digital", "global",
    "space", "plus", "media", "email", "host", "page", "ltd", "biz", "agency", "social",
    "stream", "zone", "web", "team", "work", "life", "love", "best", "cool", "today", "guru",
    "care", "fit", "marketing", "luxury", "solutions", "services", "money", "consulting", "bio",
];

const BULK_CHECK_PATH: &str = "/services/verisign/check";

/// Runs searches against one warmed-up [`SessionManager`]
pub struct DomainSearch {
    session: Arc<SessionManager>,
    semaphore: Semaphore,
    search_timeout: Option<Duration>,
    metrics: Arc<SearchMetrics>,
}

impl DomainSearch {
    pub fn new(session: Arc<SessionManager>) -> Self {
        let config = session.config();
        let semaphore = Semaphore::new(config.concurrency.max(1));
        let search_timeout = config.search_timeout;
        let metrics = session.metrics();

        Self {
            session,
            semaphore,
            search_timeout,
            metrics,
        }
    }

    /// Look up `term` across `tlds`, optionally with bulk-checked suggestions.
    ///
    /// Everything after the first dot of `term` is ignored. An empty `tlds`
    /// searches [`COMMON_TLDS`].
    pub async fn search<S: AsRef<str>>(
        &self,
        term: &str,
        tlds: &[S],
        include_suggestions: bool,
    ) -> Result<SearchResult> {
        self.metrics.increment_started();
        let start_time = Instant::now();

        let result = self.run_search(term, tlds, include_suggestions).await;

        let duration = start_time.elapsed();
        match &result {
            Ok(found) => {
                self.metrics.increment_succeeded();
                tracing::info!(
                    term = %term,
                    main = found.main_results.len(),
                    suggested = found.suggested_results.len(),
                    available = found.available().count(),
                    duration_ms = %duration.as_millis(),
                    "Search completed"
                );
            }
            Err(e) => {
                self.metrics.increment_failed();
                tracing::warn!(term = %term, error = %e, duration_ms = %duration.as_millis(), "Search failed");
            }
        }

        result
    }

    async fn run_search<S: AsRef<str>>(
        &self,
        term: &str,
        tlds: &[S],
        include_suggestions: bool,
    ) -> Result<SearchResult> {
        self.session.ensure_ready()?;

        let label = extract_label(term)?;
        let listing = SignedRequestParams::listing(label);
        let tlds = normalize_tlds(tlds)?;
        let config = self.session.config();

        let zone_path = format!(
            "/services/zone-names/{}?hash={}&limit={}&city={}&country={}&tlds={}",
            label, listing.hash, config.zone_limit, config.city, config.country, tlds
        );
        let zone = self
            .session
            .request(Method::GET, &zone_path, RequestOptions::new())
            .await?;
        let main_results = parse_zone_results(&zone.json()?);
        tracing::debug!(label = %label, count = main_results.len(), "Zone lookup done");

        if !include_suggestions {
            return Ok(SearchResult::new(term, main_results, Vec::new()));
        }

        let fix_path = format!(
            "/services/fix/{}?hash={}&limit={}&city={}&country={}&tlds={}",
            label, listing.hash, config.fix_limit, config.city, config.country, tlds
        );
        let fix = self
            .session
            .request(Method::GET, &fix_path, RequestOptions::new())
            .await?;
        let names = parse_fix_suggestions(&fix.json()?);
        tracing::debug!(label = %label, count = names.len(), "Suggestion lookup done");

        if names.is_empty() {
            return Ok(SearchResult::new(term, main_results, Vec::new()));
        }

        // The bulk check validates against its own seed
        let bulk = SignedRequestParams::bulk_check(label);
        let form = vec![
            ("hash".to_string(), bulk.hash),
            ("names".to_string(), names.join(",")),
            ("search".to_string(), label.to_string()),
            ("tlds".to_string(), tlds),
        ];
        let options = RequestOptions::new()
            .header("Content-Type", FORM_CONTENT_TYPE)
            .header("Accept", "*/*")
            .referer(config.referer())
            .form(form);

        self.metrics.increment_bulk_checks();
        let checked = self
            .session
            .request(Method::POST, BULK_CHECK_PATH, options)
            .await?;
        let suggested_results = parse_bulk_check_results(&checked.json()?);

        Ok(SearchResult::new(term, main_results, suggested_results))
    }

    /// [`search`](Self::search) under a caller-level deadline. Expiry drops
    /// the in-flight request and leaves the session usable.
    pub async fn search_with_timeout<S: AsRef<str>>(
        &self,
        term: &str,
        tlds: &[S],
        include_suggestions: bool,
        timeout: Duration,
    ) -> Result<SearchResult> {
        match tokio::time::timeout(timeout, self.search(term, tlds, include_suggestions)).await {
            Ok(result) => result,
            Err(_) => {
                self.metrics.increment_failed();
                tracing::warn!(term = %term, timeout_secs = timeout.as_secs(), "Search timed out");
                Err(InstantDomainsError::timeout(
                    format!("search '{}'", term),
                    timeout.as_secs(),
                ))
            }
        }
    }

    /// Search many terms concurrently. Outcomes come back in input order and
    /// a failing term never affects the others.
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
        self.search_many_with_progress(terms, tlds, include_suggestions, |_| {})
            .await
    }

    /// Like [`search_many`](Self::search_many), calling `on_done` as each
    /// term finishes.
    pub async fn search_many_with_progress<T, S, F>(
        &self,
        terms: &[T],
        tlds: &[S],
        include_suggestions: bool,
        on_done: F,
    ) -> Vec<SearchOutcome>
    where
        T: AsRef<str>,
        S: AsRef<str>,
        F: Fn(&SearchOutcome),
    {
        let batch_start = Instant::now();
        let on_done = &on_done;

        let futures = terms.iter().map(move |term| async move {
            let term = term.as_ref();
            let result = match self.semaphore.acquire().await {
                Ok(_permit) => match self.search_timeout {
                    Some(timeout) => {
                        self.search_with_timeout(term, tlds, include_suggestions, timeout)
                            .await
                    }
                    None => self.search(term, tlds, include_suggestions).await,
                },
                Err(e) => Err(InstantDomainsError::internal(format!(
                    "Failed to acquire semaphore: {}",
                    e
                ))),
            };

            let outcome = SearchOutcome {
                term: term.to_string(),
                result,
            };
            on_done(&outcome);
            outcome
        });

        let outcomes = join_all(futures).await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        let batch_duration = batch_start.elapsed();
        tracing::info!(
            terms = terms.len(),
            succeeded = outcomes.len() - failed,
            failed = failed,
            batch_duration_ms = %batch_duration.as_millis(),
            "Batch search completed"
        );

        outcomes
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }
}

/// The label is everything before the first dot, whitespace trimmed.
///
/// Only letters, digits and `-` are accepted since the label is sent
/// verbatim in the signed URL path.
pub fn extract_label(term: &str) -> Result<&str> {
    let label = term.split('.').next().unwrap_or_default().trim();
    if label.is_empty() {
        return Err(crate::validation_error!("search term '{}' has no label", term));
    }
    if !label_pattern()?.is_match(label) {
        return Err(crate::validation_error!(
            "search term '{}' contains characters not allowed in a domain label",
            term
        ));
    }
    Ok(label)
}

/// Lowercase, strip leading dots, drop duplicates and join with commas.
///
/// Fails when a TLD holds anything but letters, digits and `-`.
pub fn normalize_tlds<S: AsRef<str>>(tlds: &[S]) -> Result<String> {
    let pattern = label_pattern()?;
    let mut seen: Vec<String> = Vec::with_capacity(tlds.len());
    for tld in tlds {
        let tld = tld.as_ref().trim().trim_start_matches('.').to_lowercase();
        if tld.is_empty() {
            continue;
        }
        if !pattern.is_match(&tld) {
            return Err(crate::validation_error!("'{}' is not a valid TLD", tld));
        }
        if !seen.contains(&tld) {
            seen.push(tld);
        }
    }

    if seen.is_empty() {
        Ok(COMMON_TLDS.join(","))
    } else {
        Ok(seen.join(","))
    }
}

// IDN labels keep their Unicode letters; the upstream handles the punycode.
fn label_pattern() -> Result<Regex> {
    Regex::new(r"^[\p{L}\p{N}-]+$").map_err(|e| InstantDomainsError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_label() {
        assert_eq!(extract_label("dealerflow").unwrap(), "dealerflow");
        assert_eq!(extract_label("dealerflow.com").unwrap(), "dealerflow");
        assert_eq!(extract_label(" acme .co.uk").unwrap(), "acme");
        assert!(matches!(
            extract_label(".com"),
            Err(InstantDomainsError::Validation { .. })
        ));
        assert!(extract_label("").is_err());
        assert_eq!(extract_label("münchen.de").unwrap(), "münchen");
        assert_eq!(extract_label("my-shop").unwrap(), "my-shop");
    }

    #[test]
    fn test_extract_label_rejects_url_syntax() {
        for term in ["acme#x", "acme?x", "acme&x=1", "acme/x", "acme x", "acme%20"] {
            assert!(
                matches!(extract_label(term), Err(InstantDomainsError::Validation { .. })),
                "{term}"
            );
        }
    }

    #[test]
    fn test_normalize_tlds() {
        assert_eq!(normalize_tlds(&[".com", "ai", ".IO", "com", " "]).unwrap(), "com,ai,io");
        assert_eq!(normalize_tlds(&["..dev"]).unwrap(), "dev");
        assert_eq!(normalize_tlds(&["xn--p1ai"]).unwrap(), "xn--p1ai");
    }

    #[test]
    fn test_normalize_tlds_rejects_query_syntax() {
        for tld in ["com&limit=9999", "io#", "co.uk", "a b"] {
            assert!(
                matches!(normalize_tlds(&[tld]), Err(InstantDomainsError::Validation { .. })),
                "{tld}"
            );
        }
    }

    #[test]
    fn test_normalize_empty_uses_common_list() {
        let empty: [&str; 0] = [];
        let joined = normalize_tlds(&empty).unwrap();
        assert!(joined.starts_with("com,net,org,ai,io"));
        assert_eq!(joined.split(',').count(), COMMON_TLDS.len());
    }
}
