//! Scripted upstream shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use instant_domains::error::{InstantDomainsError, Result};
use instant_domains::session::{HttpRequest, HttpResponse, Transport};
use instant_domains::{ClientConfig, InstantDomainsClient};
use parking_lot::Mutex;
use reqwest::{Method, Url};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a request to one endpoint should fail
#[derive(Clone)]
pub enum Fault {
    Status(u16, &'static str),
    Network,
    Body(&'static str),
    Delay(Duration),
}

/// Fake search service answering from the request itself
#[derive(Default)]
pub struct FakeUpstream {
    pub requests: Mutex<Vec<HttpRequest>>,
    pub zone_calls: AtomicUsize,
    /// Fail every n-th zone-names call (1-based)
    pub fail_every_nth_zone: Option<usize>,
    /// Fault injected for labels starting with the key
    pub label_faults: HashMap<&'static str, Fault>,
    /// Fault injected on the fix endpoint
    pub fix_fault: Option<Fault>,
    pub empty_suggestions: bool,
    pub warmup_fault: Option<(&'static str, Fault)>,
    pub closed: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, method: Method, path_fragment: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url.contains(path_fragment))
            .count()
    }

    /// Every `hash` value sent, from query strings and form bodies alike
    pub fn hashes_sent(&self) -> Vec<String> {
        let mut hashes = Vec::new();
        for request in self.requests.lock().iter() {
            if let Ok(url) = Url::parse(&request.url) {
                hashes.extend(
                    url.query_pairs()
                        .filter(|(key, _)| key == "hash")
                        .map(|(_, value)| value.into_owned()),
                );
            }
            if let Some(hash) = request.form_value("hash") {
                hashes.push(hash.to_string());
            }
        }
        hashes
    }

    pub fn close_calls(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    async fn apply(&self, fault: &Fault, url: &str) -> Result<Option<HttpResponse>> {
        match fault {
            Fault::Status(status, body) => Ok(Some(HttpResponse::new(*status, url, *body))),
            Fault::Network => Err(InstantDomainsError::transport(
                "Connection failed",
                Some(url.to_string()),
            )),
            Fault::Body(body) => Ok(Some(HttpResponse::new(200, url, *body))),
            Fault::Delay(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(None)
            }
        }
    }

    fn label_fault(&self, label: &str) -> Option<&Fault> {
        self.label_faults
            .iter()
            .find(|(prefix, _)| label.starts_with(*prefix))
            .map(|(_, fault)| fault)
    }

    fn zone_body(label: &str, tlds: &str) -> String {
        let results: Vec<_> = tlds
            .split(',')
            .map(|tld| json!({"label": label, "tld": tld, "isRegistered": tld == "com"}))
            .collect();
        json!({ "results": results }).to_string()
    }

    fn fix_body(&self, label: &str) -> String {
        if self.empty_suggestions {
            return json!({ "results": [] }).to_string();
        }
        json!({ "results": [
            {"label": format!("get{}", label), "tld": "com"},
            {"label": format!("{}hq", label), "tld": "io"},
        ]})
        .to_string()
    }

    fn bulk_body(names: &str) -> String {
        let results: Vec<_> = names
            .split(',')
            .map(|name| {
                let availability = if name.ends_with(".io") { "available" } else { "taken" };
                json!({"name": name, "availability": availability})
            })
            .collect();
        json!({ "data": { "results": results } }).to_string()
    }
}

#[async_trait]
impl Transport for FakeUpstream {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request.clone());
        // let sibling searches interleave
        tokio::task::yield_now().await;

        let parsed = Url::parse(&request.url).expect("absolute url");
        let url = request.url.clone();
        let path = parsed.path().to_string();
        let query: HashMap<String, String> = parsed.query_pairs().into_owned().collect();

        if let Some((fragment, fault)) = &self.warmup_fault {
            let hit = if *fragment == "/" {
                path == "/"
            } else {
                path.contains(fragment)
            };
            if hit {
                if let Some(response) = self.apply(fault, &url).await? {
                    return Ok(response);
                }
            }
        }

        if path == "/" || path == "/services/geography" || path == "/services/auth/session" {
            return Ok(HttpResponse::new(200, url, "{}"));
        }

        if let Some(label) = path.strip_prefix("/services/zone-names/") {
            let call = self.zone_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(n) = self.fail_every_nth_zone {
                if call % n == 0 {
                    return Ok(HttpResponse::new(500, url, "internal error"));
                }
            }
            if let Some(fault) = self.label_fault(label).cloned() {
                if let Some(response) = self.apply(&fault, &url).await? {
                    return Ok(response);
                }
            }
            let tlds = query.get("tlds").cloned().unwrap_or_default();
            return Ok(HttpResponse::new(200, url, Self::zone_body(label, &tlds)));
        }

        if let Some(label) = path.strip_prefix("/services/fix/") {
            if let Some(fault) = self.fix_fault.clone() {
                if let Some(response) = self.apply(&fault, &url).await? {
                    return Ok(response);
                }
            }
            return Ok(HttpResponse::new(200, url, self.fix_body(label)));
        }

        if path == "/services/verisign/check" && request.method == Method::POST {
            let names = request.form_value("names").unwrap_or_default().to_string();
            return Ok(HttpResponse::new(200, url, Self::bulk_body(&names)));
        }

        Ok(HttpResponse::new(404, url, "not found"))
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn client_with(upstream: Arc<FakeUpstream>) -> InstantDomainsClient {
    client_with_config(upstream, ClientConfig::default())
}

pub fn client_with_config(upstream: Arc<FakeUpstream>, config: ClientConfig) -> InstantDomainsClient {
    InstantDomainsClient::with_transport(config, upstream)
}

pub async fn warmed_client(upstream: Arc<FakeUpstream>) -> InstantDomainsClient {
    let client = client_with(upstream);
    client.warmup().await.expect("warmup");
    client
}
