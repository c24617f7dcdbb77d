//! Translation of upstream payloads into [`DomainCandidate`]s
//!
//! The zone-names and bulk-check endpoints disagree on nesting and on how
//! availability is expressed (inverted registration flag vs. string enum),
//! so each gets its own record type and parser.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::types::DomainCandidate;

/// Item of `{ results: [...] }` from `/services/zone-names`
#[derive(Debug, Deserialize)]
struct ZoneRecord {
    label: Option<String>,
    tld: Option<String>,
    #[serde(rename = "isRegistered", default = "registered_by_default")]
    is_registered: bool,
}

fn registered_by_default() -> bool {
    true
}

/// Item of `{ results: [...] }` from `/services/fix`
#[derive(Debug, Deserialize)]
struct SuggestionRecord {
    label: Option<String>,
    tld: Option<String>,
}

/// Item of `{ data: { results: [...] } }` from `/services/verisign/check`
#[derive(Debug, Deserialize)]
struct BulkCheckRecord {
    name: Option<String>,
    #[serde(default)]
    availability: Option<String>,
}

/// Decode each element of `items` on its own so one bad record is dropped
/// instead of failing the whole payload.
fn records<T: DeserializeOwned>(items: Option<&Value>, endpoint: &str) -> Vec<T> {
    let Some(items) = items.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

/// Parse a zone-names response. A missing `isRegistered` counts as taken.
pub fn parse_zone_results(json: &Value) -> Vec<DomainCandidate> {
    records::<ZoneRecord>(json.get("results"), "zone-names")
        .into_iter()
        .filter_map(|record| match (record.label, record.tld) {
            (Some(label), Some(tld)) => Some(DomainCandidate::new(
                format!("{}.{}", label, tld),
                !record.is_registered,
            )),
            _ => {
                tracing::debug!(endpoint = "zone-names", "Skipping record without label/tld");
                None
            }
        })
        .collect()
}

/// Parse a bulk-check response. Only the literal `"available"` is available.
pub fn parse_bulk_check_results(json: &Value) -> Vec<DomainCandidate> {
    let items = json.get("data").and_then(|data| data.get("results"));

    records::<BulkCheckRecord>(items, "verisign/check")
        .into_iter()
        .filter_map(|record| {
            let Some(name) = record.name else {
                tracing::debug!(endpoint = "verisign/check", "Skipping record without name");
                return None;
            };
            let is_available = record.availability.as_deref() == Some("available");
            Some(DomainCandidate::new(name, is_available))
        })
        .collect()
}

/// Pull `label.tld` names out of a fix (suggestions) response
pub fn parse_fix_suggestions(json: &Value) -> Vec<String> {
    records::<SuggestionRecord>(json.get("results"), "fix")
        .into_iter()
        .filter_map(|record| match (record.label, record.tld) {
            (Some(label), Some(tld)) if !label.is_empty() && !tld.is_empty() => {
                Some(format!("{}.{}", label, tld))
            }
            _ => None,
        })
        .collect()
}
