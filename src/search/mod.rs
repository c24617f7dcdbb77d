//! Domain search: upstream payload parsing and the search protocol

pub mod orchestrator;
pub mod parser;

// Re-export main functionality
pub use orchestrator::{extract_label, normalize_tlds, DomainSearch, COMMON_TLDS};
pub use parser::{parse_bulk_check_results, parse_fix_suggestions, parse_zone_results};
