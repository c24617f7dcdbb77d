//! Instant Domains - session-aware client for the Instant Domain Search service
//!
//! Warm up a browser-like session once, then sign and run any number of
//! availability searches over it, one at a time or concurrently.

pub mod client;
pub mod error;
pub mod search;
pub mod session;
pub mod signer;
pub mod types;

// Re-export commonly used types
pub use error::{InstantDomainsError, Result};
pub use types::{
    ClientConfig, DomainCandidate, MetricsSnapshot, SearchMetrics, SearchOutcome, SearchResult,
};

// Re-export main functionality
pub use client::InstantDomainsClient;
pub use search::DomainSearch;
pub use session::{SessionManager, SessionState, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
