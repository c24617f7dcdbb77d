//! Browser-like session against the search service
//!
//! A session is warmed up once (landing page, geography, auth/session) so the
//! cookie jar carries what the API expects, then shared by every search.

pub mod headers;
pub mod manager;
pub mod transport;

// Re-export main functionality
pub use manager::{RequestOptions, SessionManager, SessionState};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
