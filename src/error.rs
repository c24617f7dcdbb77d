//! Error handling for instant-domains

use thiserror::Error;

/// Main error type for instant-domains
#[derive(Error, Debug, Clone)]
pub enum InstantDomainsError {
    #[error("Upstream returned HTTP {status} for {url}: {body}")]
    UpstreamHttp {
        status: u16,
        body: String,
        url: String,
    },

    #[error("Transport error: {message}")]
    UpstreamTransport {
        message: String,
        url: Option<String>,
    },

    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
        content: Option<String>,
    },

    #[error("Session not ready: {message}")]
    SessionNotReady { message: String },

    #[error("Session has been closed")]
    SessionClosed,

    #[error("Timeout error: {operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl InstantDomainsError {
    /// Create an upstream HTTP status error
    pub fn upstream_http(status: u16, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self::UpstreamHttp {
            status,
            body: body.into(),
            url: url.into(),
        }
    }

    /// Create a transport (network/timeout) error
    pub fn transport(message: impl Into<String>, url: Option<String>) -> Self {
        Self::UpstreamTransport {
            message: message.into(),
            url,
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>, content: Option<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            content,
        }
    }

    /// Create a session-not-ready error
    pub fn session_not_ready(message: impl Into<String>) -> Self {
        Self::SessionNotReady {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if the upstream answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for errors raised by the upstream service or the network path to it
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamHttp { .. } | Self::UpstreamTransport { .. })
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::UpstreamHttp { status, url, .. } => {
                let hint = match status {
                    401 | 403 => "the request signature or session was rejected, run warmup on a fresh session",
                    429 => "the service is rate limiting, reduce concurrency or wait",
                    _ => "the service may be temporarily unavailable",
                };
                format!("❌ Upstream error ({}) from {}\n💡 Possibly {}", status, url, hint)
            }
            Self::UpstreamTransport { message, .. } => {
                format!("❌ Network error: {}\n💡 Check your internet connection", message)
            }
            Self::MalformedResponse { message, .. } => {
                format!("❌ Unexpected response: {}\n💡 The upstream format may have changed", message)
            }
            Self::SessionNotReady { message } => {
                format!("❌ Session not ready: {}\n💡 Call warmup() once before searching", message)
            }
            Self::SessionClosed => {
                "❌ Session closed\n💡 Create a new client to keep searching".to_string()
            }
            Self::Timeout { operation, timeout_secs } => {
                format!("⏱️  Operation '{}' timed out after {}s\n💡 Try increasing timeout or reducing concurrency", operation, timeout_secs)
            }
            Self::Validation { message } => {
                format!("❌ Validation error: {}\n💡 Check your input format", message)
            }
            Self::Config { message } => {
                format!("❌ Configuration problem: {}\n💡 Check your .env file or environment", message)
            }
            Self::Internal { message } => {
                format!("❌ Internal error: {}\n💡 This is a bug, please report it", message)
            }
        }
    }
}

/// Convert from common error types
impl From<reqwest::Error> for InstantDomainsError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string());

        if let Some(status) = err.status() {
            Self::upstream_http(status.as_u16(), err.to_string(), url.unwrap_or_default())
        } else if err.is_timeout() {
            Self::transport("Request timed out", url)
        } else if err.is_connect() {
            Self::transport("Connection failed", url)
        } else if err.is_redirect() {
            Self::transport("Redirect loop", url)
        } else {
            Self::transport(err.to_string(), url)
        }
    }
}

impl From<serde_json::Error> for InstantDomainsError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string(), None)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, InstantDomainsError>;

/// Helper macros for common error patterns
#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::error::InstantDomainsError::validation($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::InstantDomainsError::validation(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::InstantDomainsError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::InstantDomainsError::config(format!($fmt, $($arg)*))
    };
}
