use std::error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

pub mod client;
pub mod config;
pub mod health;
pub mod hint;
pub mod request;
pub mod session;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use request::{RouteRequestBuilder, ValidationError};
pub use session::{OptimizeSession, RouteService, SessionError};

/// Failure category of an [`ApiError`], rendered as the tags shown to users
/// (`CONFIG`, `MIXED_CONTENT`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    MixedContent,
    Timeout,
    Cors,
    Network,
    Http,
    Aborted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::MixedContent => "MIXED_CONTENT",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Cors => "CORS",
            ErrorKind::Network => "NETWORK",
            ErrorKind::Http => "HTTP",
            ErrorKind::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every way a call to the optimization service can fail.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// The API base is missing or is not an http(s) URL.
    Config { reason: String },
    /// The page runs over https but the API base is plain http.
    MixedContent { api_base: String, page_origin: String },
    /// No response arrived before the deadline.
    Timeout { endpoint: String, timeout: Duration },
    /// The service did not allow the page origin.
    Cors { endpoint: String, origin: String },
    /// Connection, DNS or transport failure.
    Network {
        endpoint: String,
        source: Arc<reqwest::Error>,
    },
    /// Non-2xx status, or a 2xx body that could not be decoded.
    Http {
        endpoint: String,
        status: StatusCode,
        message: String,
    },
    /// Cancelled by the caller.
    Aborted { endpoint: String },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Config { .. } => ErrorKind::Config,
            ApiError::MixedContent { .. } => ErrorKind::MixedContent,
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Cors { .. } => ErrorKind::Cors,
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Aborted { .. } => ErrorKind::Aborted,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ApiError::Config { .. } | ApiError::MixedContent { .. } => None,
            ApiError::Timeout { endpoint, .. }
            | ApiError::Cors { endpoint, .. }
            | ApiError::Network { endpoint, .. }
            | ApiError::Http { endpoint, .. }
            | ApiError::Aborted { endpoint } => Some(endpoint.as_str()),
        }
    }

    /// The detail text of the error, without endpoint or status decoration.
    pub fn message(&self) -> String {
        match self {
            ApiError::Config { reason } => reason.clone(),
            ApiError::MixedContent {
                api_base,
                page_origin,
            } => format!("page {page_origin} cannot call insecure API {api_base}"),
            ApiError::Timeout { timeout, .. } => {
                format!("no response within {} ms", timeout.as_millis())
            }
            ApiError::Cors { origin, .. } => {
                format!("origin {origin} is not allowed by the API server")
            }
            ApiError::Network { source, .. } => source.to_string(),
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Aborted { .. } => "request was cancelled".to_owned(),
        }
    }
}

impl error::Error for ApiError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ApiError::Network { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Config { reason } => {
                write!(f, "API configuration error: {reason}")
            }
            ApiError::MixedContent { .. } => {
                write!(f, "Mixed content blocked: {}", self.message())
            }
            ApiError::Timeout { endpoint, .. } => {
                write!(f, "Request to {endpoint} timed out: {}", self.message())
            }
            ApiError::Cors { endpoint, .. } => {
                write!(
                    f,
                    "Cross-origin request to {endpoint} blocked: {}",
                    self.message()
                )
            }
            ApiError::Network { endpoint, source } => {
                write!(f, "Network error requesting {endpoint}: {source}")
            }
            ApiError::Http {
                endpoint,
                status,
                message,
            } => write!(f, "HTTP {} from {endpoint}: {message}", status.as_u16()),
            ApiError::Aborted { endpoint } => {
                write!(f, "Request to {endpoint} was aborted")
            }
        }
    }
}
