//! User-facing texts for [`ApiError`]s.

use reqwest::StatusCode;

use crate::{config::API_BASE_VAR, ApiError};

impl ApiError {
    /// A single sentence describing the failure to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Config { .. } => {
                format!("API configuration error - check the {API_BASE_VAR} setting")
            }
            ApiError::MixedContent { .. } => {
                "Mixed content error - cannot use an HTTP API from an HTTPS page".to_owned()
            }
            ApiError::Timeout { .. } => {
                "Request timed out - the server is taking too long to respond".to_owned()
            }
            ApiError::Cors { .. } => {
                "Cross-origin request blocked - API server needs CORS configuration"
                    .to_owned()
            }
            ApiError::Network { endpoint, .. } => {
                format!("Failed to connect to API server at {endpoint}")
            }
            ApiError::Http {
                status, message, ..
            } => format!("Server error ({}): {message}", status.as_u16()),
            ApiError::Aborted { .. } => "Request was cancelled".to_owned(),
        }
    }

    /// Troubleshooting steps for the failure, most useful first.
    pub fn hints(&self) -> Vec<String> {
        let hints: Vec<&str> = match self {
            ApiError::Network { endpoint, .. } => {
                return vec![
                    "Check your internet connection".to_owned(),
                    "Verify the API server is running".to_owned(),
                    format!("API URL: {endpoint}"),
                    "Try again".to_owned(),
                ]
            }
            ApiError::Timeout { .. } => vec![
                "The server might be overloaded",
                "Try again in a few seconds",
                "Contact support if this persists",
            ],
            ApiError::Cors { .. } => vec![
                "Contact the API administrator",
                "This domain needs to be added to the CORS allowlist",
            ],
            ApiError::Http { status, .. } if *status == StatusCode::NOT_FOUND => vec![
                "The API endpoint might have changed",
                "Check the API documentation",
            ],
            ApiError::Http { status, .. } if status.is_server_error() => vec![
                "Server encountered an internal error",
                "Try again later or contact support",
            ],
            ApiError::Http { .. } => vec!["Check the request and the server message"],
            ApiError::Config { .. } => {
                return vec![
                    format!("Set {API_BASE_VAR} in the environment"),
                    "For development: http://localhost:8080".to_owned(),
                    "For production: https://your-api-domain.com".to_owned(),
                ]
            }
            ApiError::MixedContent { .. } => vec![
                "Update the API base to use HTTPS",
                "Ensure your API server supports HTTPS",
            ],
            ApiError::Aborted { .. } => vec!["Start the optimization again when ready"],
        };
        hints.into_iter().map(str::to_owned).collect()
    }
}
