use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HealthStatus::Up => write!(f, "UP"),
            HealthStatus::Down => write!(f, "DOWN"),
        }
    }
}

/// Body of `GET /actuator/health`. Component details are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: Option<HealthStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_uppercase_names() {
        let response: HealthResponse = serde_json::from_str(
            r#"{"status": "DOWN", "components": {"db": {"status": "DOWN"}}}"#,
        )
        .unwrap();
        assert_eq!(response.status, Some(HealthStatus::Down));
        assert_eq!(serde_json::to_string(&HealthStatus::Up).unwrap(), r#""UP""#);
    }
}
