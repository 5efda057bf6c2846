//! Classification of a single HTTP attempt.

use serde_json::Value;

use super::transport::RawResponse;

/// Result of one HTTP attempt against the Riot API.
///
/// Expected failure modes are values, not errors. `RateLimited` only exists
/// between the transport and the retry policy; the gateway never hands it to
/// callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    Success(Value),
    NotFound,
    DeveloperError(String),
    ServiceError(String),
    RateLimited { retry_after_secs: Option<u64> },
}

impl ApiOutcome {
    /// Map a raw response onto an outcome.
    ///
    /// | status | outcome |
    /// |---|---|
    /// | 2xx | `Success` with the decoded body |
    /// | 401 | `DeveloperError("invalid credential")` |
    /// | 404 | `NotFound` |
    /// | 429 | `RateLimited` |
    /// | 5xx | `ServiceError` |
    /// | other | `DeveloperError` |
    ///
    /// A 2xx body that is not JSON is a decode error, not an outcome.
    pub fn from_response(response: &RawResponse) -> Result<Self, serde_json::Error> {
        let status = response.status;
        let outcome = match status {
            200..=299 => ApiOutcome::Success(serde_json::from_str(&response.body)?),
            401 => ApiOutcome::DeveloperError("invalid credential".to_string()),
            404 => ApiOutcome::NotFound,
            429 => ApiOutcome::RateLimited {
                retry_after_secs: response.retry_after_secs,
            },
            500..=599 => ApiOutcome::ServiceError(
                upstream_message(&response.body)
                    .unwrap_or_else(|| format!("Riot service error (HTTP {})", status)),
            ),
            _ => ApiOutcome::DeveloperError(
                upstream_message(&response.body)
                    .map(|m| format!("HTTP error {}: {}", status, m))
                    .unwrap_or_else(|| format!("HTTP error {}", status)),
            ),
        };
        Ok(outcome)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success(_))
    }
}

/// Riot error bodies look like `{"status": {"message": "...", "status_code": 503}}`.
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("status")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}
