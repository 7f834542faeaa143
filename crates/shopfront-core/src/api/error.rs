//! Structured API errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error category for API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Transport failure (DNS, connect, reset, timeout).
    Network,
    /// Non-success HTTP status.
    HttpStatus,
    /// Session could not be refreshed; the user has been logged out.
    Auth,
    /// Response body did not match the expected shape.
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Auth => write!(f, "auth"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the API client with kind and details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// One-line summary suitable for a toast.
    pub message: String,
    /// HTTP status, when the server answered.
    pub status: Option<u16>,
    /// Optional additional details (e.g., raw error body).
    pub details: Option<String>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn network(err: &reqwest::Error) -> Self {
        let mut error = Self::new(ApiErrorKind::Network, format!("Network error: {err}"));
        error.details = Some(format!("{err:?}"));
        error
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    /// Forced logout after a failed refresh.
    pub fn auth_failed() -> Self {
        let mut error = Self::new(ApiErrorKind::Auth, "Authentication failed");
        error.status = Some(401);
        error
    }

    /// Builds an HTTP status error.
    ///
    /// A JSON body with a `message` string supplies the summary; anything else
    /// yields the generic `HTTP error! status: N`.
    pub fn http_status(status: u16, body: &str, is_json: bool) -> Self {
        let server_message = if is_json {
            serde_json::from_str::<Value>(body).ok().and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
        } else {
            None
        };

        Self {
            kind: ApiErrorKind::HttpStatus,
            message: server_message.unwrap_or_else(|| format!("HTTP error! status: {status}")),
            status: Some(status),
            details: if body.is_empty() {
                None
            } else {
                Some(body.to_string())
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_uses_server_message() {
        let err = ApiError::http_status(400, r#"{"message":"Email already registered"}"#, true);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.status, Some(400));
    }

    #[test]
    fn test_http_status_generic_for_json_without_message() {
        let err = ApiError::http_status(500, r#"{"error":"boom"}"#, true);
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_http_status_generic_for_non_json() {
        let err = ApiError::http_status(502, "<html>Bad gateway</html>", false);
        assert_eq!(err.to_string(), "HTTP error! status: 502");
        assert!(err.details.unwrap().contains("Bad gateway"));
    }

    #[test]
    fn test_auth_failed() {
        let err = ApiError::auth_failed();
        assert_eq!(err.kind, ApiErrorKind::Auth);
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Authentication failed");
    }
}
