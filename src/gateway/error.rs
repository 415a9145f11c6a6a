//! HTTP failure details for gateway calls.

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::DeskError;

/// A non-2xx response (or simulated failure) from the backend.
///
/// Keeps the HTTP status so callers can tell a missing record from a
/// rejected request before it is flattened into a [`DeskError`].
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if available
    pub status: Option<StatusCode>,
    /// Human-readable error message
    pub message: String,
    /// Resource title for context (e.g., "Project", "Invoice")
    pub resource: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            resource: resource.into(),
        }
    }

    pub fn with_status(
        message: impl Into<String>,
        resource: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            resource: resource.into(),
        }
    }

    /// Build from a failed response body; backends put the reason in
    /// `message` or `error`, otherwise the status text is used.
    pub fn from_response(status: StatusCode, body: &str, resource: impl Into<String>) -> Self {
        let reason = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());

        Self::with_status(
            format!("HTTP {} {}", status.as_u16(), reason),
            resource,
            status,
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND)
    }

    /// Convert this error, mapping 404 on a single record to `RecordNotFound`
    pub fn into_desk_error(self, record: Option<&str>) -> DeskError {
        if self.is_not_found()
            && let Some(id) = record
        {
            return DeskError::RecordNotFound(format!("{} {}", self.resource, id));
        }
        DeskError::Api(format!("{}: {}", self.resource, self.message))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ApiError> for DeskError {
    fn from(error: ApiError) -> Self {
        error.into_desk_error(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_uses_body_message() {
        let err = ApiError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message": "amount must be positive"}"#,
            "Invoice",
        );
        assert_eq!(err.message, "HTTP 422 amount must be positive");
        assert_eq!(err.status, Some(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn test_from_response_falls_back_to_status_text() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "<html>", "Project");
        assert_eq!(err.message, "HTTP 502 Bad Gateway");

        let err = ApiError::from_response(StatusCode::BAD_REQUEST, r#"{"error": ""}"#, "Project");
        assert_eq!(err.message, "HTTP 400 Bad Request");
    }

    #[test]
    fn test_not_found_maps_to_record_not_found() {
        let err = ApiError::with_status("HTTP 404 Not Found", "Project", StatusCode::NOT_FOUND);
        assert!(matches!(
            err.into_desk_error(Some("12")),
            DeskError::RecordNotFound(msg) if msg == "Project 12"
        ));

        let err = ApiError::with_status("HTTP 404 Not Found", "Project", StatusCode::NOT_FOUND);
        assert!(matches!(DeskError::from(err), DeskError::Api(_)));
    }

    #[test]
    fn test_display_and_conversion() {
        let err = ApiError::new("connection refused", "User");
        assert_eq!(err.to_string(), "connection refused");
        let desk: DeskError = err.into();
        assert_eq!(desk.to_string(), "API error: User: connection refused");
    }
}
