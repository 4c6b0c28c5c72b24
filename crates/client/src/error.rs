//! Client-side error taxonomy.
//!
//! Errors are propagated exactly as they occurred; [`ApiError::kind`]
//! classifies them into a small closed set so callers can branch on the
//! kind instead of matching message text.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected as invalid (400/409/422 or client-side checks).
    Validation,
    /// Missing or insufficient credentials (401/403).
    Unauthorized,
    /// The resource does not exist (404).
    NotFound,
    /// Any other server-side failure, including undecodable responses.
    Server,
    /// The request never produced a response.
    Network,
}

impl ErrorKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Server => "server",
            Self::Network => "network",
        }
    }

    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 | 409 | 422 => Self::Validation,
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            _ => Self::Server,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the HTTP client adapter.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("server returned {status} for {url}")]
    Status {
        status: StatusCode,
        url: String,
        /// Parsed JSON body, or the raw text as a JSON string.
        body: Value,
    },

    /// The success body did not match the expected shape.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request was rejected before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Network,
            Self::Status { status, .. } => ErrorKind::from_status(*status),
            Self::Decode { .. } => ErrorKind::Server,
            Self::InvalidRequest(_) => ErrorKind::Validation,
        }
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message supplied by the server, if any.
    ///
    /// Looks at the body's `error` field, then `detail`, then the first
    /// field-level validation message (`{"stock": ["must be positive"]}`
    /// yields `"stock: must be positive"`). Client-side validation failures
    /// return their own message.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Status { body, .. } => message_from_body(body),
            Self::InvalidRequest(message) => Some(message.clone()),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

fn message_from_body(body: &Value) -> Option<String> {
    let object = body.as_object()?;

    for key in ["error", "detail"] {
        if let Some(message) = object.get(key).and_then(Value::as_str) {
            return Some(message.to_owned());
        }
    }

    object.iter().find_map(|(field, value)| {
        let message = match value {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => items.first().and_then(Value::as_str),
            _ => None,
        }?;
        if field == "non_field_errors" {
            Some(message.to_owned())
        } else {
            Some(format!("{field}: {message}"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(code: u16, body: Value) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            url: "http://127.0.0.1:8000/api/x/".to_string(),
            body,
        }
    }

    #[test]
    fn test_kind_from_status() {
        assert_eq!(status_error(400, Value::Null).kind(), ErrorKind::Validation);
        assert_eq!(status_error(422, Value::Null).kind(), ErrorKind::Validation);
        assert_eq!(status_error(401, Value::Null).kind(), ErrorKind::Unauthorized);
        assert_eq!(status_error(403, Value::Null).kind(), ErrorKind::Unauthorized);
        assert_eq!(status_error(404, Value::Null).kind(), ErrorKind::NotFound);
        assert_eq!(status_error(500, Value::Null).kind(), ErrorKind::Server);
        assert_eq!(status_error(502, Value::Null).kind(), ErrorKind::Server);
        assert_eq!(
            ApiError::InvalidRequest("title is required".to_string()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_server_message_prefers_error_field() {
        let err = status_error(403, json!({"error": "Admin access required", "detail": "x"}));
        assert_eq!(err.server_message().as_deref(), Some("Admin access required"));
    }

    #[test]
    fn test_server_message_falls_back_to_detail() {
        let err = status_error(
            401,
            json!({"detail": "Authentication credentials were not provided."}),
        );
        assert_eq!(
            err.server_message().as_deref(),
            Some("Authentication credentials were not provided.")
        );
    }

    #[test]
    fn test_server_message_from_field_errors() {
        let err = status_error(400, json!({"stock": ["Stock cannot be negative"]}));
        assert_eq!(
            err.server_message().as_deref(),
            Some("stock: Stock cannot be negative")
        );
        let err = status_error(400, json!({"non_field_errors": ["Bad combination"]}));
        assert_eq!(err.server_message().as_deref(), Some("Bad combination"));
    }

    #[test]
    fn test_server_message_absent_for_plain_text() {
        let err = status_error(500, Value::String("<html>oops</html>".to_string()));
        assert_eq!(err.server_message(), None);
    }
}
