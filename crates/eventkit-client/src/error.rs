//! Error types for the EventKit client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when using the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was cancelled through its cancel source.
    #[error("request cancelled: {0}")]
    Cancelled(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: Value },

    /// Transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The configured base URL or a request path is malformed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Returns true if this error only means the request was cancelled.
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Payload an error action carries: the server's body for API errors,
    /// the error message for everything else.
    pub fn payload(&self) -> Value {
        match self {
            Self::Api { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_is_server_body() {
        let err = ClientError::Api {
            status: 400,
            body: json!({"errors": [{"detail": "bad"}]}),
        };
        assert_eq!(err.payload(), json!({"errors": [{"detail": "bad"}]}));
        assert!(!err.is_cancel());
    }

    #[test]
    fn test_cancel_is_recognised() {
        let err = ClientError::Cancelled("stale".to_string());
        assert!(err.is_cancel());
        assert_eq!(err.payload(), json!("request cancelled: stale"));
    }
}
