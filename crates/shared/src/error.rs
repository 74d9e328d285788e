use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the alert service on any non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ApiException {
    pub status: u16,
    pub message: String,
}

impl ApiException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ApiException> for ApiError {
    fn from(value: ApiException) -> Self {
        Self {
            message: value.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_and_ignores_extra_fields() {
        let parsed: ApiError =
            serde_json::from_str(r#"{"message":"invalid phone number","code":21211}"#)
                .expect("parse");
        assert_eq!(parsed, ApiError::new("invalid phone number"));
    }

    #[test]
    fn exception_keeps_message_when_converted() {
        let err: ApiError = ApiException::new(400, "bad code").into();
        assert_eq!(err.message, "bad code");
    }
}
