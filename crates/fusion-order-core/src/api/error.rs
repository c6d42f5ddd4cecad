use thiserror::Error;

/// Message used when the server rejects a call without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Every failure the dispatcher can hand back to a caller.
///
/// Callers that only want something to show the user should use
/// [`ApiError::message`]; the variants exist for callers that need to
/// distinguish a server rejection from a dead network.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with an envelope whose code is not 200.
    #[error("{message}")]
    Rejected { code: Option<i64>, message: String },

    /// The server answered with an HTTP error and a body that is not an envelope.
    #[error("Request failed with status {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Credential store error: {0}")]
    Credentials(String),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build a rejection, substituting the generic message for a missing or empty one.
    pub fn rejected(code: Option<i64>, message: Option<&str>) -> Self {
        let message = match message {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => DEFAULT_FAILURE_MESSAGE.to_string(),
        };
        ApiError::Rejected { code, message }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Http {
            status,
            body: Self::truncate_body(body),
        }
    }

    /// The user-facing message for this failure.
    pub fn message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this failure means the session is no longer authenticated.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ApiError::Rejected { code, .. } => *code == Some(401),
            ApiError::Http { status, .. } => *status == reqwest::StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// Server-side code attached to the failure, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            ApiError::Rejected { code, .. } => *code,
            ApiError::Http { status, .. } => Some(i64::from(status.as_u16())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uses_server_message() {
        let err = ApiError::rejected(Some(400), Some("invalid quantity"));
        assert_eq!(err.message(), "invalid quantity");
        assert_eq!(err.to_string(), "invalid quantity");
        assert_eq!(err.code(), Some(400));
    }

    #[test]
    fn test_rejected_falls_back_on_missing_or_empty_message() {
        assert_eq!(ApiError::rejected(Some(500), None).message(), DEFAULT_FAILURE_MESSAGE);
        assert_eq!(ApiError::rejected(Some(500), Some("")).message(), DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(ApiError::rejected(Some(401), Some("token expired")).is_auth_failure());
        assert!(!ApiError::rejected(Some(403), Some("forbidden")).is_auth_failure());
        assert!(ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, "").is_auth_failure());
        assert!(!ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, "").is_auth_failure());
        assert!(!ApiError::Decode("bad".to_string()).is_auth_failure());
    }

    #[test]
    fn test_http_error_body_is_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 100);
        match ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, &body) {
            ApiError::Http { body, .. } => {
                assert!(body.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
                assert!(body.contains("truncated, 600 total bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
