//! The server's uniform response wrapper and how raw bodies are classified.
//!
//! Every endpoint that follows the convention answers with
//! `{ code, message, data, timestamp }`. A few do not; their bodies are
//! handed back untouched.

use reqwest::StatusCode;
use serde_json::{Map, Value};

use super::ApiError;

/// Envelope code that marks a successful call.
pub const SUCCESS_CODE: i64 = 200;

/// A decoded `{ code, message, data, timestamp }` wrapper.
///
/// `code` keeps the raw JSON value so that a missing code can be told apart
/// from a malformed one.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub code: Option<Value>,
    pub message: Option<String>,
    pub data: Value,
    pub timestamp: Option<Value>,
}

impl Envelope {
    fn from_map(mut map: Map<String, Value>) -> Self {
        let message = match map.remove("message") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        Self {
            code: map.remove("code"),
            message,
            data: map.remove("data").unwrap_or(Value::Null),
            timestamp: map.remove("timestamp"),
        }
    }

    /// The numeric code, if the server sent one as an integer.
    pub fn code_value(&self) -> Option<i64> {
        self.code.as_ref().and_then(Value::as_i64)
    }

    /// An absent code counts as success; a present one must equal 200.
    pub fn is_success(&self) -> bool {
        match &self.code {
            None => true,
            Some(code) => code.as_f64() == Some(SUCCESS_CODE as f64),
        }
    }

    /// Unwrap to `data`, or reject with the server's message.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::rejected(self.code_value(), self.message.as_deref()))
        }
    }
}

/// A response body, sorted into enveloped and raw shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Enveloped(Envelope),
    Raw(Value),
}

impl Payload {
    /// Any object carrying a `data` key is treated as an envelope.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("data") => {
                Payload::Enveloped(Envelope::from_map(map))
            }
            other => Payload::Raw(other),
        }
    }

    /// Resolve a successful HTTP response to the value the caller asked for.
    pub fn into_data(self) -> Result<Value, ApiError> {
        match self {
            Payload::Enveloped(envelope) => envelope.into_result(),
            Payload::Raw(value) => Ok(value),
        }
    }
}

/// Parse a body as JSON. Empty bodies become `null`, anything unparseable
/// is kept as a string.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// The outcome of an HTTP error response.
#[derive(Debug)]
pub struct Failure {
    pub error: ApiError,
    /// The failure revoked the session: the credential must be cleared.
    pub auth_lost: bool,
}

/// Map a non-2xx response to the error the caller sees.
///
/// Error bodies only need a `code` key to be read as an envelope; the
/// success path needs `data`.
pub fn failure_from_response(status: StatusCode, text: &str) -> Failure {
    let status_unauthorized = status == StatusCode::UNAUTHORIZED;
    match parse_body(text) {
        Value::Object(map) if map.contains_key("code") => {
            let envelope = Envelope::from_map(map);
            let code = envelope.code_value();
            Failure {
                auth_lost: status_unauthorized || code == Some(401),
                error: ApiError::rejected(code, envelope.message.as_deref()),
            }
        }
        _ => Failure {
            auth_lost: status_unauthorized,
            error: ApiError::from_status(status, text),
        },
    }
}
