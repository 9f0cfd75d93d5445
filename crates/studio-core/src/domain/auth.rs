//! Authentication payloads and the login/register outcome

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use studio_shared::constants::NETWORK_ERROR_DETAIL;

use crate::error::ClientError;

/// Token pair issued by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Successful login: the stored token pair plus the token endpoint's body
/// exactly as sent, extra fields included.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    pub tokens: TokenPair,
    pub body: Value,
}

impl LoginSuccess {
    /// Pulls the pair out of a token endpoint body.
    pub fn from_body(body: Value) -> Result<Self, serde_json::Error> {
        let tokens = TokenPair::deserialize(&body)?;
        Ok(Self { tokens, body })
    }
}

/// Server error payload, kept exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody(Value);

impl ErrorBody {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// `{"detail": "Network error"}`
    pub fn network_error() -> Self {
        Self::with_detail(NETWORK_ERROR_DETAIL)
    }

    pub fn with_detail(detail: &str) -> Self {
        Self(json!({ "detail": detail }))
    }

    pub fn detail(&self) -> Option<&str> {
        self.0.get("detail").and_then(Value::as_str)
    }

    /// Per-field messages, e.g. `{"email": ["already taken"]}`.
    pub fn field_messages(&self) -> BTreeMap<String, Vec<String>> {
        let mut fields = BTreeMap::new();
        let Some(object) = self.0.as_object() else {
            return fields;
        };

        for (field, value) in object {
            if field == "detail" {
                continue;
            }
            let messages: Vec<String> = match value {
                Value::String(message) => vec![message.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            if !messages.is_empty() {
                fields.insert(field.clone(), messages);
            }
        }
        fields
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => f.write_str(detail),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Result of login and registration.
///
/// These two operations never return `Err`: rejections and transport
/// failures both come back as `Failure`.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome<T> {
    Success(T),
    Failure(ErrorBody),
}

impl<T> AuthOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            AuthOutcome::Success(_) => None,
            AuthOutcome::Failure(body) => Some(body),
        }
    }

    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            AuthOutcome::Success(data) => Ok(data),
            AuthOutcome::Failure(body) => Err(ClientError::ValidationRejected(body)),
        }
    }
}
