//! Access token inspection
//!
//! The client only reads the `exp` claim out of the token payload to decide
//! whether a stored session is still worth presenting. Signatures are not
//! verified here: the backend is the only party that validates claims, so a
//! forged or tampered token merely earns a 401 on the next request.

use base64::{
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    Engine as _,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Malformed token: expected 3 segments, found {0}")]
    MalformedToken(usize),
    #[error("Token payload is not valid base64url: {0}")]
    PayloadEncoding(String),
    #[error("Token payload is not a valid claims object: {0}")]
    PayloadClaims(String),
}

/// Claims the client cares about. Anything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    /// Expiry, seconds since the epoch.
    pub exp: f64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl AccessClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp.floor() as i64, 0)
    }

    pub fn is_expired_at(&self, now_seconds: i64) -> bool {
        self.exp <= now_seconds as f64
    }
}

/// Decode the middle segment of a JWT-shaped token.
pub fn decode_claims(token: &str) -> Result<AccessClaims, JwtError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(JwtError::MalformedToken(segments.len()));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|e| JwtError::PayloadEncoding(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| JwtError::PayloadClaims(e.to_string()))
}

/// Whether `token` is present and its `exp` lies strictly in the future.
///
/// Expired and undecodable tokens are both simply invalid.
pub fn is_token_valid(token: Option<&str>) -> bool {
    is_token_valid_at(token, Utc::now().timestamp())
}

pub fn is_token_valid_at(token: Option<&str>, now_seconds: i64) -> bool {
    match token {
        None => false,
        Some(token) => decode_claims(token)
            .map(|claims| !claims.is_expired_at(now_seconds))
            .unwrap_or(false),
    }
}
