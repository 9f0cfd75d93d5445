//! # Studio Security
//! 
//! Client-side access token inspection.

pub mod jwt;

pub use jwt::{decode_claims, is_token_valid, is_token_valid_at, AccessClaims, JwtError};
