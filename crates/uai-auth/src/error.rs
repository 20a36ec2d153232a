//! Error types for the auth crate.

use thiserror::Error;

/// Errors produced while issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, tampered, forged or wrong-scope token.
    #[error("invalid token")]
    Invalid,

    /// Authentic token whose expiry has passed.
    #[error("token has expired")]
    Expired,

    /// The token could not be produced.
    #[error("failed to issue token: {0}")]
    Issue(String),
}

/// Errors produced while loading or generating a token key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("token key is not valid hex: {0}")]
    InvalidHex(String),

    #[error("token key must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("no token key configured")]
    Missing,
}

/// Errors produced by the credential hasher.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password digest is malformed: {0}")]
    MalformedDigest(String),

    #[error("invalid hasher parameters: {0}")]
    InvalidParams(String),
}
