//! # uai-auth
//!
//! Credential digests and scoped tokens for the Uai user service.
//!
//! This crate provides:
//! - Argon2id password hashing behind the [`CredentialHasher`] trait
//! - Symmetric, authenticated-encrypted tokens behind the [`TokenMaker`] trait
//! - Hex key loading and generation for the token key
//!
//! ## Token scopes
//!
//! | Scope | Issued by | Lifetime |
//! |-------|-----------|----------|
//! | `activation` | onboarding | 72 hours |
//! | `authentication` | activation, login | 1 hour |
//! | `password_reset` | (reserved) | 15 minutes |
//!
//! A token verified against the wrong scope is rejected exactly like a
//! forged one.

pub mod claims;
pub mod error;
pub mod keys;
pub mod password;
pub mod token;

pub use claims::{Payload, Scope};
pub use error::{KeyError, PasswordError, TokenError};
pub use keys::SymmetricKey;
pub use password::{Argon2Hasher, CredentialHasher};
pub use token::{IssuedToken, ScopedTokenMaker, TOKEN_PREFIX, TokenMaker};
