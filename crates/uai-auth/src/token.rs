//! Scoped token issuing and verification.
//!
//! A token is `v1.local.` followed by the unpadded URL-safe base64 of
//! `nonce || ciphertext`. The ciphertext is the AES-256-GCM encryption of the
//! JSON [`Payload`], so subject, scope and expiry are all confidential and
//! tamper-evident.

use crate::claims::{Payload, Scope};
use crate::error::TokenError;
use crate::keys::SymmetricKey;
use aes_gcm::{
    Aes256Gcm, Key, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng, Payload as AeadPayload},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use uai_core::{Clock, SystemClock};
use uuid::Uuid;

/// Version and purpose header of every token.
pub const TOKEN_PREFIX: &str = "v1.local.";

/// Nonce length for AES-GCM (12 bytes standard)
const NONCE_LENGTH: usize = 12;

/// GCM authentication tag length.
const TAG_LENGTH: usize = 16;

/// Bound into the authentication tag so ciphertexts can't be replayed in
/// another context that shares the key.
const ASSOCIATED_DATA: &[u8] = b"uai.v1.local";

/// A freshly issued token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies purpose-bound tokens.
pub trait TokenMaker: Send + Sync {
    /// Issue a token for `subject` valid for `scope` only.
    fn issue(&self, subject: Uuid, scope: Scope) -> Result<IssuedToken, TokenError>;

    /// Verify `token` and require that it was issued for `required`.
    ///
    /// Undecodable, tampered and wrong-scope tokens all yield
    /// [`TokenError::Invalid`]. An authentic token past its expiry yields
    /// [`TokenError::Expired`].
    fn verify_token(&self, token: &str, required: Scope) -> Result<Payload, TokenError>;

    fn create_token(&self, subject: Uuid, scope: Scope) -> Result<String, TokenError> {
        self.issue(subject, scope).map(|issued| issued.token)
    }
}

/// [`TokenMaker`] backed by a single symmetric key.
pub struct ScopedTokenMaker {
    cipher: Aes256Gcm,
    clock: Arc<dyn Clock>,
}

impl ScopedTokenMaker {
    pub fn new(key: &SymmetricKey) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    pub fn with_clock(key: &SymmetricKey, clock: Arc<dyn Clock>) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { cipher, clock }
    }

    /// Build from a hex-encoded key, failing fast when it is malformed.
    pub fn from_hex(encoded: &str) -> Result<Self, crate::KeyError> {
        Ok(Self::new(&SymmetricKey::from_hex(encoded)?))
    }

    fn seal(&self, payload: &Payload) -> Result<String, TokenError> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|e| TokenError::Issue(e.to_string()))?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                AeadPayload {
                    msg: &plaintext,
                    aad: ASSOCIATED_DATA,
                },
            )
            .map_err(|e| TokenError::Issue(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(format!("{TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(sealed)))
    }

    fn open(&self, token: &str) -> Result<Payload, TokenError> {
        let body = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or(TokenError::Invalid)?;
        let sealed = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| TokenError::Invalid)?;
        if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(TokenError::Invalid);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                AeadPayload {
                    msg: ciphertext,
                    aad: ASSOCIATED_DATA,
                },
            )
            .map_err(|_| TokenError::Invalid)?;

        serde_json::from_slice(&plaintext).map_err(|_| TokenError::Invalid)
    }
}

impl TokenMaker for ScopedTokenMaker {
    fn issue(&self, subject: Uuid, scope: Scope) -> Result<IssuedToken, TokenError> {
        let payload = Payload::new(subject, scope, self.clock.now().trunc_subsecs(0));
        let token = self.seal(&payload)?;
        Ok(IssuedToken {
            token,
            expires_at: payload.expires_at,
        })
    }

    fn verify_token(&self, token: &str, required: Scope) -> Result<Payload, TokenError> {
        let payload = self.open(token)?;

        if payload.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }
        if payload.scope != required {
            tracing::debug!(
                expected = %required,
                actual = %payload.scope,
                "token scope mismatch"
            );
            return Err(TokenError::Invalid);
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for ScopedTokenMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedTokenMaker")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
