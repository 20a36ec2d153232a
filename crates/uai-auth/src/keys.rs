//! Symmetric key for token encryption.

use crate::error::KeyError;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// The secret shared by every token issuer and verifier of a deployment.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_LENGTH],
}

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        rand::rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Load a key from a hex string. Surrounding whitespace is ignored.
    pub fn from_hex(encoded: &str) -> Result<Self, KeyError> {
        let mut decoded =
            hex::decode(encoded.trim()).map_err(|e| KeyError::InvalidHex(e.to_string()))?;
        let key = Self::from_bytes(&decoded);
        decoded.zeroize();
        key
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_hex_roundtrip() {
        let key = SymmetricKey::generate();
        let hex = key.to_hex();
        assert_eq!(hex.len(), KEY_LENGTH * 2);

        let loaded = SymmetricKey::from_hex(&format!("  {hex}\n")).unwrap();
        assert_eq!(loaded.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(
            SymmetricKey::generate().as_bytes(),
            SymmetricKey::generate().as_bytes()
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = SymmetricKey::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            KeyError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn test_non_hex_rejected() {
        assert!(matches!(
            SymmetricKey::from_hex("not-hex"),
            Err(KeyError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SymmetricKey::generate();
        assert_eq!(format!("{key:?}"), "SymmetricKey(<redacted>)");
    }
}
