//! Argon2id credential digests.

use crate::error::PasswordError;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use uai_core::PasswordConfig;

/// One-way password digests with constant-time comparison.
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted PHC-format digest of `plaintext`.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// `Ok(false)` when `plaintext` does not match `digest`. `Err` only when the
    /// digest cannot be parsed or the hasher itself fails.
    fn matches(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError>;
}

/// Argon2id (v0x13) with configurable cost.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn matches(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(digest).map_err(|e| PasswordError::MalformedDigest(e.to_string()))?;

        // Cost parameters come from the digest itself, so digests produced
        // under older settings keep verifying.
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new(&PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_then_match() {
        let hasher = cheap();
        let digest = hasher.hash("correct horse").unwrap();
        assert!(digest.starts_with("$argon2id$v=19$"));
        assert!(hasher.matches("correct horse", &digest).unwrap());
    }

    #[test]
    fn test_wrong_password_is_false_not_error() {
        let hasher = cheap();
        let digest = hasher.hash("correct horse").unwrap();
        assert!(!hasher.matches("battery staple", &digest).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_error() {
        let hasher = cheap();
        assert!(matches!(
            hasher.matches("anything", "not-a-digest"),
            Err(PasswordError::MalformedDigest(_))
        ));
    }

    #[test]
    fn test_salted() {
        let hasher = cheap();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_digest_from_other_params_verifies() {
        let digest = cheap().hash("portable").unwrap();
        let other = Argon2Hasher::new(&PasswordConfig {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.matches("portable", &digest).unwrap());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = Argon2Hasher::new(&PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, PasswordError::InvalidParams(_)));
    }
}
