use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{self, PasswordHasher, PasswordVerifier, SaltString},
};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

pub const PASSWORD_SALT_LEN: usize = 16;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing password failed: {0}")]
pub struct PasswordHashError(password_hash::Error);

/// A stored password in PHC string format.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an already-hashed PHC string, as read back from storage.
    #[must_use]
    pub fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    #[must_use]
    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl Debug for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasswordHash").field(&"[redacted]").finish()
    }
}

/// Hashes and verifies user passwords with Argon2id.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let salt_bytes: [u8; PASSWORD_SALT_LEN] = rand::random();
        let salt = SaltString::encode_b64(&salt_bytes).map_err(PasswordHashError)?;

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordHashError)?;

        Ok(PasswordHash(hash.to_string()))
    }

    /// Returns `Ok(false)` on a mismatch; errors only when the stored hash is unusable.
    pub fn verify(&self, stored: &PasswordHash, candidate: &str) -> Result<bool, PasswordHashError> {
        let parsed = password_hash::PasswordHash::new(&stored.0).map_err(PasswordHashError)?;

        match self.argon2().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError(err)),
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> CredentialHasher {
        CredentialHasher::new(Params::new(64, 1, 1, None).unwrap())
    }

    #[test]
    fn hash_verifies_only_the_hashed_password() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("hunter2").unwrap();

        assert!(hash.as_phc().starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "hunter2").unwrap());
        assert!(!hasher.verify(&hash, "hunter3").unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = cheap_hasher();

        assert_ne!(hasher.hash("x").unwrap(), hasher.hash("x").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let hasher = cheap_hasher();
        let stored = PasswordHash::from_phc("plaintext".to_owned());

        assert!(hasher.verify(&stored, "plaintext").is_err());
    }

    #[test]
    fn debug_output_is_redacted() {
        let hash = PasswordHash::from_phc("$argon2id$secret".to_owned());

        assert_eq!(format!("{hash:?}"), "PasswordHash(\"[redacted]\")");
    }
}
