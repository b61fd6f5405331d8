use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as _;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Argon2id password hashing with PHC-formatted output.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    // Hash of a throwaway password, verified against when the account does not exist.
    decoy_hash: Option<String>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        let mut hasher = Self {
            argon2: Argon2::default(),
            decoy_hash: None,
        };
        hasher.decoy_hash = hasher.hash("decoy-password-for-unknown-users").ok();
        hasher
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 rejected the input or parameters
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check a plaintext password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    /// * `MalformedHash` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Spend the same work as a real verification when the user is unknown,
    /// so login latency does not reveal which usernames exist.
    pub fn verify_decoy(&self, password: &str) {
        if let Some(decoy) = &self.decoy_hash {
            let _ = self.verify(password, decoy);
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
