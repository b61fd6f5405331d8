use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// `iss` claim of every token the authenticator issues.
pub const TOKEN_ISSUER: &str = "bookshelf-auth";

/// Login coordinator: checks a password against its stored hash and issues
/// a bearer token for the user on success.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    expiration_hours: i64,
}

/// Token handed back to a client after a successful login.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `expiration_hours` - Lifetime of issued tokens
    pub fn new(jwt_secret: &[u8], expiration_hours: i64) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
            expiration_hours,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a user's password and issue a token bound to their username.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable
    /// * `JwtError` - Token generation failed
    pub fn login(
        &self,
        username: &str,
        user_id: i64,
        password: &str,
        stored_hash: &str,
    ) -> Result<IssuedToken, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue(username, user_id)?)
    }

    /// Reject a login for an account that does not exist, after doing the
    /// same hashing work a real attempt would.
    pub fn reject_unknown_user(&self, password: &str) -> AuthenticationError {
        self.password_hasher.verify_decoy(password);
        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    pub fn issue(&self, username: &str, user_id: i64) -> Result<IssuedToken, JwtError> {
        let claims =
            Claims::for_user(username, user_id, self.expiration_hours).with_issuer(TOKEN_ISSUER);
        let access_token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            expires_at: claims.exp.unwrap_or_default(),
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_login_success() {
        let authenticator = Authenticator::new(SECRET, 24);
        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let issued = authenticator
            .login("alice", 7, "my_password", &hash)
            .expect("Login failed");

        let claims = authenticator
            .validate_token(&issued.access_token)
            .expect("Token validation failed");
        assert_eq!(claims.username(), Some("alice"));
        assert_eq!(claims.extra["user_id"], 7);
        assert_eq!(claims.iss.as_deref(), Some(TOKEN_ISSUER));
        assert_eq!(claims.exp, Some(issued.expires_at));
    }

    #[test]
    fn test_login_wrong_password() {
        let authenticator = Authenticator::new(SECRET, 24);
        let hash = authenticator.hash_password("my_password").unwrap();

        let result = authenticator.login("alice", 7, "wrong_password", &hash);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_reject_unknown_user() {
        let authenticator = Authenticator::new(SECRET, 24);
        assert!(matches!(
            authenticator.reject_unknown_user("whatever"),
            AuthenticationError::InvalidCredentials
        ));
    }

    #[test]
    fn test_validate_token_from_other_secret() {
        let issuer = Authenticator::new(b"another_secret_key_at_least_32_bytes", 1);
        let validator = Authenticator::new(SECRET, 1);

        let issued = issuer.issue("alice", 1).unwrap();
        assert!(validator.validate_token(&issued.access_token).is_err());
    }
}
