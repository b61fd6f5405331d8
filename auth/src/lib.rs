//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for the bookshelf services:
//! - Password hashing (Argon2id)
//! - JWT token generation and validation
//! - Login coordination
//! - The bearer-token gate that turns an `Authorization` header into a
//!   per-request security context
//!
//! The gate depends only on the `http` types. Each service wraps
//! [`BearerTokenGate::authenticate_request`] in its own middleware and
//! supplies its own user lookup.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Login and token validation
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", 24);
//! let hash = auth.hash_password("password123").unwrap();
//!
//! let issued = auth.login("alice", 1, "password123", &hash).unwrap();
//! let claims = auth.validate_token(&issued.access_token).unwrap();
//! assert_eq!(claims.username(), Some("alice"));
//! ```

pub mod authenticator;
pub mod gate;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::IssuedToken;
pub use authenticator::TOKEN_ISSUER;
pub use gate::bearer_token_from;
pub use gate::Authentication;
pub use gate::BearerTokenGate;
pub use gate::GateError;
pub use gate::JwtTokenVerifier;
pub use gate::LookupError;
pub use gate::RequestDetails;
pub use gate::SecurityContext;
pub use gate::TokenVerifier;
pub use gate::UserDetails;
pub use gate::UserDetailsService;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
