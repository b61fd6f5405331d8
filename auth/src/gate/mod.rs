//! Bearer-token authentication gate.
//!
//! Decides, once per request, whether the request's security context gets an
//! authenticated principal. The gate never rejects a request for lacking or
//! presenting a bad token; it only leaves the context empty and lets
//! downstream authorization decide. The one failure it surfaces is a user
//! lookup error, which aborts the request.

pub mod context;
pub mod request;
pub mod verifier;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use context::Authentication;
pub use context::RequestDetails;
pub use context::SecurityContext;
pub use context::UserDetails;
pub use request::authorization_header;
pub use request::bearer_token_from;
pub use verifier::JwtTokenVerifier;

const BEARER_PREFIX: &str = "Bearer ";

/// Derives identities from tokens and checks a token against a user record.
pub trait TokenVerifier: Send + Sync + 'static {
    /// Username the token was issued to, or `None` if the token cannot be
    /// trusted (malformed, forged, expired).
    fn extract_username(&self, token: &str) -> Option<String>;

    /// Whether the token is still valid for this particular user.
    fn is_token_valid(&self, token: &str, user: &UserDetails) -> bool;
}

/// Lookup of user records by username.
#[async_trait]
pub trait UserDetailsService: Send + Sync + 'static {
    /// Load the user a verified token names.
    ///
    /// # Arguments
    /// * `username` - Subject derived from the token
    /// * `presented_token` - The bearer token itself, for lookups that call
    ///   another service on the caller's behalf
    ///
    /// # Errors
    /// * `NotFound` - No such user
    /// * `Unavailable` - The backing store could not be reached
    async fn load_user_by_username(
        &self,
        username: &str,
        presented_token: &str,
    ) -> Result<UserDetails, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User lookup unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Extract the token from an `Authorization` header value.
///
/// Only the exact `"Bearer "` prefix is recognised.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    authorization.strip_prefix(BEARER_PREFIX)
}

/// Generic over its capabilities; services usually hold it as
/// `BearerTokenGate<dyn TokenVerifier, dyn UserDetailsService>`.
pub struct BearerTokenGate<V, U>
where
    V: TokenVerifier + ?Sized,
    U: UserDetailsService + ?Sized,
{
    verifier: Arc<V>,
    users: Arc<U>,
}

impl<V, U> Clone for BearerTokenGate<V, U>
where
    V: TokenVerifier + ?Sized,
    U: UserDetailsService + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            users: Arc::clone(&self.users),
        }
    }
}

impl<V, U> BearerTokenGate<V, U>
where
    V: TokenVerifier + ?Sized,
    U: UserDetailsService + ?Sized,
{
    pub fn new(verifier: Arc<V>, users: Arc<U>) -> Self {
        Self { verifier, users }
    }

    /// Run the gate for one request.
    ///
    /// # Arguments
    /// * `authorization` - Raw `Authorization` header value, if any
    /// * `context` - Security context as it stands before the gate
    /// * `details` - Request metadata attached to a new authentication
    ///
    /// # Returns
    /// The context to hand to the next stage. It differs from the input only
    /// when the input had no authentication and the token proved valid.
    ///
    /// # Errors
    /// * `GateError::Lookup` - The token named a user that could not be loaded
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        mut context: SecurityContext,
        details: RequestDetails,
    ) -> Result<SecurityContext, GateError> {
        let Some(token) = authorization.and_then(bearer_token) else {
            return Ok(context);
        };

        let Some(username) = self.verifier.extract_username(token) else {
            return Ok(context);
        };

        if context.is_authenticated() {
            return Ok(context);
        }

        let user = self.users.load_user_by_username(&username, token).await?;

        if self.verifier.is_token_valid(token, &user) {
            tracing::debug!(
                username = %user.username,
                request_id = %details.request_id,
                "Request authenticated"
            );
            context.set_if_absent(Authentication::new(user, details));
        } else {
            tracing::debug!(username = %username, "Token not valid for user");
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::jwt::Claims;
    use crate::jwt::JwtHandler;

    const SECRET: &[u8] = b"gate_secret_key_at_least_32_bytes_long";

    mock! {
        pub TestUserDetailsService {}

        #[async_trait]
        impl UserDetailsService for TestUserDetailsService {
            async fn load_user_by_username(
                &self,
                username: &str,
                presented_token: &str,
            ) -> Result<UserDetails, LookupError>;
        }
    }

    fn alice() -> UserDetails {
        UserDetails {
            username: "alice".to_string(),
            authorities: vec!["ROLE_USER".to_string(), "ROLE_ADMIN".to_string()],
            enabled: true,
        }
    }

    fn token_for(username: &str, expiration_hours: i64) -> String {
        JwtHandler::new(SECRET)
            .encode(&Claims::for_user(username, 1, expiration_hours))
            .unwrap()
    }

    fn gate(
        users: MockTestUserDetailsService,
    ) -> BearerTokenGate<JwtTokenVerifier, MockTestUserDetailsService> {
        BearerTokenGate::new(
            Arc::new(JwtTokenVerifier::new(JwtHandler::new(SECRET))),
            Arc::new(users),
        )
    }

    fn details() -> RequestDetails {
        RequestDetails::new(None)
    }

    #[tokio::test]
    async fn test_missing_header_passes_through() {
        let mut users = MockTestUserDetailsService::new();
        users.expect_load_user_by_username().times(0);

        let context = gate(users)
            .authenticate(None, SecurityContext::empty(), details())
            .await
            .unwrap();

        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_non_bearer_header_passes_through() {
        let mut users = MockTestUserDetailsService::new();
        users.expect_load_user_by_username().times(0);
        let gate = gate(users);

        for header in ["Basic YWxpY2U6cGFzcw==", "bearer abc", "Bearer"] {
            let context = gate
                .authenticate(Some(header), SecurityContext::empty(), details())
                .await
                .unwrap();
            assert!(!context.is_authenticated(), "header {header:?}");
        }
    }

    #[tokio::test]
    async fn test_valid_token_sets_authentication() {
        let token = token_for("alice", 1);
        let mut users = MockTestUserDetailsService::new();
        let expected_token = token.clone();
        users
            .expect_load_user_by_username()
            .withf(move |username, presented| {
                username == "alice" && presented == expected_token
            })
            .times(1)
            .returning(|_, _| Ok(alice()));

        let header = format!("Bearer {token}");
        let request = details();
        let context = gate(users)
            .authenticate(Some(&header), SecurityContext::empty(), request.clone())
            .await
            .unwrap();

        let authentication = context.authentication().expect("should be authenticated");
        assert_eq!(authentication.username(), "alice");
        assert_eq!(authentication.authorities, alice().authorities);
        assert_eq!(authentication.details, request);
    }

    #[tokio::test]
    async fn test_existing_authentication_is_not_overwritten() {
        let mut users = MockTestUserDetailsService::new();
        users.expect_load_user_by_username().times(0);

        let bob = UserDetails {
            username: "bob".to_string(),
            authorities: vec!["ROLE_USER".to_string()],
            enabled: true,
        };
        let existing = SecurityContext::authenticated(Authentication::new(bob, details()));

        let header = format!("Bearer {}", token_for("alice", 1));
        let context = gate(users)
            .authenticate(Some(&header), existing.clone(), details())
            .await
            .unwrap();

        assert_eq!(context, existing);
    }

    #[tokio::test]
    async fn test_malformed_token_fails_closed() {
        let mut users = MockTestUserDetailsService::new();
        users.expect_load_user_by_username().times(0);

        let context = gate(users)
            .authenticate(Some("Bearer not.a.jwt"), SecurityContext::empty(), details())
            .await
            .unwrap();

        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_token_leaves_context_unset() {
        let mut users = MockTestUserDetailsService::new();
        users.expect_load_user_by_username().times(0);

        let header = format!("Bearer {}", token_for("alice", -1));
        let context = gate(users)
            .authenticate(Some(&header), SecurityContext::empty(), details())
            .await
            .unwrap();

        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_token_without_expiry_leaves_context_unset() {
        let mut users = MockTestUserDetailsService::new();
        users.expect_load_user_by_username().times(0);

        let token = JwtHandler::new(SECRET)
            .encode(&Claims::new().with_subject("alice"))
            .unwrap();
        let header = format!("Bearer {token}");
        let context = gate(users)
            .authenticate(Some(&header), SecurityContext::empty(), details())
            .await
            .unwrap();

        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_disabled_user_is_not_authenticated() {
        let mut users = MockTestUserDetailsService::new();
        users
            .expect_load_user_by_username()
            .times(1)
            .returning(|_, _| {
                Ok(UserDetails {
                    enabled: false,
                    ..alice()
                })
            });

        let header = format!("Bearer {}", token_for("alice", 1));
        let context = gate(users)
            .authenticate(Some(&header), SecurityContext::empty(), details())
            .await
            .unwrap();

        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_unknown_user_aborts_request() {
        let mut users = MockTestUserDetailsService::new();
        users
            .expect_load_user_by_username()
            .times(1)
            .returning(|username, _| Err(LookupError::NotFound(username.to_string())));

        let header = format!("Bearer {}", token_for("ghost", 1));
        let result = gate(users)
            .authenticate(Some(&header), SecurityContext::empty(), details())
            .await;

        assert_eq!(
            result.unwrap_err(),
            GateError::Lookup(LookupError::NotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_bearer_token_prefix() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), Some(""));
        assert_eq!(bearer_token("Token abc"), None);
    }
}
