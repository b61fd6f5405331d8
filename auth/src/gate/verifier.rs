use chrono::Utc;

use super::context::UserDetails;
use super::TokenVerifier;
use crate::jwt::Claims;
use crate::jwt::JwtHandler;

/// Verifies HS256 bearer tokens whose subject is the username.
pub struct JwtTokenVerifier {
    handler: JwtHandler,
}

impl JwtTokenVerifier {
    pub fn new(handler: JwtHandler) -> Self {
        Self { handler }
    }

    /// Claims of a correctly signed token that carries an expiry.
    fn verified_claims(&self, token: &str) -> Option<Claims> {
        match self.handler.decode::<Claims>(token) {
            Ok(claims) if claims.exp.is_some() => Some(claims),
            Ok(_) => {
                tracing::debug!("Bearer token rejected: no expiry");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token rejected");
                None
            }
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn extract_username(&self, token: &str) -> Option<String> {
        self.verified_claims(token)?.sub
    }

    fn is_token_valid(&self, token: &str, user: &UserDetails) -> bool {
        let Some(claims) = self.verified_claims(token) else {
            return false;
        };

        let cutoff = Utc::now().timestamp() - self.handler.leeway_seconds() as i64;

        user.enabled
            && claims.username() == Some(user.username.as_str())
            && !claims.is_expired(cutoff)
    }
}
