use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Bearer token payload.
///
/// `sub` carries the username the token was issued to. Anything a service
/// wants to add beyond the registered claims goes into `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (username)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims for a logged-in user, expiring `expiration_hours` from now.
    ///
    /// # Arguments
    /// * `username` - Becomes the token subject
    /// * `user_id` - Numeric account id (stored in `extra.user_id`)
    /// * `expiration_hours` - Hours until token expires
    pub fn for_user(username: impl ToString, user_id: i64, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(expiration_hours);

        Self::new()
            .with_subject(username)
            .with_issued_at(now.timestamp())
            .with_expiration(expiration.timestamp())
            .with_extra("user_id", user_id)
    }

    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    pub fn with_issuer(mut self, iss: impl ToString) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Add a custom field. Values that fail to serialize are skipped.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn username(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// Claims without `exp` never expire here; verifiers that require an
    /// expiry must check for it themselves.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| exp < current_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user() {
        let claims = Claims::for_user("alice", 42, 24);

        assert_eq!(claims.username(), Some("alice"));
        assert_eq!(claims.extra["user_id"], 42);

        let exp = claims.exp.unwrap();
        let iat = claims.iat.unwrap();
        assert_eq!(exp - iat, 24 * 60 * 60);
    }

    #[test]
    fn test_extra_fields_are_flattened() {
        let claims = Claims::new()
            .with_subject("alice")
            .with_issuer("auth-service")
            .with_extra("user_id", 7);

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], "alice");
        assert_eq!(json["iss"], "auth-service");
        assert_eq!(json["user_id"], 7);
        assert!(json.get("exp").is_none());
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims::new().with_expiration(1000);

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000));
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_is_expired_no_exp_claim() {
        assert!(!Claims::new().is_expired(9999999999));
    }
}
