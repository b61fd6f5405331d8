use std::sync::Arc;

use async_trait::async_trait;
use auth::LookupError;
use auth::UserDetails;
use auth::UserDetailsService;

use super::client::SiblingClient;
use crate::book::errors::SiblingError;

/// Gate user lookup that asks the auth service, presenting the caller's own
/// token.
pub struct RemoteUserDetails {
    client: Arc<SiblingClient>,
}

impl RemoteUserDetails {
    pub fn new(client: Arc<SiblingClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDetailsService for RemoteUserDetails {
    async fn load_user_by_username(
        &self,
        username: &str,
        presented_token: &str,
    ) -> Result<UserDetails, LookupError> {
        match self.client.user_details(username, presented_token).await {
            Ok(details) => Ok(details),
            // The auth service answers 401 when its own gate cannot find the user.
            Err(SiblingError::Status {
                status: 401 | 404, ..
            }) => Err(LookupError::NotFound(username.to_string())),
            Err(e) => {
                tracing::error!(username = %username, error = %e, "User lookup failed");
                Err(LookupError::Unavailable(e.to_string()))
            }
        }
    }
}
