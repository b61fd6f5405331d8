use std::sync::Arc;

use async_trait::async_trait;
use auth::LookupError;
use auth::UserDetails;
use auth::UserDetailsService;

use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::user::errors::UserError;

/// Gate user lookup backed by the local user store.
pub struct LocalUserDetails {
    users: Arc<dyn UserServicePort>,
}

impl LocalUserDetails {
    pub fn new(users: Arc<dyn UserServicePort>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDetailsService for LocalUserDetails {
    async fn load_user_by_username(
        &self,
        username: &str,
        _presented_token: &str,
    ) -> Result<UserDetails, LookupError> {
        let username = Username::new(username.to_string())
            .map_err(|_| LookupError::NotFound(username.to_string()))?;

        match self.users.get_user_by_username(&username).await {
            Ok(user) => Ok(user.to_details()),
            Err(UserError::NotFoundByUsername(name)) => Err(LookupError::NotFound(name)),
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed");
                Err(LookupError::Unavailable(e.to_string()))
            }
        }
    }
}
