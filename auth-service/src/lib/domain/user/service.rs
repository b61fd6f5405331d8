use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::MessageSender;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
pub struct UserService<UR, MS>
where
    UR: UserRepository,
    MS: MessageSender,
{
    repository: Arc<UR>,
    message_sender: Arc<MS>,
    authenticator: Arc<Authenticator>,
}

impl<UR, MS> UserService<UR, MS>
where
    UR: UserRepository,
    MS: MessageSender,
{
    pub fn new(
        repository: Arc<UR>,
        message_sender: Arc<MS>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            repository,
            message_sender,
            authenticator,
        }
    }
}

impl From<AuthenticationError> for UserError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
            AuthenticationError::PasswordError(e) => {
                UserError::Unknown(format!("Password verification failed: {}", e))
            }
            AuthenticationError::JwtError(e) => {
                UserError::Unknown(format!("Token generation failed: {}", e))
            }
        }
    }
}

#[async_trait]
impl<UR, MS> UserServicePort for UserService<UR, MS>
where
    UR: UserRepository,
    MS: MessageSender,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if command.password.is_empty() {
            return Err(UserError::EmptyPassword);
        }

        let password_hash = self
            .authenticator
            .hash_password(&command.password)
            .map_err(|e| UserError::Unknown(format!("Password hashing failed: {}", e)))?;

        let user = self
            .repository
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash,
                role: Role::User,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    async fn login(&self, username: &Username, password: &str) -> Result<LoginOutcome, UserError> {
        let user = match self.repository.find_by_username(username).await? {
            Some(user) if user.enabled => user,
            _ => return Err(self.authenticator.reject_unknown_user(password).into()),
        };

        let token = self.authenticator.login(
            user.username.as_str(),
            user.id.0,
            password,
            &user.password_hash,
        )?;

        tracing::debug!(user_id = %user.id, "Token issued");

        Ok(LoginOutcome { user, token })
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn send_subscription_message(&self, username: &Username) -> Result<(), UserError> {
        let recipient = self.get_user_by_username(username).await?;
        self.message_sender
            .send_subscription_message(&recipient)
            .await?;
        Ok(())
    }
}
