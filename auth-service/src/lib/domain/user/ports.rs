use async_trait::async_trait;

use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::MessageSenderError;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is empty
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Check credentials and issue a bearer token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user, disabled account or wrong password
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, username: &Username, password: &str) -> Result<LoginOutcome, UserError>;

    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError>;

    /// Notify a user that a book in their subscribed genre was published.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `MessageDelivery` - The message could not be handed off
    async fn send_subscription_message(&self, username: &Username) -> Result<(), UserError>;
}

/// Persistence operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new account and return it with its assigned id.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
}

/// Outgoing notifications to users.
#[async_trait]
pub trait MessageSender: Send + Sync + 'static {
    async fn send_subscription_message(&self, recipient: &User) -> Result<(), MessageSenderError>;
}
