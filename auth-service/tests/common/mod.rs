use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::BearerTokenGate;
use auth::Claims;
use auth::JwtHandler;
use auth::JwtTokenVerifier;
use auth::TokenVerifier;
use auth::UserDetailsService;
use auth_service::domain::user::models::NewUser;
use auth_service::domain::user::models::User;
use auth_service::domain::user::models::UserId;
use auth_service::domain::user::models::Username;
use auth_service::domain::user::ports::MessageSender;
use auth_service::domain::user::ports::UserRepository;
use auth_service::domain::user::ports::UserServicePort;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::user_details::LocalUserDetails;
use auth_service::user::errors::MessageSenderError;
use auth_service::user::errors::UserError;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// User store kept in memory, enforcing the same uniqueness rules as the
/// database constraints.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        let stored = User {
            id: UserId(users.len() as i64 + 1),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            enabled: true,
            created_at: user.created_at,
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.username == username).cloned())
    }
}

/// Records recipients instead of delivering.
#[derive(Default)]
pub struct RecordingMessageSender {
    pub recipients: Mutex<Vec<String>>,
}

#[async_trait]
impl MessageSender for RecordingMessageSender {
    async fn send_subscription_message(&self, recipient: &User) -> Result<(), MessageSenderError> {
        self.recipients
            .lock()
            .unwrap()
            .push(recipient.username.to_string());
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub messages: Arc<RecordingMessageSender>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let messages = Arc::new(RecordingMessageSender::default());
        let user_service: Arc<dyn UserServicePort> = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::clone(&messages),
            Arc::new(Authenticator::new(JWT_SECRET, 24)),
        ));

        let verifier: Arc<dyn TokenVerifier> =
            Arc::new(JwtTokenVerifier::new(JwtHandler::new(JWT_SECRET)));
        let user_details: Arc<dyn UserDetailsService> =
            Arc::new(LocalUserDetails::new(Arc::clone(&user_service)));

        let router = create_router(user_service, BearerTokenGate::new(verifier, user_details));

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET),
            messages,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register an account and log it in, returning the issued token.
    pub async fn register_and_login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = self
            .post("/api/v1/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");

        body["data"]["token"]
            .as_str()
            .expect("token missing")
            .to_string()
    }

    /// Sign a token directly, bypassing login.
    pub fn token_for(&self, username: &str, expiration_hours: i64) -> String {
        self.jwt_handler
            .encode(&Claims::for_user(username, 1, expiration_hours))
            .expect("Failed to sign token")
    }
}
