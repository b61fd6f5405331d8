use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::UserDetails;
use reqwest::Method;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::registry::ServiceName;
use super::registry::ServiceRegistry;
use crate::book::errors::SiblingError;
use crate::domain::book::models::BookId;
use crate::domain::book::models::Caller;
use crate::domain::book::models::UserId;
use crate::domain::book::ports::SiblingServices;

/// Response envelope used by the auth service.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// HTTP client for sibling services.
///
/// Every call is bounded by the configured timeout, covering connect, send
/// and reading the body, and forwards the caller's bearer token.
#[derive(Clone)]
pub struct SiblingClient {
    http: reqwest::Client,
    registry: Arc<ServiceRegistry>,
    timeout: Duration,
}

impl SiblingClient {
    pub fn new(registry: Arc<ServiceRegistry>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            registry,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, service: ServiceName, call: F) -> Result<T, SiblingError>
    where
        F: Future<Output = Result<T, SiblingError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                tracing::warn!(
                    service = %service,
                    timeout_ms = self.timeout_ms(),
                    "Sibling call timed out"
                );
                SiblingError::Timeout {
                    service: service.to_string(),
                    timeout_ms: self.timeout_ms(),
                }
            })?
    }

    async fn send(
        &self,
        service: ServiceName,
        method: Method,
        segments: &[&str],
        token: &str,
    ) -> Result<Response, SiblingError> {
        let url = self.registry.url(service, segments)?;
        tracing::debug!(service = %service, method = %method, url = %url, "Calling sibling");

        let response = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.transport_error(service, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiblingError::Status {
                service: service.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: ServiceName,
        segments: &[&str],
        token: &str,
    ) -> Result<T, SiblingError> {
        self.bounded(service, async {
            let response = self.send(service, Method::GET, segments, token).await?;
            response
                .json::<T>()
                .await
                .map_err(|e| self.transport_error(service, e))
        })
        .await
    }

    async fn get_text(
        &self,
        service: ServiceName,
        segments: &[&str],
        token: &str,
    ) -> Result<String, SiblingError> {
        self.bounded(service, async {
            let response = self.send(service, Method::GET, segments, token).await?;
            response
                .text()
                .await
                .map_err(|e| self.transport_error(service, e))
        })
        .await
    }

    /// POST without a body; the response body is read and discarded.
    async fn post(
        &self,
        service: ServiceName,
        segments: &[&str],
        token: &str,
    ) -> Result<(), SiblingError> {
        self.bounded(service, async {
            let response = self.send(service, Method::POST, segments, token).await?;
            response
                .bytes()
                .await
                .map(|_| ())
                .map_err(|e| self.transport_error(service, e))
        })
        .await
    }

    /// User record as the auth service reports it.
    pub async fn user_details(
        &self,
        username: &str,
        token: &str,
    ) -> Result<UserDetails, SiblingError> {
        self.get_json::<Envelope<UserDetails>>(
            ServiceName::Auth,
            &["api", "v1", "auth", "users", username],
            token,
        )
        .await
        .map(|envelope| envelope.data)
    }

    fn transport_error(&self, service: ServiceName, err: reqwest::Error) -> SiblingError {
        if err.is_timeout() {
            SiblingError::Timeout {
                service: service.to_string(),
                timeout_ms: self.timeout_ms(),
            }
        } else if err.is_decode() {
            SiblingError::Decode {
                service: service.to_string(),
                message: err.to_string(),
            }
        } else {
            SiblingError::Transport {
                service: service.to_string(),
                message: err.to_string(),
            }
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Subscription service answers with a bare genre, sometimes JSON-quoted.
fn parse_genre(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string())
}

#[async_trait]
impl SiblingServices for SiblingClient {
    async fn resolve_user_id(&self, caller: &Caller) -> Result<UserId, SiblingError> {
        self.get_json::<Envelope<i64>>(
            ServiceName::Auth,
            &["api", "v1", "auth", "get-user-id"],
            &caller.token,
        )
        .await
        .map(|envelope| UserId(envelope.data))
    }

    async fn subscribed_genre(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<String, SiblingError> {
        let user_id = user_id.to_string();
        self.get_text(
            ServiceName::Subscription,
            &["api", "v1", "subscription", &user_id],
            &caller.token,
        )
        .await
        .map(|body| parse_genre(&body))
    }

    async fn subscribe(
        &self,
        caller: &Caller,
        genre: &str,
        user_id: UserId,
    ) -> Result<(), SiblingError> {
        let user_id = user_id.to_string();
        self.post(
            ServiceName::Subscription,
            &["api", "v1", "subscription", genre, &user_id],
            &caller.token,
        )
        .await
    }

    async fn send_subscription_message(&self, caller: &Caller) -> Result<(), SiblingError> {
        self.post(
            ServiceName::Auth,
            &["api", "v1", "auth", "send-message"],
            &caller.token,
        )
        .await
    }

    async fn record_download(
        &self,
        caller: &Caller,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<(), SiblingError> {
        let (book_id, user_id) = (book_id.to_string(), user_id.to_string());
        self.post(
            ServiceName::Downloads,
            &["api", "v1", "downloads", &book_id, &user_id],
            &caller.token,
        )
        .await
    }

    async fn list_downloads(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<BookId>, SiblingError> {
        let user_id = user_id.to_string();
        self.get_json::<Vec<i64>>(
            ServiceName::Downloads,
            &["api", "v1", "downloads", "getDownloads", &user_id],
            &caller.token,
        )
        .await
        .map(|ids| ids.into_iter().map(BookId).collect())
    }

    async fn add_to_wishlist(
        &self,
        caller: &Caller,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<(), SiblingError> {
        let (book_id, user_id) = (book_id.to_string(), user_id.to_string());
        self.post(
            ServiceName::Wishlist,
            &["api", "v1", "wishlist", &book_id, &user_id],
            &caller.token,
        )
        .await
    }

    async fn list_wishlist(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<BookId>, SiblingError> {
        let user_id = user_id.to_string();
        self.get_json::<Vec<i64>>(
            ServiceName::Wishlist,
            &["api", "v1", "wishlist", "get-wish", &user_id],
            &caller.token,
        )
        .await
        .map(|ids| ids.into_iter().map(BookId).collect())
    }

    async fn fetch_review(
        &self,
        caller: &Caller,
        book_id: BookId,
    ) -> Result<serde_json::Value, SiblingError> {
        let book_id = book_id.to_string();
        self.get_json(
            ServiceName::Review,
            &["api", "v1", "review", "get-review", &book_id],
            &caller.token,
        )
        .await
    }
}
