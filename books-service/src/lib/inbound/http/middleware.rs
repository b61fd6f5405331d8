use std::net::SocketAddr;

use async_trait::async_trait;
use auth::bearer_token_from;
use auth::SecurityContext;
use axum::extract::ConnectInfo;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::book::models::Caller;
use crate::inbound::http::router::AppState;

/// Runs the bearer-token gate and stores the resulting security context in
/// the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    state
        .gate
        .authenticate_request(&mut req, remote_addr)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Gate rejected request");
            ApiError::from(e)
        })?;

    Ok(next.run(req).await)
}

/// Authenticated caller, carrying the token to forward to siblings.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::Unauthorized("Authentication required".to_string());

        let username = parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::authentication)
            .map(|authentication| authentication.username().to_string())
            .ok_or_else(unauthorized)?;

        let token = bearer_token_from(&parts.headers).ok_or_else(unauthorized)?;

        Ok(AuthenticatedCaller(Caller::new(username, token)))
    }
}
