use std::net::SocketAddr;

use async_trait::async_trait;
use auth::Authentication;
use auth::SecurityContext;
use axum::extract::ConnectInfo;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Runs the bearer-token gate and stores the resulting security context in
/// the request extensions.
///
/// Requests without a usable token continue unauthenticated; handlers that
/// need a principal use the [`Authenticated`] extractor.
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

/// Principal of an authenticated request.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Authentication);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::authentication)
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}
