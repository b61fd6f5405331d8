use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

pub async fn subscribe(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(genre): Path<String>,
) -> Result<ApiSuccess<SubscriptionData>, ApiError> {
    state
        .book_service
        .subscribe(&caller, &genre)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::ACCEPTED, SubscriptionData { genre }))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<ApiSuccess<SubscriptionData>, ApiError> {
    state
        .book_service
        .get_subscription(&caller)
        .await
        .map_err(ApiError::from)
        .map(|genre| ApiSuccess::new(StatusCode::OK, SubscriptionData { genre }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionData {
    pub genre: String,
}
