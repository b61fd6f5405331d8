use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::Authenticated;
use crate::inbound::http::router::AppState;

pub async fn send_message(
    State(state): State<AppState>,
    Authenticated(authentication): Authenticated,
) -> Result<ApiSuccess<SendMessageResponseData>, ApiError> {
    let username = Username::new(authentication.username().to_string())
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    state
        .user_service
        .send_subscription_message(&username)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::ACCEPTED,
        SendMessageResponseData {
            recipient: username.to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageResponseData {
    pub recipient: String,
}
