use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::Authenticated;
use crate::inbound::http::router::AppState;

/// Numeric id of the calling user.
pub async fn get_user_id(
    State(state): State<AppState>,
    Authenticated(authentication): Authenticated,
) -> Result<ApiSuccess<i64>, ApiError> {
    let username = Username::new(authentication.username().to_string())
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    state
        .user_service
        .get_user_by_username(&username)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user.id.0))
}
