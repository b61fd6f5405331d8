use auth::UserDetails;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::Authenticated;
use crate::inbound::http::router::AppState;

/// User record in the shape other services' gates consume.
pub async fn get_user_details(
    State(state): State<AppState>,
    Authenticated(_): Authenticated,
    Path(username): Path<String>,
) -> Result<ApiSuccess<UserDetails>, ApiError> {
    let username = Username::new(username).map_err(|e| ApiError::NotFound(e.to_string()))?;

    state
        .user_service
        .get_user_by_username(&username)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user.to_details()))
}
