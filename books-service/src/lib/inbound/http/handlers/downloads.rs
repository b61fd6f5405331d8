use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::domain::book::models::UserId;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

pub async fn get_downloaded_books(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(user_id): Path<i64>,
) -> Result<ApiSuccess<Vec<BookData>>, ApiError> {
    state
        .book_service
        .get_downloaded_books(&caller, UserId(user_id))
        .await
        .map_err(ApiError::from)
        .map(|books| ApiSuccess::new(StatusCode::OK, books.iter().map(BookData::from).collect()))
}
