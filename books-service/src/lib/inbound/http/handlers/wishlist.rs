use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::domain::book::models::BookId;
use crate::domain::book::models::UserId;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

/// The path segment is a book id; the add itself completes after the
/// response.
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(book_id): Path<i64>,
) -> Result<ApiSuccess<WishlistAcceptedData>, ApiError> {
    state
        .book_service
        .add_to_wishlist(&caller, BookId(book_id))
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::ACCEPTED, WishlistAcceptedData { book_id }))
}

/// The path segment is a user id.
pub async fn get_wishlist_books(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(user_id): Path<i64>,
) -> Result<ApiSuccess<Vec<BookData>>, ApiError> {
    state
        .book_service
        .get_wishlist_books(&caller, UserId(user_id))
        .await
        .map_err(ApiError::from)
        .map(|books| ApiSuccess::new(StatusCode::OK, books.iter().map(BookData::from).collect()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistAcceptedData {
    pub book_id: i64,
}
