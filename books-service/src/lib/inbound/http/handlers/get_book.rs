use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::domain::book::models::BookWithReview;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

pub async fn get_book_by_title(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(title): Path<String>,
) -> Result<ApiSuccess<BookWithReviewData>, ApiError> {
    state
        .book_service
        .get_book_by_title(&caller, &title)
        .await
        .map_err(ApiError::from)
        .map(|ref found| ApiSuccess::new(StatusCode::OK, found.into()))
}

pub async fn get_book_by_author(
    State(state): State<AppState>,
    Path(author): Path<String>,
) -> Result<ApiSuccess<BookData>, ApiError> {
    state
        .book_service
        .get_book_by_author(&author)
        .await
        .map_err(ApiError::from)
        .map(|ref book| ApiSuccess::new(StatusCode::OK, book.into()))
}

pub async fn get_book_by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> Result<ApiSuccess<BookData>, ApiError> {
    state
        .book_service
        .get_book_by_genre(&genre)
        .await
        .map_err(ApiError::from)
        .map(|ref book| ApiSuccess::new(StatusCode::OK, book.into()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookWithReviewData {
    pub book: BookData,
    /// Passed through as the review service returned it.
    pub review: serde_json::Value,
}

impl From<&BookWithReview> for BookWithReviewData {
    fn from(found: &BookWithReview) -> Self {
        Self {
            book: (&found.book).into(),
            review: found.review.clone(),
        }
    }
}
