use auth::GateError;
use auth::LookupError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::book::errors::BookError;
use crate::book::errors::SiblingError;
use crate::domain::book::models::Book;

pub mod create_book;
pub mod downloads;
pub mod get_book;
pub mod subscription;
pub mod wishlist;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    PayloadTooLarge(String),
    BadGateway(String),
    ServiceUnavailable(String),
    GatewayTimeout(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::InvalidField { .. } => ApiError::UnprocessableEntity(err.to_string()),
            BookError::DuplicateTitle(_) => ApiError::Conflict(err.to_string()),
            BookError::NotFoundByTitle(_)
            | BookError::NotFoundByAuthor(_)
            | BookError::NotFoundByGenre(_)
            | BookError::NotFoundById(_) => ApiError::NotFound(err.to_string()),
            BookError::AssetStore(_) => ApiError::BadGateway(err.to_string()),
            BookError::Sibling(ref sibling) => match sibling {
                SiblingError::Timeout { .. } => ApiError::GatewayTimeout(err.to_string()),
                SiblingError::Transport { .. } | SiblingError::UnknownService(_) => {
                    ApiError::ServiceUnavailable(err.to_string())
                }
                SiblingError::Status { .. } | SiblingError::Decode { .. } => {
                    ApiError::BadGateway(err.to_string())
                }
            },
            BookError::DatabaseError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Lookup(LookupError::NotFound(_)) => ApiError::Unauthorized(err.to_string()),
            GateError::Lookup(LookupError::Unavailable(_)) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Book as rendered in every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookData {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub image_url: String,
    pub pdf_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Book> for BookData {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.0,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            description: book.description.clone(),
            image_url: book.image_url.clone(),
            pdf_url: book.pdf_url.clone(),
            created_at: book.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: BookError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_book_error_status_mapping() {
        assert_eq!(
            status(BookError::DuplicateTitle("Tehanu".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(BookError::NotFoundByGenre("Myth".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(BookError::InvalidField {
                field: "pdf",
                reason: "file must not be empty".into()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_sibling_error_status_mapping() {
        let sibling = |e: SiblingError| status(BookError::Sibling(e));

        assert_eq!(
            sibling(SiblingError::Timeout {
                service: "review".into(),
                timeout_ms: 100
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            sibling(SiblingError::Transport {
                service: "review".into(),
                message: "refused".into()
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            sibling(SiblingError::Status {
                service: "review".into(),
                status: 500
            }),
            StatusCode::BAD_GATEWAY
        );
    }
}
