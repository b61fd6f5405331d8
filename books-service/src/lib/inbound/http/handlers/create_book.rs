use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use crate::book::errors::BookError;
use crate::domain::book::models::CreateBookCommand;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    multipart: Multipart,
) -> Result<ApiSuccess<BookData>, ApiError> {
    let command = CreateBookForm::read(multipart).await?.try_into_command()?;

    state
        .book_service
        .create_book(&caller, command)
        .await
        .map_err(ApiError::from)
        .map(|ref book| ApiSuccess::new(StatusCode::CREATED, book.into()))
}

/// Multipart upload as received, before validation.
#[derive(Debug, Default)]
struct CreateBookForm {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    description: Option<String>,
    image: Option<Vec<u8>>,
    pdf: Option<Vec<u8>>,
}

impl CreateBookForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
                "author" => form.author = Some(field.text().await.map_err(multipart_error)?),
                "genre" => form.genre = Some(field.text().await.map_err(multipart_error)?),
                "description" => {
                    form.description = Some(field.text().await.map_err(multipart_error)?)
                }
                "image" => form.image = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
                "pdf" => form.pdf = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
                other => tracing::debug!(field = %other, "Ignoring unknown multipart field"),
            }
        }

        Ok(form)
    }

    fn try_into_command(self) -> Result<CreateBookCommand, BookError> {
        CreateBookCommand::new(
            required("title", self.title)?,
            required("author", self.author)?,
            required("genre", self.genre)?,
            required("description", self.description)?,
            required("image", self.image)?,
            required("pdf", self.pdf)?,
        )
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, BookError> {
    value.ok_or_else(|| BookError::InvalidField {
        field,
        reason: "is required".to_string(),
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
