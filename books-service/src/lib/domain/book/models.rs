use std::fmt;

use chrono::DateTime;
use chrono::Utc;

use crate::book::errors::BookError;

/// Catalog entry with the URLs of its uploaded assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub image_url: String,
    pub pdf_url: String,
    pub created_at: DateTime<Utc>,
}

/// Book being persisted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub image_url: String,
    pub pdf_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account id as issued by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The authenticated user a request acts for, with the bearer token that is
/// forwarded to sibling services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
    pub token: String,
}

impl Caller {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

/// Storage class of an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    /// Opaque files such as PDFs.
    Raw,
}

impl AssetKind {
    pub fn resource_type(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Raw => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub url: String,
    pub public_id: String,
}

/// Command to add a book to the catalog
///
/// Text fields are trimmed; every field must be non-empty. Title, author and
/// genre are capped at the catalog column widths.
#[derive(Debug, Clone)]
pub struct CreateBookCommand {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub image: Vec<u8>,
    pub pdf: Vec<u8>,
}

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_AUTHOR_CHARS: usize = 255;
pub const MAX_GENRE_CHARS: usize = 100;

impl CreateBookCommand {
    /// # Errors
    /// * `InvalidField` - A text field is blank or too long, or a file is empty
    pub fn new(
        title: String,
        author: String,
        genre: String,
        description: String,
        image: Vec<u8>,
        pdf: Vec<u8>,
    ) -> Result<Self, BookError> {
        Ok(Self {
            title: required_text("title", title, Some(MAX_TITLE_CHARS))?,
            author: required_text("author", author, Some(MAX_AUTHOR_CHARS))?,
            genre: required_text("genre", genre, Some(MAX_GENRE_CHARS))?,
            description: required_text("description", description, None)?,
            image: required_file("image", image)?,
            pdf: required_file("pdf", pdf)?,
        })
    }
}

fn required_text(
    field: &'static str,
    value: String,
    max_chars: Option<usize>,
) -> Result<String, BookError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookError::InvalidField {
            field,
            reason: "must not be blank".to_string(),
        });
    }
    if let Some(max_chars) = max_chars {
        if trimmed.chars().count() > max_chars {
            return Err(BookError::InvalidField {
                field,
                reason: format!("must be at most {max_chars} characters"),
            });
        }
    }
    Ok(trimmed.to_string())
}

fn required_file(field: &'static str, bytes: Vec<u8>) -> Result<Vec<u8>, BookError> {
    if bytes.is_empty() {
        return Err(BookError::InvalidField {
            field,
            reason: "file must not be empty".to_string(),
        });
    }
    Ok(bytes)
}

/// Title lookup result: the book and the review fetched for it.
#[derive(Debug, Clone, PartialEq)]
pub struct BookWithReview {
    pub book: Book,
    pub review: serde_json::Value,
}

/// Whether a subscription genre covers a book genre.
pub fn genre_matches(subscribed: &str, genre: &str) -> bool {
    subscribed.trim().eq_ignore_ascii_case(genre.trim())
}
