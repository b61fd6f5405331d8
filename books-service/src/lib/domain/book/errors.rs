use thiserror::Error;

/// Failure of a call to a sibling service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiblingError {
    #[error("{service} did not respond within {timeout_ms} ms")]
    Timeout { service: String, timeout_ms: u64 },

    #[error("{service} unreachable: {message}")]
    Transport { service: String, message: String },

    #[error("{service} responded with status {status}")]
    Status { service: String, status: u16 },

    #[error("{service} returned an unreadable body: {message}")]
    Decode { service: String, message: String },

    #[error("No address configured for service: {0}")]
    UnknownService(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetStoreError {
    #[error("Asset upload failed: {0}")]
    UploadFailed(String),

    #[error("Asset deletion failed: {0}")]
    DeleteFailed(String),

    #[error("Asset store returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Top-level error for all book-related operations
#[derive(Debug, Clone, Error)]
pub enum BookError {
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Book already exists with title: {0}")]
    DuplicateTitle(String),

    #[error("Book not found with title: {0}")]
    NotFoundByTitle(String),

    #[error("Book not found with author: {0}")]
    NotFoundByAuthor(String),

    #[error("Book not found with genre: {0}")]
    NotFoundByGenre(String),

    #[error("Book not found with id: {0}")]
    NotFoundById(i64),

    #[error(transparent)]
    AssetStore(#[from] AssetStoreError),

    #[error(transparent)]
    Sibling(#[from] SiblingError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
