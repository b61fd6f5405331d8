use async_trait::async_trait;

use crate::book::errors::AssetStoreError;
use crate::book::errors::BookError;
use crate::book::errors::SiblingError;
use crate::domain::book::models::AssetKind;
use crate::domain::book::models::Book;
use crate::domain::book::models::BookId;
use crate::domain::book::models::BookWithReview;
use crate::domain::book::models::Caller;
use crate::domain::book::models::CreateBookCommand;
use crate::domain::book::models::NewBook;
use crate::domain::book::models::StoredAsset;
use crate::domain::book::models::UserId;

/// Port for book domain service operations.
#[async_trait]
pub trait BookServicePort: Send + Sync + 'static {
    /// Upload a book's assets and add it to the catalog.
    ///
    /// # Errors
    /// * `DuplicateTitle` - A book with this title exists; nothing was uploaded
    /// * `AssetStore` - An upload failed
    /// * `DatabaseError` - Persistence failed; uploaded assets are scheduled
    ///   for deletion
    async fn create_book(
        &self,
        caller: &Caller,
        command: CreateBookCommand,
    ) -> Result<Book, BookError>;

    /// Look a book up by title, record the download and attach its review.
    ///
    /// # Errors
    /// * `NotFoundByTitle` - No such book; no sibling was called
    /// * `Sibling` - User id resolution or the review fetch failed
    async fn get_book_by_title(
        &self,
        caller: &Caller,
        title: &str,
    ) -> Result<BookWithReview, BookError>;

    /// Earliest-created book by this author.
    async fn get_book_by_author(&self, author: &str) -> Result<Book, BookError>;

    /// Earliest-created book in this genre.
    async fn get_book_by_genre(&self, genre: &str) -> Result<Book, BookError>;

    /// Ask the wishlist service to add a book for the caller. The add itself
    /// runs detached.
    ///
    /// # Errors
    /// * `NotFoundById` - No such book
    /// * `Sibling` - User id resolution failed
    async fn add_to_wishlist(&self, caller: &Caller, book_id: BookId) -> Result<(), BookError>;

    async fn get_wishlist_books(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<Book>, BookError>;

    async fn get_downloaded_books(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<Book>, BookError>;

    /// Subscribe the caller to a genre. The subscription call runs detached.
    async fn subscribe(&self, caller: &Caller, genre: &str) -> Result<(), BookError>;

    /// Genre the caller is subscribed to.
    async fn get_subscription(&self, caller: &Caller) -> Result<String, BookError>;
}

/// Persistence operations for the catalog.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    /// # Errors
    /// * `DuplicateTitle` - Title taken (unique constraint)
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, book: NewBook) -> Result<Book, BookError>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>, BookError>;

    async fn find_first_by_author(&self, author: &str) -> Result<Option<Book>, BookError>;

    async fn find_first_by_genre(&self, genre: &str) -> Result<Option<Book>, BookError>;

    /// # Returns
    /// Books that exist among `ids`, in the order the ids were given
    async fn find_all_by_ids(&self, ids: &[BookId]) -> Result<Vec<Book>, BookError>;
}

/// External storage for book covers and files.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    async fn upload(&self, bytes: Vec<u8>, kind: AssetKind) -> Result<StoredAsset, AssetStoreError>;

    async fn delete(&self, public_id: &str, kind: AssetKind) -> Result<(), AssetStoreError>;
}

/// Calls to sibling services, made with the caller's token.
#[async_trait]
pub trait SiblingServices: Send + Sync + 'static {
    async fn resolve_user_id(&self, caller: &Caller) -> Result<UserId, SiblingError>;

    async fn subscribed_genre(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<String, SiblingError>;

    async fn subscribe(
        &self,
        caller: &Caller,
        genre: &str,
        user_id: UserId,
    ) -> Result<(), SiblingError>;

    /// Tell the caller a book in their subscribed genre was published.
    async fn send_subscription_message(&self, caller: &Caller) -> Result<(), SiblingError>;

    async fn record_download(
        &self,
        caller: &Caller,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<(), SiblingError>;

    async fn list_downloads(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<BookId>, SiblingError>;

    async fn add_to_wishlist(
        &self,
        caller: &Caller,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<(), SiblingError>;

    async fn list_wishlist(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<BookId>, SiblingError>;

    async fn fetch_review(
        &self,
        caller: &Caller,
        book_id: BookId,
    ) -> Result<serde_json::Value, SiblingError>;
}
