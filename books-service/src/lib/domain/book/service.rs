use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::book::errors::BookError;
use crate::domain::book::models::genre_matches;
use crate::domain::book::models::AssetKind;
use crate::domain::book::models::Book;
use crate::domain::book::models::BookId;
use crate::domain::book::models::BookWithReview;
use crate::domain::book::models::Caller;
use crate::domain::book::models::CreateBookCommand;
use crate::domain::book::models::NewBook;
use crate::domain::book::models::StoredAsset;
use crate::domain::book::models::UserId;
use crate::domain::book::ports::AssetStore;
use crate::domain::book::ports::BookRepository;
use crate::domain::book::ports::BookServicePort;
use crate::domain::book::ports::SiblingServices;
use crate::tasks::BackgroundTasks;

/// Domain service implementation for catalog operations.
pub struct BookService<BR, AS, SS>
where
    BR: BookRepository,
    AS: AssetStore,
    SS: SiblingServices,
{
    repository: Arc<BR>,
    assets: Arc<AS>,
    siblings: Arc<SS>,
    tasks: BackgroundTasks,
}

impl<BR, AS, SS> BookService<BR, AS, SS>
where
    BR: BookRepository,
    AS: AssetStore,
    SS: SiblingServices,
{
    pub fn new(
        repository: Arc<BR>,
        assets: Arc<AS>,
        siblings: Arc<SS>,
        tasks: BackgroundTasks,
    ) -> Self {
        Self {
            repository,
            assets,
            siblings,
            tasks,
        }
    }

    /// Remove assets whose book never made it into the catalog.
    fn discard_assets(&self, uploaded: Vec<(StoredAsset, AssetKind)>) {
        let assets = Arc::clone(&self.assets);
        self.tasks.spawn("discard_assets", async move {
            for (asset, kind) in uploaded {
                assets.delete(&asset.public_id, kind).await?;
                tracing::info!(public_id = %asset.public_id, "Orphaned asset deleted");
            }
            Ok::<(), BookError>(())
        });
    }

    /// Notify the caller if the new book is in their subscribed genre.
    ///
    /// Runs after the book is persisted; failures are logged only.
    async fn notify_subscriber(&self, caller: &Caller, book: &Book) {
        let subscribed = match self.siblings.resolve_user_id(caller).await {
            Ok(user_id) => self.siblings.subscribed_genre(caller, user_id).await,
            Err(e) => Err(e),
        };

        match subscribed {
            Ok(genre) if genre_matches(&genre, &book.genre) => {
                let siblings = Arc::clone(&self.siblings);
                let caller = caller.clone();
                self.tasks.spawn("send_subscription_message", async move {
                    siblings.send_subscription_message(&caller).await
                });
            }
            Ok(genre) => {
                tracing::debug!(subscribed = %genre, genre = %book.genre, "No subscription match");
            }
            Err(e) => {
                tracing::warn!(book_id = %book.id, error = %e, "Subscription check failed");
            }
        }
    }

    async fn books_for_ids(&self, ids: Vec<BookId>) -> Result<Vec<Book>, BookError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.find_all_by_ids(&ids).await
    }
}

#[async_trait]
impl<BR, AS, SS> BookServicePort for BookService<BR, AS, SS>
where
    BR: BookRepository,
    AS: AssetStore,
    SS: SiblingServices,
{
    async fn create_book(
        &self,
        caller: &Caller,
        command: CreateBookCommand,
    ) -> Result<Book, BookError> {
        if self
            .repository
            .find_by_title(&command.title)
            .await?
            .is_some()
        {
            return Err(BookError::DuplicateTitle(command.title));
        }

        let image = self.assets.upload(command.image, AssetKind::Image).await?;
        let pdf = match self.assets.upload(command.pdf, AssetKind::Raw).await {
            Ok(pdf) => pdf,
            Err(e) => {
                self.discard_assets(vec![(image, AssetKind::Image)]);
                return Err(e.into());
            }
        };

        let new_book = NewBook {
            title: command.title,
            author: command.author,
            genre: command.genre,
            description: command.description,
            image_url: image.url.clone(),
            pdf_url: pdf.url.clone(),
            created_at: Utc::now(),
        };

        let book = match self.repository.create(new_book).await {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(error = %e, "Book not persisted, discarding uploaded assets");
                self.discard_assets(vec![(image, AssetKind::Image), (pdf, AssetKind::Raw)]);
                return Err(e);
            }
        };

        tracing::info!(
            book_id = %book.id,
            title = %book.title,
            username = %caller.username,
            "Book created"
        );

        self.notify_subscriber(caller, &book).await;

        Ok(book)
    }

    async fn get_book_by_title(
        &self,
        caller: &Caller,
        title: &str,
    ) -> Result<BookWithReview, BookError> {
        let book = self
            .repository
            .find_by_title(title)
            .await?
            .ok_or_else(|| BookError::NotFoundByTitle(title.to_string()))?;

        let user_id = self.siblings.resolve_user_id(caller).await?;

        let siblings = Arc::clone(&self.siblings);
        let download_caller = caller.clone();
        let book_id = book.id;
        self.tasks.spawn("record_download", async move {
            siblings
                .record_download(&download_caller, book_id, user_id)
                .await
        });

        let review = self.siblings.fetch_review(caller, book.id).await?;

        Ok(BookWithReview { book, review })
    }

    async fn get_book_by_author(&self, author: &str) -> Result<Book, BookError> {
        self.repository
            .find_first_by_author(author)
            .await?
            .ok_or_else(|| BookError::NotFoundByAuthor(author.to_string()))
    }

    async fn get_book_by_genre(&self, genre: &str) -> Result<Book, BookError> {
        self.repository
            .find_first_by_genre(genre)
            .await?
            .ok_or_else(|| BookError::NotFoundByGenre(genre.to_string()))
    }

    async fn add_to_wishlist(&self, caller: &Caller, book_id: BookId) -> Result<(), BookError> {
        if self.repository.find_by_id(book_id).await?.is_none() {
            return Err(BookError::NotFoundById(book_id.0));
        }

        let user_id = self.siblings.resolve_user_id(caller).await?;

        let siblings = Arc::clone(&self.siblings);
        let caller = caller.clone();
        self.tasks.spawn("add_to_wishlist", async move {
            siblings.add_to_wishlist(&caller, book_id, user_id).await
        });

        Ok(())
    }

    async fn get_wishlist_books(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<Book>, BookError> {
        let ids = self.siblings.list_wishlist(caller, user_id).await?;
        self.books_for_ids(ids).await
    }

    async fn get_downloaded_books(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<Book>, BookError> {
        let ids = self.siblings.list_downloads(caller, user_id).await?;
        self.books_for_ids(ids).await
    }

    async fn subscribe(&self, caller: &Caller, genre: &str) -> Result<(), BookError> {
        let user_id = self.siblings.resolve_user_id(caller).await?;

        let siblings = Arc::clone(&self.siblings);
        let caller = caller.clone();
        let genre = genre.to_string();
        self.tasks.spawn("subscribe", async move {
            siblings.subscribe(&caller, &genre, user_id).await
        });

        Ok(())
    }

    async fn get_subscription(&self, caller: &Caller) -> Result<String, BookError> {
        let user_id = self.siblings.resolve_user_id(caller).await?;
        Ok(self.siblings.subscribed_genre(caller, user_id).await?)
    }
}
