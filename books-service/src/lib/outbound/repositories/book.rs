use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::book::errors::BookError;
use crate::domain::book::models::Book;
use crate::domain::book::models::BookId;
use crate::domain::book::models::NewBook;
use crate::domain::book::ports::BookRepository;

const BOOK_COLUMNS: &str =
    "id, title, author, genre, description, image_url, pdf_url, created_at";

pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Book>, BookError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE {clause}");

        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BookError::DatabaseError(e.to_string()))?;

        Ok(row.map(Book::from))
    }
}

#[derive(Debug, FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    genre: String,
    description: String,
    image_url: String,
    pdf_url: String,
    created_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: BookId(row.id),
            title: row.title,
            author: row.author,
            genre: row.genre,
            description: row.description,
            image_url: row.image_url,
            pdf_url: row.pdf_url,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn create(&self, book: NewBook) -> Result<Book, BookError> {
        let query = format!(
            "INSERT INTO books (title, author, genre, description, image_url, pdf_url, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {BOOK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.genre)
            .bind(&book.description)
            .bind(&book.image_url)
            .bind(&book.pdf_url)
            .bind(book.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation()
                        && db_err.constraint() == Some("books_title_key")
                    {
                        return BookError::DuplicateTitle(book.title.clone());
                    }
                }
                BookError::DatabaseError(e.to_string())
            })?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");

        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BookError::DatabaseError(e.to_string()))?;

        Ok(row.map(Book::from))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>, BookError> {
        self.fetch_one_where("title = $1", title).await
    }

    async fn find_first_by_author(&self, author: &str) -> Result<Option<Book>, BookError> {
        self.fetch_one_where("author = $1 ORDER BY created_at, id LIMIT 1", author)
            .await
    }

    async fn find_first_by_genre(&self, genre: &str) -> Result<Option<Book>, BookError> {
        self.fetch_one_where("genre = $1 ORDER BY created_at, id LIMIT 1", genre)
            .await
    }

    async fn find_all_by_ids(&self, ids: &[BookId]) -> Result<Vec<Book>, BookError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE id = ANY($1) \
             ORDER BY array_position($1, id)"
        );

        let rows = sqlx::query_as::<_, BookRow>(&query)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BookError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Book::from).collect())
    }
}
