use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::BearerTokenGate;
use auth::Claims;
use auth::JwtHandler;
use auth::JwtTokenVerifier;
use auth::TokenVerifier;
use auth::UserDetailsService;
use books_service::book::errors::AssetStoreError;
use books_service::book::errors::BookError;
use books_service::domain::book::models::AssetKind;
use books_service::domain::book::models::Book;
use books_service::domain::book::models::BookId;
use books_service::domain::book::models::NewBook;
use books_service::domain::book::models::StoredAsset;
use books_service::domain::book::ports::AssetStore;
use books_service::domain::book::ports::BookRepository;
use books_service::domain::book::ports::BookServicePort;
use books_service::domain::book::service::BookService;
use books_service::inbound::http::router::create_router;
use books_service::outbound::siblings::RemoteUserDetails;
use books_service::outbound::siblings::ServiceName;
use books_service::outbound::siblings::ServiceRegistry;
use books_service::outbound::siblings::SiblingClient;
use books_service::tasks::BackgroundTasks;
use chrono::DateTime;
use chrono::Utc;
use httpmock::Method::GET;
use httpmock::MockServer;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Sibling calls slower than this fail with a timeout.
pub const SIBLING_TIMEOUT: Duration = Duration::from_millis(300);

/// Catalog kept in memory, enforcing the unique title constraint.
#[derive(Default)]
pub struct InMemoryBookRepository {
    books: Mutex<Vec<Book>>,
}

impl InMemoryBookRepository {
    pub fn len(&self) -> usize {
        self.books.lock().unwrap().len()
    }

    fn first_matching(&self, predicate: impl Fn(&Book) -> bool) -> Option<Book> {
        self.books
            .lock()
            .unwrap()
            .iter()
            .filter(|book| predicate(book))
            .min_by_key(|book| (book.created_at, book.id))
            .cloned()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn create(&self, book: NewBook) -> Result<Book, BookError> {
        let mut books = self.books.lock().unwrap();
        if books.iter().any(|b| b.title == book.title) {
            return Err(BookError::DuplicateTitle(book.title));
        }

        let stored = Book {
            id: BookId(books.len() as i64 + 1),
            title: book.title,
            author: book.author,
            genre: book.genre,
            description: book.description,
            image_url: book.image_url,
            pdf_url: book.pdf_url,
            created_at: book.created_at,
        };
        books.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookError> {
        Ok(self.first_matching(|book| book.id == id))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>, BookError> {
        Ok(self.first_matching(|book| book.title == title))
    }

    async fn find_first_by_author(&self, author: &str) -> Result<Option<Book>, BookError> {
        Ok(self.first_matching(|book| book.author == author))
    }

    async fn find_first_by_genre(&self, genre: &str) -> Result<Option<Book>, BookError> {
        Ok(self.first_matching(|book| book.genre == genre))
    }

    async fn find_all_by_ids(&self, ids: &[BookId]) -> Result<Vec<Book>, BookError> {
        let books = self.books.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| books.iter().find(|book| book.id == *id).cloned())
            .collect())
    }
}

/// Asset store that hands out predictable URLs and records every call.
#[derive(Default)]
pub struct InMemoryAssetStore {
    pub uploads: Mutex<Vec<StoredAsset>>,
    pub deletes: Mutex<Vec<String>>,
}

impl InMemoryAssetStore {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn upload(&self, bytes: Vec<u8>, kind: AssetKind) -> Result<StoredAsset, AssetStoreError> {
        let mut uploads = self.uploads.lock().unwrap();
        let public_id = format!("books/{}-{}", uploads.len() + 1, bytes.len());
        let asset = StoredAsset {
            url: format!("https://assets.test/{}/{}", kind.resource_type(), public_id),
            public_id,
        };
        uploads.push(asset.clone());
        Ok(asset)
    }

    async fn delete(&self, public_id: &str, _kind: AssetKind) -> Result<(), AssetStoreError> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Test application that spawns a real server; every sibling service is
/// served by one mock server.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub siblings: MockServer,
    pub books: Arc<InMemoryBookRepository>,
    pub assets: Arc<InMemoryAssetStore>,
    pub tasks: BackgroundTasks,
    jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let siblings = MockServer::start_async().await;

        let services: HashMap<String, String> = ServiceName::ALL
            .iter()
            .map(|name| (name.as_str().to_string(), siblings.base_url()))
            .collect();
        let registry =
            Arc::new(ServiceRegistry::from_config(&services).expect("Invalid service registry"));
        let client = Arc::new(SiblingClient::new(registry, SIBLING_TIMEOUT));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let books = Arc::new(InMemoryBookRepository::default());
        let assets = Arc::new(InMemoryAssetStore::default());
        let tasks = BackgroundTasks::new();

        let book_service: Arc<dyn BookServicePort> = Arc::new(BookService::new(
            Arc::clone(&books),
            Arc::clone(&assets),
            Arc::clone(&client),
            tasks.clone(),
        ));

        let verifier: Arc<dyn TokenVerifier> =
            Arc::new(JwtTokenVerifier::new(JwtHandler::new(JWT_SECRET)));
        let user_details: Arc<dyn UserDetailsService> = Arc::new(RemoteUserDetails::new(client));

        let router = create_router(
            book_service,
            BearerTokenGate::new(verifier, user_details),
            1024 * 1024,
        );

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            siblings,
            books,
            assets,
            tasks,
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Sign a token directly; the auth service mock knows nothing about it.
    pub fn token_for(&self, username: &str, user_id: i64) -> String {
        self.jwt_handler
            .encode(&Claims::for_user(username, user_id, 1))
            .expect("Failed to sign token")
    }

    /// Sign a token for `username` and make the auth service know them.
    pub async fn login_as(&self, username: &str, user_id: i64) -> String {
        let token = self.token_for(username, user_id);

        let path = format!("/api/v1/auth/users/{username}");
        let bearer = format!("Bearer {token}");
        self.siblings
            .mock_async(|when, then| {
                when.method(GET)
                    .path(path.as_str())
                    .header("authorization", bearer.as_str());
                then.status(200).json_body(json!({
                    "status_code": 200,
                    "data": {
                        "username": username,
                        "authorities": ["ROLE_USER"],
                        "enabled": true
                    }
                }));
            })
            .await;

        let bearer = format!("Bearer {token}");
        self.siblings
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/auth/get-user-id")
                    .header("authorization", bearer.as_str());
                then.status(200)
                    .json_body(json!({ "status_code": 200, "data": user_id }));
            })
            .await;

        token
    }

    /// Put a book straight into the catalog.
    pub async fn seed_book(
        &self,
        title: &str,
        author: &str,
        genre: &str,
        created_at: DateTime<Utc>,
    ) -> Book {
        self.books
            .create(NewBook {
                title: title.to_string(),
                author: author.to_string(),
                genre: genre.to_string(),
                description: format!("About {title}"),
                image_url: format!("https://assets.test/image/{title}"),
                pdf_url: format!("https://assets.test/raw/{title}"),
                created_at,
            })
            .await
            .expect("Failed to seed book")
    }

    /// Wait until every detached task has finished.
    pub async fn settle(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.tasks.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Background tasks did not finish");
    }
}

/// Multipart upload with every field present.
pub fn book_form(title: &str, genre: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("author", "Ursula K. Le Guin")
        .text("genre", genre.to_string())
        .text("description", "A story from the archipelago")
        .part("image", Part::bytes(vec![0x89, 0x50, 0x4e, 0x47]).file_name("cover.png"))
        .part("pdf", Part::bytes(b"%PDF-1.4 book".to_vec()).file_name("book.pdf"))
}
