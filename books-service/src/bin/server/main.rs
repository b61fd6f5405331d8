use std::net::SocketAddr;
use std::sync::Arc;

use auth::BearerTokenGate;
use auth::JwtHandler;
use auth::JwtTokenVerifier;
use auth::TokenVerifier;
use auth::UserDetailsService;
use books_service::config::Config;
use books_service::domain::book::ports::BookServicePort;
use books_service::domain::book::service::BookService;
use books_service::inbound::http::router::create_router;
use books_service::outbound::assets::CloudinaryAssetStore;
use books_service::outbound::repositories::PostgresBookRepository;
use books_service::outbound::siblings::RemoteUserDetails;
use books_service::outbound::siblings::ServiceRegistry;
use books_service::outbound::siblings::SiblingClient;
use books_service::tasks::BackgroundTasks;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "books_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "books-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        sibling_timeout_ms = config.siblings.timeout_ms,
        max_upload_bytes = config.server.max_upload_bytes,
        jwt_leeway_seconds = config.jwt.leeway_seconds,
        "Configuration loaded"
    );

    let registry = Arc::new(ServiceRegistry::from_config(&config.services)?);
    tracing::info!(services = config.services.len(), "Service registry loaded");

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let tasks = BackgroundTasks::new();
    let siblings = Arc::new(SiblingClient::new(registry, config.siblings.timeout()));
    let book_repository = Arc::new(PostgresBookRepository::new(pg_pool));
    let asset_store = Arc::new(CloudinaryAssetStore::new(config.cloudinary.clone()));

    let book_service: Arc<dyn BookServicePort> = Arc::new(BookService::new(
        book_repository,
        asset_store,
        Arc::clone(&siblings),
        tasks.clone(),
    ));

    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(
        JwtHandler::new(config.jwt.secret.as_bytes()).with_leeway(config.jwt.leeway_seconds),
    ));
    let user_details: Arc<dyn UserDetailsService> = Arc::new(RemoteUserDetails::new(siblings));
    let gate = BearerTokenGate::new(verifier, user_details);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(book_service, gate, config.server.max_upload_bytes);
    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if !tasks.shutdown(config.siblings.shutdown_grace()).await {
        tracing::warn!("Background tasks cancelled after grace period");
    }

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
