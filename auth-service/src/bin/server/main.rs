use std::net::SocketAddr;
use std::sync::Arc;

use auth::Authenticator;
use auth::BearerTokenGate;
use auth::JwtHandler;
use auth::JwtTokenVerifier;
use auth::TokenVerifier;
use auth::UserDetailsService;
use auth_service::config::Config;
use auth_service::domain::user::ports::UserServicePort;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::notifications::LoggingMessageSender;
use auth_service::outbound::repositories::PostgresUserRepository;
use auth_service::outbound::user_details::LocalUserDetails;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        jwt_expiration_hours = config.jwt.expiration_hours,
        jwt_leeway_seconds = config.jwt.leeway_seconds,
        "Configuration loaded"
    );

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

    let secret = config.jwt.secret.as_bytes();
    let authenticator = Arc::new(Authenticator::new(secret, config.jwt.expiration_hours));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let message_sender = Arc::new(LoggingMessageSender::new());

    let user_service: Arc<dyn UserServicePort> = Arc::new(UserService::new(
        user_repository,
        message_sender,
        authenticator,
    ));

    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(
        JwtHandler::new(secret).with_leeway(config.jwt.leeway_seconds),
    ));
    let user_details: Arc<dyn UserDetailsService> =
        Arc::new(LocalUserDetails::new(Arc::clone(&user_service)));
    let gate = BearerTokenGate::new(verifier, user_details);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, gate);
    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
