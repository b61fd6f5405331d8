use std::sync::Arc;
use std::time::Duration;

use auth::BearerTokenGate;
use auth::TokenVerifier;
use auth::UserDetailsService;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_book::create_book;
use super::handlers::downloads::get_downloaded_books;
use super::handlers::get_book::get_book_by_author;
use super::handlers::get_book::get_book_by_genre;
use super::handlers::get_book::get_book_by_title;
use super::handlers::subscription::get_subscription;
use super::handlers::subscription::subscribe;
use super::handlers::wishlist::add_to_wishlist;
use super::handlers::wishlist::get_wishlist_books;
use super::middleware::authenticate as auth_middleware;
use crate::domain::book::ports::BookServicePort;

pub type Gate = BearerTokenGate<dyn TokenVerifier, dyn UserDetailsService>;

#[derive(Clone)]
pub struct AppState {
    pub book_service: Arc<dyn BookServicePort>,
    pub gate: Gate,
}

pub fn create_router(
    book_service: Arc<dyn BookServicePort>,
    gate: Gate,
    max_upload_bytes: usize,
) -> Router {
    let state = AppState { book_service, gate };

    let routes = Router::new()
        .route(
            "/api/v1/books/create",
            post(create_book).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/v1/books/title/:title", get(get_book_by_title))
        .route("/api/v1/books/author/:author", get(get_book_by_author))
        .route("/api/v1/books/genre/:genre", get(get_book_by_genre))
        // POST takes a book id, GET a user id
        .route(
            "/api/v1/books/wishlist/:id",
            post(add_to_wishlist).get(get_wishlist_books),
        )
        .route("/api/v1/books/downloads/:user_id", get(get_downloaded_books))
        .route("/api/v1/books/subscription", get(get_subscription))
        .route("/api/v1/books/subscription/:genre", post(subscribe));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
