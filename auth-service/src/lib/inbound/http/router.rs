use std::sync::Arc;
use std::time::Duration;

use auth::BearerTokenGate;
use auth::TokenVerifier;
use auth::UserDetailsService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_user_details::get_user_details;
use super::handlers::get_user_id::get_user_id;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::send_message::send_message;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::ports::UserServicePort;

pub type Gate = BearerTokenGate<dyn TokenVerifier, dyn UserDetailsService>;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub gate: Gate,
}

pub fn create_router(user_service: Arc<dyn UserServicePort>, gate: Gate) -> Router {
    let state = AppState { user_service, gate };

    let routes = Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/get-user-id", get(get_user_id))
        .route("/api/v1/auth/users/:username", get(get_user_details))
        .route("/api/v1/auth/send-message", post(send_message));

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
