use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/crisis/resources", get(handlers::crisis::resources));

    let chat_routes = Router::new()
        .route("/api/chat", post(handlers::chat::send_message))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_chat,
        ));

    let protected_routes = Router::new()
        // Journal
        .route(
            "/api/journal",
            get(handlers::journal::list_entries).post(handlers::journal::create_entry),
        )
        .route("/api/journal/analyze", post(handlers::journal::analyze))
        // Moods
        .route(
            "/api/moods",
            get(handlers::moods::list_moods).post(handlers::moods::create_mood),
        )
        .route(
            "/api/moods/series",
            get(handlers::moods::get_series).post(handlers::moods::series_from_entries),
        )
        .merge(chat_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
