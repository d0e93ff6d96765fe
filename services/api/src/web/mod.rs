pub mod ai;
pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use kalakriti_core::StoreError;
use std::sync::Arc;
use tracing::error;

pub use middleware::require_auth;
use state::AppState;

/// Maps a record store failure to the status and message sent to the client.
pub fn store_error(e: StoreError) -> (StatusCode, String) {
    let status = match &e {
        StoreError::MissingCredentials | StoreError::InvalidProduct(_) => StatusCode::BAD_REQUEST,
        StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        StoreError::UnknownArtisan(_) => StatusCode::NOT_FOUND,
        StoreError::UsernameTaken => StatusCode::CONFLICT,
        StoreError::Io(_) | StoreError::Hashing(_) => {
            error!("Record store failure: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string());
        }
    };
    (status, e.to_string())
}

/// Builds the API routes. CORS and the Swagger UI are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/catalog", get(rest::catalog_handler))
        .route("/translate", get(rest::translate_handler))
        .route("/languages", get(rest::languages_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/profile",
            get(rest::get_profile_handler).put(rest::update_profile_handler),
        )
        .route(
            "/products",
            get(rest::list_products_handler).post(rest::add_product_handler),
        )
        .route("/session/language", put(rest::set_language_handler))
        .route("/ai/descriptions", post(ai::descriptions_handler))
        .route("/ai/social-plan", post(ai::social_plan_handler))
        .route("/ai/image", post(ai::image_handler))
        .route("/assistant/select", post(ai::select_product_handler))
        .route("/assistant/chat", post(ai::chat_handler))
        .route("/assistant/history", get(ai::history_handler))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
