//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for artisan registration, login, and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::{middleware::session_id_from_headers, state::AppState, store_error};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub username: String,
    /// Empty until the artisan saves a profile.
    pub name: String,
}

fn session_cookie(session_id: &str, max_age_secs: i64, secure: bool) -> String {
    format!(
        "session={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        session_id,
        if secure { " Secure;" } else { "" },
        max_age_secs
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new artisan account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Artisan registered", body = AuthResponse),
        (status = 400, description = "Username or password missing"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .store
        .register(&req.username, &req.password)
        .await
        .map_err(store_error)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            username: req.username,
            name: String::new(),
        }),
    ))
}

/// POST /auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Verify the credentials against the store
    let artisan = state
        .store
        .authenticate(&req.username, &req.password)
        .await
        .map_err(store_error)?;

    // 2. Start a session
    let ttl = state.config.session_ttl;
    let session_id = state.sessions.create(&artisan.username, ttl).await;
    info!(username = %artisan.username, "Artisan logged in");

    // 3. Return response with cookie
    let cookie = session_cookie(&session_id, ttl.num_seconds(), state.config.session_cookie_secure);
    let response = AuthResponse {
        username: artisan.username,
        name: artisan.display_name,
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session_id = session_id_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.sessions.remove(&session_id).await;

    Ok((StatusCode::OK, [(header::SET_COOKIE, session_cookie("", 0, state.config.session_cookie_secure))]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_format() {
        assert_eq!(
            session_cookie("abc", 60, true),
            "session=abc; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=60"
        );
        assert_eq!(
            session_cookie("abc", 60, false),
            "session=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=60"
        );
    }
}
