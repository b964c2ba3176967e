pub mod auth;
pub mod health;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/register", post(auth::register::register))
        .route("/api/auth/login", post(auth::login::login))
        .route("/api/auth/logout", post(auth::login::logout))
        .route("/api/auth/google", get(auth::login::google))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register::register,
        auth::login::login,
        auth::login::logout,
        auth::login::google,
        health::health,
    ),
    components(schemas(
        crate::types::RegisterRequest,
        crate::types::LoginRequest,
        crate::types::LoginResponse,
        crate::types::MessageResponse,
        crate::types::UserProfile,
        health::HealthResponse,
    ))
)]
pub struct ApiDoc;
