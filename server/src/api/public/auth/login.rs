use crate::api::ErrorResponse;
use crate::error::AppError;
use crate::types::{LoginRequest, LoginResponse, MessageResponse};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"email": "ada@example.com", "password": "pw123456"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "No account for this email", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.auth().login(request)?)))
}

/// Tokens are stateless, so there is nothing to revoke; clients drop theirs.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout() -> impl IntoResponse {
    (StatusCode::OK, Json(MessageResponse::new("Logout successful")))
}

#[utoipa::path(
    get,
    path = "/api/auth/google",
    tag = "auth",
    responses(
        (status = 303, description = "Redirect to the Google authorization endpoint")
    )
)]
pub async fn google(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.google_authorization_url)
}
