use crate::api::ErrorResponse;
use crate::error::AppError;
use crate::types::{RegisterRequest, UserProfile};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body(content = RegisterRequest, example = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "password": "pw123456",
        "confirmPassword": "pw123456"
    })),
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Invalid request or passwords do not match", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth().register(request)?;
    Ok((StatusCode::CREATED, Json(profile)))
}
