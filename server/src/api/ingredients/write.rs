use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::types::{IngredientRequest, IngredientResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/ingredients",
    tag = "ingredients",
    request_body = IngredientRequest,
    responses(
        (status = 201, description = "Ingredient created", body = IngredientResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_ingredient(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(request): Json<IngredientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.ingredients().create(request)?;
    tracing::debug!(user_id = %user.id, ingredient_id = %created.id, "ingredient added to catalog");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    request_body = IngredientRequest,
    responses(
        (status = 200, description = "Ingredient updated", body = IngredientResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_ingredient(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<IngredientRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.ingredients().update(id, request)?)))
}

#[utoipa::path(
    delete,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse),
        (status = 409, description = "Still used by a recipe", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_ingredient(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.ingredients().delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/ingredients/{id}/substitutes/{substitute_id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID"),
        ("substitute_id" = Uuid, Path, description = "Ingredient that may replace it")
    ),
    responses(
        (status = 200, description = "Link recorded on both ingredients", body = IngredientResponse),
        (status = 400, description = "An ingredient cannot substitute itself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_substitute(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path((id, substitute_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.ingredients().add_substitute(id, substitute_id)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/ingredients/{id}/substitutes/{substitute_id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID"),
        ("substitute_id" = Uuid, Path, description = "Linked substitute")
    ),
    responses(
        (status = 200, description = "Link removed from both ingredients", body = IngredientResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_substitute(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path((id, substitute_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.ingredients().remove_substitute(id, substitute_id)?;
    Ok((StatusCode::OK, Json(updated)))
}
