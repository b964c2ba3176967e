//! Curated lists. Each returns at most twenty recipes.

use crate::error::AppError;
use crate::types::RecipeCard;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

#[utoipa::path(
    get,
    path = "/api/recipes/trending",
    tag = "recipes",
    responses(
        (status = 200, description = "Most favorited recipes", body = Vec<RecipeCard>)
    )
)]
pub async fn trending(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.recipes().trending()?)))
}

#[utoipa::path(
    get,
    path = "/api/recipes/recommended",
    tag = "recipes",
    responses(
        (status = 200, description = "Best rated recipes for the current meal", body = Vec<RecipeCard>)
    )
)]
pub async fn recommended(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.recipes().recommended()?)))
}

#[utoipa::path(
    get,
    path = "/api/recipes/seasonal",
    tag = "recipes",
    responses(
        (status = 200, description = "Popular recipes from this season's cuisines", body = Vec<RecipeCard>)
    )
)]
pub async fn seasonal(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.recipes().seasonal()?)))
}
