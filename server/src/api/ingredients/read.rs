use crate::api::params::page_request;
use crate::api::ErrorResponse;
use crate::error::AppError;
use crate::models::IngredientCategory;
use crate::types::{IngredientBrief, IngredientResponse, PageResponse};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListIngredientsParams {
    pub page: Option<i64>,
    /// Default: 20
    pub size: Option<i64>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "Page of ingredients sorted by name", body = PageResponse<IngredientResponse>),
        (status = 400, description = "Unknown category", body = ErrorResponse)
    )
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(params): Query<ListIngredientsParams>,
) -> Result<impl IntoResponse, AppError> {
    let category = params
        .category
        .as_deref()
        .map(str::parse::<IngredientCategory>)
        .transpose()
        .map_err(|err| AppError::invalid(err.to_string()))?;
    let page = page_request(params.page, params.size, 20);

    let found = state
        .ingredients()
        .list(params.search.as_deref(), category, page)?;
    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient with its substitutes", body = IngredientResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.ingredients().get(id)?)))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/categories",
    tag = "ingredients",
    responses(
        (status = 200, description = "Every ingredient category", body = Vec<IngredientCategory>)
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.ingredients().categories()))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/substitutes",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredients usable in place of this one", body = Vec<IngredientBrief>),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn list_substitutes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.ingredients().substitutes(id)?)))
}
