use crate::api::params::{page_request, parse_ids, parse_list, DEFAULT_PAGE_SIZE};
use crate::api::ErrorResponse;
use crate::error::AppError;
use crate::query::{AdvancedFilterCriteria, Direction, RecipeSort, SortField};
use crate::types::{PageResponse, RecipeCard};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRecipesParams {
    /// Zero-based page index (default: 0)
    pub page: Option<i64>,
    /// Page size (default: 10, max: 100)
    pub size: Option<i64>,
    /// Case-insensitive substring of the recipe name
    pub search: Option<String>,
    /// One of name, difficulty, cookingTime, rating (default: name).
    /// Anything else sorts by name.
    pub sort_by: Option<String>,
    /// asc or desc (default: asc)
    pub sort_direction: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of recipes", body = PageResponse<RecipeCard>),
        (status = 400, description = "Invalid sort direction", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> Result<impl IntoResponse, AppError> {
    let sort = RecipeSort {
        field: SortField::resolve(params.sort_by.as_deref(), SortField::LISTING),
        direction: Direction::parse_or(params.sort_direction.as_deref(), Direction::Asc)?,
    };
    let page = page_request(params.page, params.size, DEFAULT_PAGE_SIZE);

    let found = state
        .recipes()
        .list(params.search.as_deref(), sort, page)?;

    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}

/// Multi-valued filters are comma separated, e.g. `cuisines=ITALIAN,FRENCH`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdvancedSearchParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    /// Ingredient ids that must all be present
    pub include_ingredients: Option<String>,
    /// Ingredient ids none of which may be present
    pub exclude_ingredients: Option<String>,
    pub max_cooking_time: Option<i32>,
    pub cuisines: Option<String>,
    pub meal_types: Option<String>,
    pub diet_types: Option<String>,
    pub cooking_methods: Option<String>,
    pub difficulties: Option<String>,
    /// Default: rating. Unknown fields sort by name.
    pub sort_by: Option<String>,
    /// asc or desc (default: desc)
    pub sort_direction: Option<String>,
}

impl AdvancedSearchParams {
    fn criteria(&self) -> Result<AdvancedFilterCriteria, AppError> {
        Ok(AdvancedFilterCriteria {
            search: self.search.clone(),
            include_ingredients: parse_ids(self.include_ingredients.as_deref(), "includeIngredients")?,
            exclude_ingredients: parse_ids(self.exclude_ingredients.as_deref(), "excludeIngredients")?,
            max_cooking_time: self.max_cooking_time,
            cuisines: parse_list(self.cuisines.as_deref(), "cuisines")?,
            meal_types: parse_list(self.meal_types.as_deref(), "mealTypes")?,
            diet_types: parse_list(self.diet_types.as_deref(), "dietTypes")?,
            cooking_methods: parse_list(self.cooking_methods.as_deref(), "cookingMethods")?,
            difficulties: parse_list(self.difficulties.as_deref(), "difficulties")?,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/advanced-search",
    tag = "recipes",
    params(AdvancedSearchParams),
    responses(
        (status = 200, description = "Page of matching recipes", body = PageResponse<RecipeCard>),
        (status = 400, description = "Invalid filter value or sort direction", body = ErrorResponse)
    )
)]
pub async fn advanced_search(
    State(state): State<AppState>,
    Query(params): Query<AdvancedSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let criteria = params.criteria()?;
    let sort = RecipeSort {
        field: SortField::resolve(
            Some(params.sort_by.as_deref().unwrap_or("rating")),
            SortField::SEARCH,
        ),
        direction: Direction::parse_or(params.sort_direction.as_deref(), Direction::Desc)?,
    };
    let page = page_request(params.page, params.size, DEFAULT_PAGE_SIZE);

    let found = state.recipes().advanced_search(&criteria, sort, page)?;

    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}
