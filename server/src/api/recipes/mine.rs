use crate::api::params::page_request;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::services::UserRecipeFilter;
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
pub struct UserRecipesParams {
    pub page: Option<i64>,
    /// Default: 12
    pub size: Option<i64>,
    pub search: Option<String>,
    /// Ignored when it is not a known cuisine
    pub cuisine: Option<String>,
    /// Ignored when it is not a known meal type
    pub meal_type: Option<String>,
    /// newest (default), oldest, name_asc, name_desc, rating, popularity
    pub sort: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/user",
    tag = "recipes",
    params(UserRecipesParams),
    responses(
        (status = 200, description = "The caller's recipes", body = PageResponse<RecipeCard>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn user_recipes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserRecipesParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = page_request(params.page, params.size, 12);
    let filter = UserRecipeFilter {
        search: params.search,
        cuisine: params.cuisine,
        meal_type: params.meal_type,
        sort: params.sort,
    };
    let found = state.recipes().user_recipes(&user, &filter, page)?;
    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}
