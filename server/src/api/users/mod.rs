//! The caller's own account, mounted at /api/users behind `require_auth`.

use crate::api::params::{page_request, DEFAULT_PAGE_SIZE};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::types::{PageResponse, PreferencesBody, ProfileUpdateRequest, RecipeCard, UserProfile};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route(
            "/me/preferences",
            get(get_preferences).put(update_preferences),
        )
        .route("/me/favorite-recipes", get(favorite_recipes))
        .route("/me/recipes", get(own_recipes))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserPageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The caller's profile", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.users().profile(&user)?)))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "users",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Name outside 3 to 20 characters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.users().update_profile(&user, request)?)))
}

#[utoipa::path(
    get,
    path = "/api/users/me/preferences",
    tag = "users",
    responses(
        (status = 200, description = "Stored preferences", body = PreferencesBody),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_preferences(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.users().preferences(&user)?)))
}

/// Replaces every preference; omitted sets become empty.
#[utoipa::path(
    put,
    path = "/api/users/me/preferences",
    tag = "users",
    request_body = PreferencesBody,
    responses(
        (status = 200, description = "Preferences replaced", body = PreferencesBody),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_preferences(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PreferencesBody>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.users().update_preferences(&user, body)?)))
}

#[utoipa::path(
    get,
    path = "/api/users/me/favorite-recipes",
    tag = "users",
    params(UserPageParams),
    responses(
        (status = 200, description = "Favorited recipes, most recent first", body = PageResponse<RecipeCard>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn favorite_recipes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserPageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = page_request(params.page, params.size, DEFAULT_PAGE_SIZE);
    let found = state.users().favorite_recipes(&user, page)?;
    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}

#[utoipa::path(
    get,
    path = "/api/users/me/recipes",
    tag = "users",
    params(UserPageParams),
    responses(
        (status = 200, description = "Recipes the caller wrote, newest first", body = PageResponse<RecipeCard>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn own_recipes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserPageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = page_request(params.page, params.size, DEFAULT_PAGE_SIZE);
    let found = state.users().own_recipes(&user, page)?;
    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_profile,
        update_profile,
        get_preferences,
        update_preferences,
        favorite_recipes,
        own_recipes,
    ),
    components(schemas(UserProfile, ProfileUpdateRequest, PreferencesBody))
)]
pub struct ApiDoc;
