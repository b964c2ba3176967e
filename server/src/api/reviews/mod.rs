use crate::api::params::{page_request, DEFAULT_PAGE_SIZE};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::types::{PageResponse, ReviewRequest, ReviewResponse};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

/// Returns the router for /api/reviews endpoints (mounted at /api/reviews)
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipe/{recipe_id}",
            get(recipe_reviews).post(create_review),
        )
        .route("/user", get(user_reviews))
        .route("/{id}", put(update_review).delete(delete_review))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewPageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/reviews/recipe/{recipe_id}",
    tag = "reviews",
    params(
        ("recipe_id" = Uuid, Path, description = "Recipe ID"),
        ReviewPageParams
    ),
    responses(
        (status = 200, description = "Reviews of the recipe, newest first", body = PageResponse<ReviewResponse>),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn recipe_reviews(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Query(params): Query<ReviewPageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = page_request(params.page, params.size, DEFAULT_PAGE_SIZE);
    let found = state.reviews().for_recipe(recipe_id, page)?;
    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}

#[utoipa::path(
    post,
    path = "/api/reviews/recipe/{recipe_id}",
    tag = "reviews",
    params(
        ("recipe_id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created and recipe rating refreshed", body = ReviewResponse),
        (status = 400, description = "Rating outside 1 to 5", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 409, description = "Caller already reviewed this recipe", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.reviews().create(&user, recipe_id, request)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Rating outside 1 to 5", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.reviews().update(&user, id, request)?)))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.reviews().delete(&user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/reviews/user",
    tag = "reviews",
    params(ReviewPageParams),
    responses(
        (status = 200, description = "The caller's reviews, newest first", body = PageResponse<ReviewResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn user_reviews(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReviewPageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = page_request(params.page, params.size, DEFAULT_PAGE_SIZE);
    let found = state.reviews().by_user(&user, page)?;
    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}

#[derive(OpenApi)]
#[openapi(
    paths(recipe_reviews, create_review, update_review, delete_review, user_reviews),
    components(schemas(ReviewRequest, ReviewResponse))
)]
pub struct ApiDoc;
