//! Shopping lists. Every route sits behind `require_auth` and only ever
//! sees the caller's own lists.

use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::types::{
    ShoppingListRequest, ShoppingListResponse, ShoppingListUpdateRequest, ShoppingStatusRequest,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use utoipa::OpenApi;
use uuid::Uuid;

/// Returns the router for /api/shopping-lists endpoints (mounted at /api/shopping-lists)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_list))
        .route("/user", get(user_lists))
        .route(
            "/{id}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/{id}/status", put(update_status))
        .route("/{id}/ingredients", post(add_ingredients))
        .route(
            "/{id}/ingredients/{ingredient_id}",
            delete(remove_ingredient),
        )
}

#[utoipa::path(
    get,
    path = "/api/shopping-lists/user",
    tag = "shopping-lists",
    responses(
        (status = 200, description = "The caller's lists, newest first", body = Vec<ShoppingListResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn user_lists(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.shopping_lists().for_user(&user)?)))
}

#[utoipa::path(
    get,
    path = "/api/shopping-lists/{id}",
    tag = "shopping-lists",
    params(("id" = Uuid, Path, description = "Shopping list ID")),
    responses(
        (status = 200, description = "Shopping list", body = ShoppingListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No such list for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(state.shopping_lists().get(&user, id)?)))
}

#[utoipa::path(
    post,
    path = "/api/shopping-lists",
    tag = "shopping-lists",
    request_body = ShoppingListRequest,
    responses(
        (status = 201, description = "List created with status ACTIVE", body = ShoppingListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Unknown ingredient", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(request): Json<ShoppingListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.shopping_lists().create(&user, request)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/shopping-lists/{id}",
    tag = "shopping-lists",
    params(("id" = Uuid, Path, description = "Shopping list ID")),
    request_body = ShoppingListUpdateRequest,
    responses(
        (status = 200, description = "List updated", body = ShoppingListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "List or ingredient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ShoppingListUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.shopping_lists().update(&user, id, request)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/shopping-lists/{id}/status",
    tag = "shopping-lists",
    params(("id" = Uuid, Path, description = "Shopping list ID")),
    request_body = ShoppingStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ShoppingListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No such list for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ShoppingStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .shopping_lists()
        .update_status(&user, id, request.status)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/shopping-lists/{id}",
    tag = "shopping-lists",
    params(("id" = Uuid, Path, description = "Shopping list ID")),
    responses(
        (status = 204, description = "List deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No such list for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.shopping_lists().delete(&user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/shopping-lists/{id}/ingredients",
    tag = "shopping-lists",
    params(("id" = Uuid, Path, description = "Shopping list ID")),
    request_body = ShoppingListRequest,
    responses(
        (status = 200, description = "Ingredients merged into the list", body = ShoppingListResponse),
        (status = 400, description = "No ingredients given", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "List or ingredient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_ingredients(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ShoppingListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .shopping_lists()
        .add_ingredients(&user, id, &request.ingredient_ids)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/shopping-lists/{id}/ingredients/{ingredient_id}",
    tag = "shopping-lists",
    params(
        ("id" = Uuid, Path, description = "Shopping list ID"),
        ("ingredient_id" = Uuid, Path, description = "Ingredient to drop")
    ),
    responses(
        (status = 200, description = "Ingredient removed", body = ShoppingListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "List or ingredient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_ingredient(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, ingredient_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .shopping_lists()
        .remove_ingredient(&user, id, ingredient_id)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        user_lists,
        get_list,
        create_list,
        update_list,
        update_status,
        delete_list,
        add_ingredients,
        remove_ingredient,
    ),
    components(schemas(
        ShoppingListRequest,
        ShoppingListUpdateRequest,
        ShoppingStatusRequest,
        ShoppingListResponse,
        crate::models::ShoppingStatus,
    ))
)]
pub struct ApiDoc;
