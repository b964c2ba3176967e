use crate::api::params::{page_request, DEFAULT_PAGE_SIZE};
use crate::api::ErrorResponse;
use crate::auth::AdminUser;
use crate::error::AppError;
use crate::types::{PageResponse, UserProfile};
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

/// Returns the router for /api/admin endpoints (mounted at /api/admin)
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminPageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    params(AdminPageParams),
    responses(
        (status = 200, description = "Registered users by email", body = PageResponse<UserProfile>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller lacks the ADMIN role", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Query(params): Query<AdminPageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = page_request(params.page, params.size, DEFAULT_PAGE_SIZE);
    let found = state.users().list_users(page)?;
    tracing::debug!(admin_id = %admin.id, total = found.total, "listed users");
    Ok((StatusCode::OK, Json(PageResponse::from(found))))
}

#[derive(OpenApi)]
#[openapi(paths(list_users))]
pub struct ApiDoc;
