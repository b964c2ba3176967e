pub mod read;
pub mod write;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/ingredients endpoints (mounted at /api/ingredients)
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(read::list_ingredients).post(write::create_ingredient),
        )
        .route("/categories", get(read::list_categories))
        .route(
            "/{id}",
            get(read::get_ingredient)
                .put(write::update_ingredient)
                .delete(write::delete_ingredient),
        )
        .route("/{id}/substitutes", get(read::list_substitutes))
        .route(
            "/{id}/substitutes/{substitute_id}",
            post(write::add_substitute).delete(write::remove_substitute),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        read::list_ingredients,
        read::get_ingredient,
        read::list_categories,
        read::list_substitutes,
        write::create_ingredient,
        write::update_ingredient,
        write::delete_ingredient,
        write::add_substitute,
        write::remove_substitute,
    ),
    components(schemas(
        crate::types::IngredientResponse,
        crate::types::IngredientBrief,
        crate::types::IngredientRequest,
        crate::models::IngredientCategory,
    ))
)]
pub struct ApiDoc;
