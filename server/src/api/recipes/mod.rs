pub mod create;
pub mod delete;
pub mod favorite;
pub mod featured;
pub mod get;
pub mod list;
pub mod mine;
pub mod update;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes).
/// Reads are public; writes authenticate through the `AuthUser` extractor.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/advanced-search", get(list::advanced_search))
        .route("/trending", get(featured::trending))
        .route("/recommended", get(featured::recommended))
        .route("/seasonal", get(featured::seasonal))
        .route("/user", get(mine::user_recipes))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/brief", get(get::get_recipe_brief))
        .route(
            "/{id}/favorite",
            post(favorite::favorite_recipe).delete(favorite::unfavorite_recipe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        list::advanced_search,
        featured::trending,
        featured::recommended,
        featured::seasonal,
        mine::user_recipes,
        get::get_recipe,
        get::get_recipe_brief,
        create::create_recipe,
        update::update_recipe,
        delete::delete_recipe,
        favorite::favorite_recipe,
        favorite::unfavorite_recipe,
    ),
    components(schemas(
        crate::types::RecipeCard,
        crate::types::RecipeBrief,
        crate::types::RecipeDetail,
        crate::types::RecipeLine,
        crate::types::RecipeRequest,
        crate::types::RecipeLineRequest,
        crate::types::UserProfile,
        crate::models::CuisineType,
        crate::models::MealType,
        crate::models::DietType,
        crate::models::CookingMethod,
        crate::models::DifficultyLevel,
    ))
)]
pub struct ApiDoc;
