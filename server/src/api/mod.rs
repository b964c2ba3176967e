pub mod admin;
pub mod ingredients;
pub mod params;
pub mod public;
pub mod recipes;
pub mod reviews;
pub mod shopping_lists;
pub mod users;

use crate::auth;
use crate::AppState;
use axum::{middleware, Router};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every API route with its state applied. Transport layers (tracing, CORS,
/// Swagger UI) are added by the binary.
pub fn router(state: AppState) -> Router {
    // Mixed routers: public reads, writes authenticate per handler
    let open_router = Router::new()
        .merge(public::router())
        .nest("/api/recipes", recipes::router())
        .nest("/api/ingredients", ingredients::router())
        .nest("/api/reviews", reviews::router())
        .nest("/api/admin", admin::router());

    // Every route here needs a user
    let protected_router = Router::new()
        .nest("/api/shopping-lists", shopping_lists::router())
        .nest("/api/users", users::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(open_router)
        .merge(protected_router)
        .with_state(state)
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Kooking API", description = "Recipes, reviews, ingredients and shopping lists"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        reviews::ApiDoc::openapi(),
        shopping_lists::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
        admin::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_covers_every_resource() {
        let spec = openapi();
        for path in [
            "/api/auth/register",
            "/api/recipes/advanced-search",
            "/api/recipes/{id}/favorite",
            "/api/ingredients/{id}/substitutes/{substitute_id}",
            "/api/reviews/recipe/{recipe_id}",
            "/api/shopping-lists/{id}/ingredients/{ingredient_id}",
            "/api/users/me/preferences",
            "/api/admin/users",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
        let schemes = &spec.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
