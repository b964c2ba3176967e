use crate::auth::{SigningKeyError, TokenService};
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::services::{
    AuthService, IngredientService, RecipeService, ReviewService, ShoppingListService,
    UserService,
};
use crate::store::Store;
use std::sync::Arc;

/// Everything a handler needs. Services are cheap borrowing views built per call.
pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    pub tokens: TokenService,
    pub google_authorization_url: String,
}

/// Application state shared across all handlers
pub type AppState = Arc<AppContext>;

impl AppContext {
    /// Fails when the signing key is missing or shorter than 256 bits.
    pub fn build(
        auth: &AuthConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Result<AppState, SigningKeyError> {
        let tokens = TokenService::from_base64(
            &auth.jwt_secret,
            chrono::Duration::hours(auth.token_ttl_hours),
            clock.clone(),
        )?;
        Ok(Arc::new(AppContext {
            store,
            clock,
            tokens,
            google_authorization_url: auth.google_authorization_url.clone(),
        }))
    }

    pub fn recipes(&self) -> RecipeService<'_> {
        RecipeService::new(self.store.as_ref(), self.clock.as_ref())
    }

    pub fn ingredients(&self) -> IngredientService<'_> {
        IngredientService::new(self.store.as_ref())
    }

    pub fn reviews(&self) -> ReviewService<'_> {
        ReviewService::new(self.store.as_ref(), self.clock.as_ref())
    }

    pub fn shopping_lists(&self) -> ShoppingListService<'_> {
        ShoppingListService::new(self.store.as_ref(), self.clock.as_ref())
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(self.store.as_ref(), self.clock.as_ref())
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store.as_ref(), self.clock.as_ref(), &self.tokens)
    }
}
