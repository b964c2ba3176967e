//! Persistence collaborator.
//!
//! Services talk to storage only through [`Repo`], obtained inside
//! [`Store::transaction`]. Everything a repo does within one transaction
//! commits together or not at all.

pub mod memory;
pub mod pg;

use crate::error::{AppError, AppResult};
use crate::models::{
    Ingredient, IngredientCategory, RatingSummary, Recipe, Review, ShoppingList, User,
    UserPreferences,
};
use crate::query::RecipeQuery;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub const MAX_SIZE: i64 = 100;

    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: page.max(0),
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    pub fn first(size: i64) -> Self {
        Self::new(0, size)
    }

    /// Saturates instead of overflowing, so an absurd page index yields an
    /// empty page.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Slices an already-filtered, already-sorted collection.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.size as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn total_pages(&self) -> i64 {
        (self.total + self.request.size - 1) / self.request.size
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page::new(self.items.into_iter().map(f).collect(), self.total, self.request)
    }

    pub fn try_map<U>(self, f: impl FnMut(T) -> AppResult<U>) -> AppResult<Page<U>> {
        let items = self.items.into_iter().map(f).collect::<AppResult<Vec<U>>>()?;
        Ok(Page::new(items, self.total, self.request))
    }
}

/// Storage primitives. Lookups return `Ok(None)` for missing rows; deciding
/// whether that is an error is the caller's job.
pub trait Repo {
    fn find_user(&mut self, id: Uuid) -> AppResult<Option<User>>;
    /// Email comparison is case-insensitive.
    fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>>;
    fn find_users(&mut self, ids: &[Uuid]) -> AppResult<Vec<User>>;
    fn list_users(&mut self, page: PageRequest) -> AppResult<Page<User>>;
    fn insert_user(&mut self, user: &User) -> AppResult<()>;
    fn update_user(&mut self, user: &User) -> AppResult<()>;
    fn find_preferences(&mut self, user_id: Uuid) -> AppResult<Option<UserPreferences>>;
    /// Insert or overwrite.
    fn save_preferences(&mut self, preferences: &UserPreferences) -> AppResult<()>;

    fn find_ingredient(&mut self, id: Uuid) -> AppResult<Option<Ingredient>>;
    fn find_ingredients(&mut self, ids: &[Uuid]) -> AppResult<Vec<Ingredient>>;
    /// Name comparison is case-insensitive.
    fn find_ingredient_by_name(&mut self, name: &str) -> AppResult<Option<Ingredient>>;
    fn search_ingredients(
        &mut self,
        name: Option<&str>,
        category: Option<IngredientCategory>,
        page: PageRequest,
    ) -> AppResult<Page<Ingredient>>;
    fn insert_ingredient(&mut self, ingredient: &Ingredient) -> AppResult<()>;
    /// Writes the scalar fields only. Substitute links change through
    /// [`Repo::link_substitute`] and [`Repo::unlink_substitute`].
    fn save_ingredient(&mut self, ingredient: &Ingredient) -> AppResult<()>;
    /// Records `substitute_id` as usable in place of `ingredient_id`, updating
    /// both adjacency sets. Linking twice is a no-op.
    fn link_substitute(&mut self, ingredient_id: Uuid, substitute_id: Uuid) -> AppResult<()>;
    /// Removes one link from both adjacency sets. Returns whether it existed.
    fn unlink_substitute(&mut self, ingredient_id: Uuid, substitute_id: Uuid) -> AppResult<bool>;
    fn delete_ingredient(&mut self, id: Uuid) -> AppResult<()>;
    /// Whether any recipe line references the ingredient.
    fn ingredient_in_use(&mut self, id: Uuid) -> AppResult<bool>;

    fn find_recipe(&mut self, id: Uuid) -> AppResult<Option<Recipe>>;
    /// Like `find_recipe`, but holds the row until the transaction ends.
    fn lock_recipe(&mut self, id: Uuid) -> AppResult<Option<Recipe>>;
    fn find_recipes(&mut self, ids: &[Uuid]) -> AppResult<Vec<Recipe>>;
    fn insert_recipe(&mut self, recipe: &Recipe) -> AppResult<()>;
    /// Writes every field and replaces the ingredient lines wholesale.
    fn save_recipe(&mut self, recipe: &Recipe) -> AppResult<()>;
    /// Writes only rating and popularity.
    fn save_recipe_stats(&mut self, recipe: &Recipe) -> AppResult<()>;
    /// Removes the recipe with its lines, reviews and favorites.
    fn delete_recipe(&mut self, id: Uuid) -> AppResult<()>;
    fn query_recipes(&mut self, query: &RecipeQuery) -> AppResult<Page<Recipe>>;

    fn is_favorite(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool>;
    fn insert_favorite(&mut self, user_id: Uuid, recipe_id: Uuid, at: DateTime<Utc>)
        -> AppResult<()>;
    /// Returns whether a favorite existed.
    fn delete_favorite(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool>;
    /// Most recently favorited first.
    fn favorite_recipes(&mut self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Recipe>>;

    fn find_review(&mut self, id: Uuid) -> AppResult<Option<Review>>;
    fn review_exists(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool>;
    fn insert_review(&mut self, review: &Review) -> AppResult<()>;
    /// Returns false when the review no longer exists.
    fn save_review(&mut self, review: &Review) -> AppResult<bool>;
    fn delete_review(&mut self, id: Uuid) -> AppResult<bool>;
    /// Newest first.
    fn reviews_for_recipe(&mut self, recipe_id: Uuid, page: PageRequest)
        -> AppResult<Page<Review>>;
    /// Newest first.
    fn reviews_by_user(&mut self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Review>>;
    fn rating_summary(&mut self, recipe_id: Uuid) -> AppResult<RatingSummary>;

    /// Scoped to the owner; another user's list is reported as missing.
    fn find_shopping_list(&mut self, id: Uuid, user_id: Uuid) -> AppResult<Option<ShoppingList>>;
    /// Newest first.
    fn shopping_lists_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<ShoppingList>>;
    fn insert_shopping_list(&mut self, list: &ShoppingList) -> AppResult<()>;
    /// Writes status, timestamps and replaces the ingredient set.
    fn save_shopping_list(&mut self, list: &ShoppingList) -> AppResult<()>;
    fn delete_shopping_list(&mut self, id: Uuid) -> AppResult<()>;
}

pub trait Store: Send + Sync {
    /// Runs `work` in one transaction, committing only if it returns `Ok`.
    fn run(&self, work: &mut dyn FnMut(&mut dyn Repo) -> AppResult<()>) -> AppResult<()>;
}

impl<'s> dyn Store + 's {
    pub fn transaction<T>(
        &self,
        work: impl FnOnce(&mut dyn Repo) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut work = Some(work);
        let mut output = None;
        self.run(&mut |repo: &mut dyn Repo| -> AppResult<()> {
            let work = work
                .take()
                .ok_or_else(|| anyhow::anyhow!("transaction body invoked twice"))?;
            output = Some(work(repo)?);
            Ok(())
        })?;
        output.ok_or_else(|| AppError::Internal(anyhow::anyhow!("transaction produced no output")))
    }
}
