//! Business rules. Every public operation runs in exactly one store
//! transaction and returns transport DTOs.

mod auth;
mod ingredients;
pub mod rating;
mod recipes;
mod reviews;
pub mod selection;
mod shopping_lists;
mod users;

pub use auth::AuthService;
pub use ingredients::IngredientService;
pub use recipes::{RecipeService, UserRecipeFilter};
pub use reviews::ReviewService;
pub use shopping_lists::ShoppingListService;
pub use users::UserService;

use crate::error::{AppError, AppResult};
use crate::models::{Ingredient, Recipe, User};
use crate::store::Repo;
use crate::types::RecipeDetail;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

fn require_user(repo: &mut dyn Repo, id: Uuid) -> AppResult<User> {
    repo.find_user(id)?
        .ok_or_else(|| AppError::not_found("User", id))
}

fn require_recipe(repo: &mut dyn Repo, id: Uuid) -> AppResult<Recipe> {
    repo.find_recipe(id)?
        .ok_or_else(|| AppError::not_found("Recipe", id))
}

fn lock_recipe(repo: &mut dyn Repo, id: Uuid) -> AppResult<Recipe> {
    repo.lock_recipe(id)?
        .ok_or_else(|| AppError::not_found("Recipe", id))
}

fn require_ingredient(repo: &mut dyn Repo, id: Uuid) -> AppResult<Ingredient> {
    repo.find_ingredient(id)?
        .ok_or_else(|| AppError::not_found("Ingredient", id))
}

/// Loads every listed ingredient, failing on the first id that does not exist.
fn require_ingredients(repo: &mut dyn Repo, ids: &BTreeSet<Uuid>) -> AppResult<Vec<Ingredient>> {
    let wanted: Vec<Uuid> = ids.iter().copied().collect();
    let found = repo.find_ingredients(&wanted)?;
    if let Some(missing) = wanted.iter().find(|id| !found.iter().any(|i| i.id == **id)) {
        return Err(AppError::not_found("Ingredient", missing));
    }
    Ok(found)
}

fn users_by_id(repo: &mut dyn Repo, ids: impl IntoIterator<Item = Uuid>) -> AppResult<HashMap<Uuid, User>> {
    let ids: BTreeSet<Uuid> = ids.into_iter().collect();
    let wanted: Vec<Uuid> = ids.into_iter().collect();
    Ok(repo
        .find_users(&wanted)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

fn recipe_detail(
    repo: &mut dyn Repo,
    recipe: &Recipe,
    viewer: Option<Uuid>,
) -> AppResult<RecipeDetail> {
    let author = require_user(repo, recipe.author_id)?;
    let ids: Vec<Uuid> = recipe.ingredients.iter().map(|l| l.ingredient_id).collect();
    let catalog: HashMap<Uuid, Ingredient> = repo
        .find_ingredients(&ids)?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();
    let is_favorite = match viewer {
        Some(user_id) => repo.is_favorite(user_id, recipe.id)?,
        None => false,
    };
    Ok(RecipeDetail::new(recipe, &author, &catalog, is_favorite))
}

fn validate_name(field: &str, value: &str) -> AppResult<()> {
    let len = value.trim().chars().count();
    if !(3..=20).contains(&len) {
        return Err(AppError::invalid(format!(
            "{} must be between 3 and 20 characters",
            field
        )));
    }
    Ok(())
}
