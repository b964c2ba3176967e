use super::{lock_recipe, recipe_detail, require_recipe, require_user};
use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::models::{CuisineType, MealType, Recipe, RecipeIngredient, User};
use crate::query::{AdvancedFilterCriteria, Clause, RecipeFilter, RecipeQuery, RecipeSort};
use crate::store::{Page, PageRequest, Repo, Store};
use crate::types::{RecipeBrief, RecipeCard, RecipeDetail, RecipeLineRequest, RecipeRequest};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Filters for a user's own recipe list. Cuisine and meal type arrive as raw
/// text; values that do not name a variant are ignored.
#[derive(Debug, Clone, Default)]
pub struct UserRecipeFilter {
    pub search: Option<String>,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub sort: Option<String>,
}

pub struct RecipeService<'a> {
    pub(super) store: &'a dyn Store,
    pub(super) clock: &'a dyn Clock,
}

fn validate(request: &RecipeRequest) -> AppResult<()> {
    if request.name.trim().is_empty() {
        return Err(AppError::invalid("Recipe name cannot be empty"));
    }
    if request.instructions.trim().is_empty() {
        return Err(AppError::invalid("Instructions cannot be empty"));
    }
    if request.cooking_time < 1 {
        return Err(AppError::invalid("Cooking time must be at least 1 minute"));
    }
    if let Some(line) = request
        .ingredients
        .iter()
        .find(|line| !line.quantity.is_finite() || line.quantity <= 0.0)
    {
        return Err(AppError::invalid(format!(
            "Quantity for ingredient {} must be a positive number",
            line.ingredient_id
        )));
    }
    Ok(())
}

/// Builds the complete replacement line set, or fails without touching the recipe.
fn resolve_lines(
    repo: &mut dyn Repo,
    requested: &[RecipeLineRequest],
) -> AppResult<Vec<RecipeIngredient>> {
    let ids: BTreeSet<Uuid> = requested.iter().map(|line| line.ingredient_id).collect();
    super::require_ingredients(repo, &ids)?;
    Ok(requested
        .iter()
        .map(|line| RecipeIngredient {
            ingredient_id: line.ingredient_id,
            quantity: line.quantity,
            unit: line.unit.clone(),
            notes: line.notes.clone(),
        })
        .collect())
}

fn cards(page: Page<Recipe>) -> Page<RecipeCard> {
    Page::new(
        page.items.iter().map(RecipeCard::from).collect(),
        page.total,
        page.request,
    )
}

impl<'a> RecipeService<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    pub fn list(
        &self,
        search: Option<&str>,
        sort: RecipeSort,
        page: PageRequest,
    ) -> AppResult<Page<RecipeCard>> {
        let query = RecipeQuery::new(RecipeFilter::all().name_contains(search), sort, page);
        let found = self.store.transaction(|repo| repo.query_recipes(&query))?;
        Ok(cards(found))
    }

    pub fn advanced_search(
        &self,
        criteria: &AdvancedFilterCriteria,
        sort: RecipeSort,
        page: PageRequest,
    ) -> AppResult<Page<RecipeCard>> {
        let query = RecipeQuery::new(criteria.to_filter(), sort, page);
        let found = self.store.transaction(|repo| repo.query_recipes(&query))?;
        Ok(cards(found))
    }

    /// `viewer` decides the favorite flag; anonymous readers always see false.
    pub fn get(&self, id: Uuid, viewer: Option<Uuid>) -> AppResult<RecipeDetail> {
        self.store.transaction(|repo| {
            let recipe = require_recipe(repo, id)?;
            recipe_detail(repo, &recipe, viewer)
        })
    }

    pub fn brief(&self, id: Uuid) -> AppResult<RecipeBrief> {
        self.store.transaction(|repo| {
            let recipe = require_recipe(repo, id)?;
            let author = require_user(repo, recipe.author_id)?;
            Ok(RecipeBrief::new(&recipe, &author))
        })
    }

    pub fn create(&self, author: &User, request: RecipeRequest) -> AppResult<RecipeDetail> {
        validate(&request)?;
        let now = self.clock.now();

        self.store.transaction(|repo| {
            let author = require_user(repo, author.id)?;
            let ingredients = resolve_lines(repo, &request.ingredients)?;
            let recipe = Recipe {
                id: Uuid::new_v4(),
                author_id: author.id,
                name: request.name.trim().to_string(),
                description: request.description.clone(),
                cuisine: request.cuisine,
                meal_type: request.meal_type,
                cooking_time: request.cooking_time,
                diet_type: request.diet_type,
                cooking_method: request.cooking_method,
                difficulty: request.difficulty,
                ingredients,
                instructions: request.instructions.clone(),
                image_url: request.image_url.clone(),
                rating: 0.0,
                popularity: 0,
                created_at: now,
            };
            repo.insert_recipe(&recipe)?;
            tracing::info!(recipe_id = %recipe.id, author_id = %author.id, "recipe created");
            recipe_detail(repo, &recipe, Some(author.id))
        })
    }

    /// Only the author may update. Ingredient lines are replaced wholesale;
    /// rating, popularity, author and creation time carry over.
    pub fn update(&self, caller: &User, id: Uuid, request: RecipeRequest) -> AppResult<RecipeDetail> {
        validate(&request)?;

        self.store.transaction(|repo| {
            let existing = lock_recipe(repo, id)?;
            if existing.author_id != caller.id {
                return Err(AppError::Forbidden(
                    "Only the author can update this recipe".to_string(),
                ));
            }
            let ingredients = resolve_lines(repo, &request.ingredients)?;
            let updated = Recipe {
                name: request.name.trim().to_string(),
                description: request.description.clone(),
                cuisine: request.cuisine,
                meal_type: request.meal_type,
                cooking_time: request.cooking_time,
                diet_type: request.diet_type,
                cooking_method: request.cooking_method,
                difficulty: request.difficulty,
                ingredients,
                instructions: request.instructions.clone(),
                image_url: request.image_url.clone(),
                ..existing
            };
            repo.save_recipe(&updated)?;
            tracing::info!(recipe_id = %id, "recipe updated");
            recipe_detail(repo, &updated, Some(caller.id))
        })
    }

    /// Deletes regardless of who asks, as long as the caller is signed in.
    pub fn delete(&self, caller: &User, id: Uuid) -> AppResult<()> {
        self.store.transaction(|repo| {
            let recipe = require_recipe(repo, id)?;
            if recipe.author_id != caller.id {
                tracing::warn!(recipe_id = %id, author_id = %recipe.author_id, caller_id = %caller.id, "recipe deleted by non-author");
            }
            repo.delete_recipe(id)?;
            tracing::info!(recipe_id = %id, "recipe deleted");
            Ok(())
        })
    }

    pub fn favorite(&self, user: &User, id: Uuid) -> AppResult<RecipeCard> {
        let now = self.clock.now();
        self.store.transaction(|repo| {
            let mut recipe = lock_recipe(repo, id)?;
            if repo.is_favorite(user.id, id)? {
                return Err(AppError::Conflict("Recipe is already in favorites".to_string()));
            }
            repo.insert_favorite(user.id, id, now)?;
            recipe.popularity += 1;
            repo.save_recipe_stats(&recipe)?;
            tracing::debug!(recipe_id = %id, user_id = %user.id, popularity = recipe.popularity, "recipe favorited");
            Ok(RecipeCard::from(&recipe))
        })
    }

    pub fn unfavorite(&self, user: &User, id: Uuid) -> AppResult<RecipeCard> {
        self.store.transaction(|repo| {
            let mut recipe = lock_recipe(repo, id)?;
            if !repo.delete_favorite(user.id, id)? {
                return Err(AppError::Conflict("Recipe is not in favorites".to_string()));
            }
            recipe.popularity = (recipe.popularity - 1).max(0);
            repo.save_recipe_stats(&recipe)?;
            tracing::debug!(recipe_id = %id, user_id = %user.id, popularity = recipe.popularity, "recipe unfavorited");
            Ok(RecipeCard::from(&recipe))
        })
    }

    pub fn user_recipes(
        &self,
        user: &User,
        filter: &UserRecipeFilter,
        page: PageRequest,
    ) -> AppResult<Page<RecipeCard>> {
        let mut recipe_filter = RecipeFilter::all()
            .and(Clause::AuthoredBy(user.id))
            .name_contains(filter.search.as_deref());
        if let Some(cuisine) = filter.cuisine.as_deref().and_then(|c| c.parse::<CuisineType>().ok()) {
            recipe_filter = recipe_filter.and(Clause::CuisineIn(vec![cuisine]));
        }
        if let Some(meal) = filter.meal_type.as_deref().and_then(|m| m.parse::<MealType>().ok()) {
            recipe_filter = recipe_filter.and(Clause::MealTypeIn(vec![meal]));
        }
        let query = RecipeQuery::new(recipe_filter, RecipeSort::preset(filter.sort.as_deref()), page);
        let found = self.store.transaction(|repo| repo.query_recipes(&query))?;
        Ok(cards(found))
    }
}
