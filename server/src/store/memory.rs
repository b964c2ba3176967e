use super::{Page, PageRequest, Repo, Store};
use crate::error::{AppError, AppResult};
use crate::models::{
    Ingredient, IngredientCategory, RatingSummary, Recipe, Review, ShoppingList, User,
    UserPreferences,
};
use crate::query::RecipeQuery;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    preferences: HashMap<Uuid, UserPreferences>,
    ingredients: BTreeMap<Uuid, Ingredient>,
    recipes: BTreeMap<Uuid, Recipe>,
    favorites: BTreeMap<(Uuid, Uuid), DateTime<Utc>>,
    reviews: BTreeMap<Uuid, Review>,
    shopping_lists: BTreeMap<Uuid, ShoppingList>,
}

/// Keeps everything in process. Transactions are serialized behind one lock
/// and run against a copy that replaces the live tables only on success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn run(&self, work: &mut dyn FnMut(&mut dyn Repo) -> AppResult<()>) -> AppResult<()> {
        let mut live = self
            .tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))?;
        let mut repo = MemoryRepo {
            tables: live.clone(),
        };
        work(&mut repo)?;
        *live = repo.tables;
        Ok(())
    }
}

struct MemoryRepo {
    tables: Tables,
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

impl Repo for MemoryRepo {
    fn find_user(&mut self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.users.get(&id).cloned())
    }

    fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn find_users(&mut self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.tables.users.get(id).cloned())
            .collect())
    }

    fn list_users(&mut self, page: PageRequest) -> AppResult<Page<User>> {
        let mut users: Vec<User> = self.tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(Page::slice(users, page))
    }

    fn insert_user(&mut self, user: &User) -> AppResult<()> {
        if self.find_user_by_email(&user.email)?.is_some() {
            return Err(AppError::Conflict(format!("duplicate email {}", user.email)));
        }
        self.tables.users.insert(user.id, user.clone());
        Ok(())
    }

    fn update_user(&mut self, user: &User) -> AppResult<()> {
        self.tables.users.insert(user.id, user.clone());
        Ok(())
    }

    fn find_preferences(&mut self, user_id: Uuid) -> AppResult<Option<UserPreferences>> {
        Ok(self.tables.preferences.get(&user_id).cloned())
    }

    fn save_preferences(&mut self, preferences: &UserPreferences) -> AppResult<()> {
        self.tables
            .preferences
            .insert(preferences.user_id, preferences.clone());
        Ok(())
    }

    fn find_ingredient(&mut self, id: Uuid) -> AppResult<Option<Ingredient>> {
        Ok(self.tables.ingredients.get(&id).cloned())
    }

    fn find_ingredients(&mut self, ids: &[Uuid]) -> AppResult<Vec<Ingredient>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.tables.ingredients.get(id).cloned())
            .collect())
    }

    fn find_ingredient_by_name(&mut self, name: &str) -> AppResult<Option<Ingredient>> {
        let name = name.to_lowercase();
        Ok(self
            .tables
            .ingredients
            .values()
            .find(|i| i.name.to_lowercase() == name)
            .cloned())
    }

    fn search_ingredients(
        &mut self,
        name: Option<&str>,
        category: Option<IngredientCategory>,
        page: PageRequest,
    ) -> AppResult<Page<Ingredient>> {
        let needle = name.map(str::to_lowercase);
        let mut found: Vec<Ingredient> = self
            .tables
            .ingredients
            .values()
            .filter(|i| {
                needle
                    .as_deref()
                    .is_none_or(|n| i.name.to_lowercase().contains(n))
            })
            .filter(|i| category.is_none_or(|c| i.category == c))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(Page::slice(found, page))
    }

    fn insert_ingredient(&mut self, ingredient: &Ingredient) -> AppResult<()> {
        if self.find_ingredient_by_name(&ingredient.name)?.is_some() {
            return Err(AppError::Conflict(format!(
                "duplicate ingredient {}",
                ingredient.name
            )));
        }
        self.tables
            .ingredients
            .insert(ingredient.id, ingredient.clone());
        Ok(())
    }

    fn save_ingredient(&mut self, ingredient: &Ingredient) -> AppResult<()> {
        if let Some(stored) = self.tables.ingredients.get_mut(&ingredient.id) {
            stored.name = ingredient.name.clone();
            stored.category = ingredient.category;
            stored.nutritional_value = ingredient.nutritional_value.clone();
        }
        Ok(())
    }

    fn link_substitute(&mut self, ingredient_id: Uuid, substitute_id: Uuid) -> AppResult<()> {
        if let Some(ingredient) = self.tables.ingredients.get_mut(&ingredient_id) {
            ingredient.substitutes.insert(substitute_id);
        }
        if let Some(substitute) = self.tables.ingredients.get_mut(&substitute_id) {
            substitute.substitute_for.insert(ingredient_id);
        }
        Ok(())
    }

    fn unlink_substitute(&mut self, ingredient_id: Uuid, substitute_id: Uuid) -> AppResult<bool> {
        let mut removed = false;
        if let Some(ingredient) = self.tables.ingredients.get_mut(&ingredient_id) {
            removed |= ingredient.substitutes.remove(&substitute_id);
        }
        if let Some(substitute) = self.tables.ingredients.get_mut(&substitute_id) {
            removed |= substitute.substitute_for.remove(&ingredient_id);
        }
        Ok(removed)
    }

    fn delete_ingredient(&mut self, id: Uuid) -> AppResult<()> {
        self.tables.ingredients.remove(&id);
        for other in self.tables.ingredients.values_mut() {
            other.substitutes.remove(&id);
            other.substitute_for.remove(&id);
        }
        for list in self.tables.shopping_lists.values_mut() {
            list.ingredient_ids.remove(&id);
        }
        Ok(())
    }

    fn ingredient_in_use(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.recipes.values().any(|r| r.uses_ingredient(id)))
    }

    fn find_recipe(&mut self, id: Uuid) -> AppResult<Option<Recipe>> {
        Ok(self.tables.recipes.get(&id).cloned())
    }

    fn lock_recipe(&mut self, id: Uuid) -> AppResult<Option<Recipe>> {
        self.find_recipe(id)
    }

    fn find_recipes(&mut self, ids: &[Uuid]) -> AppResult<Vec<Recipe>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.tables.recipes.get(id).cloned())
            .collect())
    }

    fn insert_recipe(&mut self, recipe: &Recipe) -> AppResult<()> {
        self.tables.recipes.insert(recipe.id, recipe.clone());
        Ok(())
    }

    fn save_recipe(&mut self, recipe: &Recipe) -> AppResult<()> {
        self.tables.recipes.insert(recipe.id, recipe.clone());
        Ok(())
    }

    fn save_recipe_stats(&mut self, recipe: &Recipe) -> AppResult<()> {
        if let Some(stored) = self.tables.recipes.get_mut(&recipe.id) {
            stored.rating = recipe.rating;
            stored.popularity = recipe.popularity;
        }
        Ok(())
    }

    fn delete_recipe(&mut self, id: Uuid) -> AppResult<()> {
        self.tables.recipes.remove(&id);
        self.tables.reviews.retain(|_, r| r.recipe_id != id);
        self.tables.favorites.retain(|(_, recipe_id), _| *recipe_id != id);
        Ok(())
    }

    fn query_recipes(&mut self, query: &RecipeQuery) -> AppResult<Page<Recipe>> {
        let mut found: Vec<Recipe> = self
            .tables
            .recipes
            .values()
            .filter(|r| query.filter.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| query.sort.compare(a, b));
        Ok(Page::slice(found, query.page))
    }

    fn is_favorite(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        Ok(self.tables.favorites.contains_key(&(user_id, recipe_id)))
    }

    fn insert_favorite(
        &mut self,
        user_id: Uuid,
        recipe_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.tables.favorites.insert((user_id, recipe_id), at);
        Ok(())
    }

    fn delete_favorite(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        Ok(self.tables.favorites.remove(&(user_id, recipe_id)).is_some())
    }

    fn favorite_recipes(&mut self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Recipe>> {
        let mut marked: Vec<(DateTime<Utc>, Uuid)> = self
            .tables
            .favorites
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|((_, recipe), at)| (*at, *recipe))
            .collect();
        newest_first(&mut marked, |entry| *entry);
        let recipes = marked
            .into_iter()
            .filter_map(|(_, id)| self.tables.recipes.get(&id).cloned())
            .collect();
        Ok(Page::slice(recipes, page))
    }

    fn find_review(&mut self, id: Uuid) -> AppResult<Option<Review>> {
        Ok(self.tables.reviews.get(&id).cloned())
    }

    fn review_exists(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        Ok(self
            .tables
            .reviews
            .values()
            .any(|r| r.user_id == user_id && r.recipe_id == recipe_id))
    }

    fn insert_review(&mut self, review: &Review) -> AppResult<()> {
        if self.review_exists(review.user_id, review.recipe_id)? {
            return Err(AppError::Conflict("duplicate review".to_string()));
        }
        self.tables.reviews.insert(review.id, review.clone());
        Ok(())
    }

    fn save_review(&mut self, review: &Review) -> AppResult<bool> {
        match self.tables.reviews.get_mut(&review.id) {
            Some(stored) => {
                *stored = review.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_review(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.reviews.remove(&id).is_some())
    }

    fn reviews_for_recipe(
        &mut self,
        recipe_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<Review>> {
        let mut found: Vec<Review> = self
            .tables
            .reviews
            .values()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect();
        newest_first(&mut found, |r| (r.created_at, r.id));
        Ok(Page::slice(found, page))
    }

    fn reviews_by_user(&mut self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Review>> {
        let mut found: Vec<Review> = self
            .tables
            .reviews
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut found, |r| (r.created_at, r.id));
        Ok(Page::slice(found, page))
    }

    fn rating_summary(&mut self, recipe_id: Uuid) -> AppResult<RatingSummary> {
        Ok(self
            .tables
            .reviews
            .values()
            .filter(|r| r.recipe_id == recipe_id)
            .fold(RatingSummary::default(), |acc, r| RatingSummary {
                count: acc.count + 1,
                total: acc.total + i64::from(r.rating),
            }))
    }

    fn find_shopping_list(&mut self, id: Uuid, user_id: Uuid) -> AppResult<Option<ShoppingList>> {
        Ok(self
            .tables
            .shopping_lists
            .get(&id)
            .filter(|l| l.user_id == user_id)
            .cloned())
    }

    fn shopping_lists_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<ShoppingList>> {
        let mut found: Vec<ShoppingList> = self
            .tables
            .shopping_lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut found, |l| (l.created_at, l.id));
        Ok(found)
    }

    fn insert_shopping_list(&mut self, list: &ShoppingList) -> AppResult<()> {
        self.tables.shopping_lists.insert(list.id, list.clone());
        Ok(())
    }

    fn save_shopping_list(&mut self, list: &ShoppingList) -> AppResult<()> {
        self.tables.shopping_lists.insert(list.id, list.clone());
        Ok(())
    }

    fn delete_shopping_list(&mut self, id: Uuid) -> AppResult<()> {
        self.tables.shopping_lists.remove(&id);
        Ok(())
    }
}
