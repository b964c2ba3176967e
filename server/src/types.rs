//! Request and response bodies, and the entity-to-DTO mappers.

use crate::models::{
    CookingMethod, CuisineType, DietType, DifficultyLevel, Ingredient, IngredientCategory,
    MealType, Recipe, Review, ShoppingList, ShoppingStatus, User, UserPreferences,
};
use crate::store::Page;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    /// Zero-based.
    pub page_number: i64,
    pub page_size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            page_number: page.request.page,
            page_size: page.request.size,
            total_elements: page.total,
            total_pages,
            first: page.request.page == 0,
            last: page.request.page >= total_pages - 1,
            content: page.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users and auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub first_name: String,
    pub last_name: String,
}

/// Used both ways: the stored preferences, and the full replacement on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesBody {
    pub preferred_cuisines: BTreeSet<CuisineType>,
    pub preferred_meal_types: BTreeSet<MealType>,
    pub dietary_restrictions: BTreeSet<DietType>,
    pub preferred_cooking_methods: BTreeSet<CookingMethod>,
    pub preferred_difficulty: Option<DifficultyLevel>,
}

impl From<&UserPreferences> for PreferencesBody {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            preferred_cuisines: prefs.preferred_cuisines.clone(),
            preferred_meal_types: prefs.preferred_meal_types.clone(),
            dietary_restrictions: prefs.dietary_restrictions.clone(),
            preferred_cooking_methods: prefs.preferred_cooking_methods.clone(),
            preferred_difficulty: prefs.preferred_difficulty,
        }
    }
}

// ---------------------------------------------------------------------------
// Ingredients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientBrief {
    pub id: Uuid,
    pub name: String,
    pub category: IngredientCategory,
}

impl From<&Ingredient> for IngredientBrief {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name.clone(),
            category: ingredient.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub category: IngredientCategory,
    pub nutritional_value: Option<String>,
    pub substitutes: Vec<IngredientBrief>,
}

impl IngredientResponse {
    pub fn new(ingredient: &Ingredient, substitutes: &[Ingredient]) -> Self {
        let mut briefs: Vec<IngredientBrief> = substitutes.iter().map(IngredientBrief::from).collect();
        briefs.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            id: ingredient.id,
            name: ingredient.name.clone(),
            category: ingredient.category,
            nutritional_value: ingredient.nutritional_value.clone(),
            substitutes: briefs,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    pub name: String,
    pub category: IngredientCategory,
    pub nutritional_value: Option<String>,
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineRequest {
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

/// Body of recipe create and update. Rating and popularity are not part of
/// it; they only change through reviews and favorites.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub name: String,
    pub description: Option<String>,
    pub cuisine: CuisineType,
    pub meal_type: MealType,
    pub cooking_time: i32,
    pub diet_type: Option<DietType>,
    pub cooking_method: Option<CookingMethod>,
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    pub ingredients: Vec<RecipeLineRequest>,
    pub instructions: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

/// List projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCard {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: CuisineType,
    pub meal_type: MealType,
    pub cooking_time: i32,
    pub diet_type: Option<DietType>,
    pub cooking_method: Option<CookingMethod>,
    pub difficulty: Option<DifficultyLevel>,
    pub image_url: Option<String>,
    pub rating: f64,
    pub popularity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Recipe> for RecipeCard {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            cuisine: recipe.cuisine,
            meal_type: recipe.meal_type,
            cooking_time: recipe.cooking_time,
            diet_type: recipe.diet_type,
            cooking_method: recipe.cooking_method,
            difficulty: recipe.difficulty,
            image_url: recipe.image_url.clone(),
            rating: recipe.rating,
            popularity: recipe.popularity,
            created_at: recipe.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeBrief {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: CuisineType,
    pub meal_type: MealType,
    pub cooking_time: i32,
    pub image_url: Option<String>,
    pub rating: f64,
    pub author: UserProfile,
}

impl RecipeBrief {
    pub fn new(recipe: &Recipe, author: &User) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            cuisine: recipe.cuisine,
            meal_type: recipe.meal_type,
            cooking_time: recipe.cooking_time,
            image_url: recipe.image_url.clone(),
            rating: recipe.rating,
            author: UserProfile::from(author),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: CuisineType,
    pub meal_type: MealType,
    pub cooking_time: i32,
    pub diet_type: Option<DietType>,
    pub cooking_method: Option<CookingMethod>,
    pub difficulty: Option<DifficultyLevel>,
    pub ingredients: Vec<RecipeLine>,
    pub instructions: String,
    pub image_url: Option<String>,
    pub rating: f64,
    pub popularity: i32,
    pub created_at: DateTime<Utc>,
    pub author: UserProfile,
    pub is_favorite: bool,
}

impl RecipeDetail {
    /// `catalog` must hold every ingredient the recipe's lines reference.
    pub fn new(
        recipe: &Recipe,
        author: &User,
        catalog: &HashMap<Uuid, Ingredient>,
        is_favorite: bool,
    ) -> Self {
        let ingredients = recipe
            .ingredients
            .iter()
            .map(|line| RecipeLine {
                ingredient_id: line.ingredient_id,
                ingredient_name: catalog
                    .get(&line.ingredient_id)
                    .map(|i| i.name.clone())
                    .unwrap_or_default(),
                quantity: line.quantity,
                unit: line.unit.clone(),
                notes: line.notes.clone(),
            })
            .collect();

        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            cuisine: recipe.cuisine,
            meal_type: recipe.meal_type,
            cooking_time: recipe.cooking_time,
            diet_type: recipe.diet_type,
            cooking_method: recipe.cooking_method,
            difficulty: recipe.difficulty,
            ingredients,
            instructions: recipe.instructions.clone(),
            image_url: recipe.image_url.clone(),
            rating: recipe.rating,
            popularity: recipe.popularity,
            created_at: recipe.created_at,
            author: UserProfile::from(author),
            is_favorite,
        }
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// 1 to 5.
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user: UserProfile,
    pub recipe: RecipeBrief,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewResponse {
    pub fn new(review: &Review, author: &User, recipe: &Recipe, recipe_author: &User) -> Self {
        Self {
            id: review.id,
            user: UserProfile::from(author),
            recipe: RecipeBrief::new(recipe, recipe_author),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Shopping lists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListRequest {
    #[serde(default)]
    pub ingredient_ids: BTreeSet<Uuid>,
}

/// Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListUpdateRequest {
    pub ingredient_ids: Option<BTreeSet<Uuid>>,
    pub status: Option<ShoppingStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingStatusRequest {
    pub status: ShoppingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListResponse {
    pub id: Uuid,
    pub user: UserProfile,
    pub ingredients: Vec<IngredientBrief>,
    pub status: ShoppingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShoppingListResponse {
    pub fn new(list: &ShoppingList, owner: &User, ingredients: &[Ingredient]) -> Self {
        let mut briefs: Vec<IngredientBrief> = ingredients.iter().map(IngredientBrief::from).collect();
        briefs.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            id: list.id,
            user: UserProfile::from(owner),
            ingredients: briefs,
            status: list.status,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}
