//! Domain entities and the enumerations shared by storage and the HTTP layer.
//!
//! Enumerations are stored as text and travel over the wire in
//! SCREAMING_SNAKE_CASE. Parsing from query strings is case-insensitive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;
use uuid::Uuid;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    CuisineType {
        Italian => "ITALIAN",
        Mexican => "MEXICAN",
        Chinese => "CHINESE",
        Japanese => "JAPANESE",
        Korean => "KOREAN",
        Thai => "THAI",
        Vietnamese => "VIETNAMESE",
        Indian => "INDIAN",
        French => "FRENCH",
        Spanish => "SPANISH",
        Greek => "GREEK",
        Mediterranean => "MEDITERRANEAN",
        MiddleEastern => "MIDDLE_EASTERN",
        Moroccan => "MOROCCAN",
        Turkish => "TURKISH",
        German => "GERMAN",
        British => "BRITISH",
        Russian => "RUSSIAN",
        American => "AMERICAN",
        Other => "OTHER",
    }
}

text_enum! {
    MealType {
        Breakfast => "BREAKFAST",
        Lunch => "LUNCH",
        Dinner => "DINNER",
        Snack => "SNACK",
        Dessert => "DESSERT",
    }
}

text_enum! {
    DietType {
        Omnivore => "OMNIVORE",
        Vegetarian => "VEGETARIAN",
        Vegan => "VEGAN",
        Pescatarian => "PESCATARIAN",
        GlutenFree => "GLUTEN_FREE",
        DairyFree => "DAIRY_FREE",
        Keto => "KETO",
        Paleo => "PALEO",
    }
}

text_enum! {
    CookingMethod {
        Baking => "BAKING",
        Boiling => "BOILING",
        Frying => "FRYING",
        Grilling => "GRILLING",
        Roasting => "ROASTING",
        Sauteing => "SAUTEING",
        SlowCooking => "SLOW_COOKING",
        Steaming => "STEAMING",
        NoCook => "NO_COOK",
    }
}

text_enum! {
    DifficultyLevel {
        Easy => "EASY",
        Medium => "MEDIUM",
        Hard => "HARD",
    }
}

text_enum! {
    IngredientCategory {
        Vegetable => "VEGETABLE",
        Fruit => "FRUIT",
        Meat => "MEAT",
        Seafood => "SEAFOOD",
        Dairy => "DAIRY",
        Grain => "GRAIN",
        Legume => "LEGUME",
        NutSeed => "NUT_SEED",
        Herb => "HERB",
        Spice => "SPICE",
        Oil => "OIL",
        Condiment => "CONDIMENT",
        Sweetener => "SWEETENER",
        Beverage => "BEVERAGE",
        Other => "OTHER",
    }
}

text_enum! {
    ShoppingStatus {
        Active => "ACTIVE",
        Completed => "COMPLETED",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPreferences {
    pub user_id: Uuid,
    pub preferred_cuisines: BTreeSet<CuisineType>,
    pub preferred_meal_types: BTreeSet<MealType>,
    pub dietary_restrictions: BTreeSet<DietType>,
    pub preferred_cooking_methods: BTreeSet<CookingMethod>,
    pub preferred_difficulty: Option<DifficultyLevel>,
}

impl UserPreferences {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}

/// A catalog ingredient.
///
/// `substitutes` and `substitute_for` are the two sides of the same relation:
/// `b` in `a.substitutes` means `a` must be in `b.substitute_for`. Storage never
/// propagates one side from the other; the ingredient service updates both.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub category: IngredientCategory,
    pub nutritional_value: Option<String>,
    pub substitutes: BTreeSet<Uuid>,
    pub substitute_for: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: CuisineType,
    pub meal_type: MealType,
    /// Minutes, at least 1.
    pub cooking_time: i32,
    pub diet_type: Option<DietType>,
    pub cooking_method: Option<CookingMethod>,
    pub difficulty: Option<DifficultyLevel>,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
    pub image_url: Option<String>,
    /// Mean review rating with one decimal, maintained by the rating aggregator.
    pub rating: f64,
    /// Number of users who favorited the recipe.
    pub popularity: i32,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn uses_ingredient(&self, ingredient_id: Uuid) -> bool {
        self.ingredients
            .iter()
            .any(|line| line.ingredient_id == ingredient_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    /// 1 to 5 inclusive.
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ratings are persisted as whole tenths of a star, so a stored rating
/// always has exactly one decimal.
pub fn rating_to_tenths(rating: f64) -> i32 {
    (rating * 10.0).round() as i32
}

pub fn rating_from_tenths(tenths: i32) -> f64 {
    f64::from(tenths) / 10.0
}

/// Count and sum of the review ratings of one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingSummary {
    pub count: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingList {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ingredient_ids: BTreeSet<Uuid>,
    pub status: ShoppingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
