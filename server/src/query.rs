//! Composable recipe search.
//!
//! A [`RecipeQuery`] is a conjunction of [`Clause`]s plus a sort and a page.
//! Both stores execute the same clause list: the memory store through
//! [`Clause::matches`], Postgres by folding each clause into a boxed query.
//! Clauses never join row-multiplying tables, so each recipe appears at most
//! once in a result.

use crate::error::{AppError, AppResult};
use crate::models::{CookingMethod, CuisineType, DietType, DifficultyLevel, MealType, Recipe};
use crate::store::PageRequest;
use serde::Serialize;
use std::cmp::Ordering;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Case-insensitive substring of the recipe name.
    NameContains(String),
    HasIngredient(Uuid),
    LacksIngredient(Uuid),
    MaxCookingTime(i32),
    CuisineIn(Vec<CuisineType>),
    MealTypeIn(Vec<MealType>),
    DietTypeIn(Vec<DietType>),
    CookingMethodIn(Vec<CookingMethod>),
    DifficultyIn(Vec<DifficultyLevel>),
    AuthoredBy(Uuid),
    IdNotIn(Vec<Uuid>),
}

impl Clause {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Clause::NameContains(needle) => recipe
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Clause::HasIngredient(id) => recipe.uses_ingredient(*id),
            Clause::LacksIngredient(id) => !recipe.uses_ingredient(*id),
            Clause::MaxCookingTime(max) => recipe.cooking_time <= *max,
            Clause::CuisineIn(set) => set.contains(&recipe.cuisine),
            Clause::MealTypeIn(set) => set.contains(&recipe.meal_type),
            Clause::DietTypeIn(set) => recipe.diet_type.is_some_and(|d| set.contains(&d)),
            Clause::CookingMethodIn(set) => {
                recipe.cooking_method.is_some_and(|m| set.contains(&m))
            }
            Clause::DifficultyIn(set) => recipe.difficulty.is_some_and(|d| set.contains(&d)),
            Clause::AuthoredBy(author) => recipe.author_id == *author,
            Clause::IdNotIn(ids) => !ids.contains(&recipe.id),
        }
    }
}

/// A conjunction of clauses. The empty filter matches every recipe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    clauses: Vec<Clause>,
}

impl RecipeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Adds a name search unless the text is absent or blank.
    pub fn name_contains(self, text: Option<&str>) -> Self {
        match text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => self.and(Clause::NameContains(text.to_string())),
            None => self,
        }
    }

    /// Adds an enum-set clause unless the set is empty.
    fn and_non_empty<T>(self, values: &[T], clause: impl FnOnce(Vec<T>) -> Clause) -> Self
    where
        T: Clone,
    {
        if values.is_empty() {
            self
        } else {
            self.and(clause(values.to_vec()))
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.clauses.iter().all(|clause| clause.matches(recipe))
    }
}

/// The optional criteria accepted by advanced search. Empty fields add no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedFilterCriteria {
    pub search: Option<String>,
    pub include_ingredients: Vec<Uuid>,
    pub exclude_ingredients: Vec<Uuid>,
    pub max_cooking_time: Option<i32>,
    pub cuisines: Vec<CuisineType>,
    pub meal_types: Vec<MealType>,
    pub diet_types: Vec<DietType>,
    pub cooking_methods: Vec<CookingMethod>,
    pub difficulties: Vec<DifficultyLevel>,
}

impl AdvancedFilterCriteria {
    pub fn to_filter(&self) -> RecipeFilter {
        let mut filter = RecipeFilter::all().name_contains(self.search.as_deref());

        let mut included: Vec<Uuid> = Vec::new();
        for id in &self.include_ingredients {
            if !included.contains(id) {
                included.push(*id);
                filter = filter.and(Clause::HasIngredient(*id));
            }
        }
        let mut excluded: Vec<Uuid> = Vec::new();
        for id in &self.exclude_ingredients {
            if !excluded.contains(id) {
                excluded.push(*id);
                filter = filter.and(Clause::LacksIngredient(*id));
            }
        }
        if let Some(max) = self.max_cooking_time {
            filter = filter.and(Clause::MaxCookingTime(max));
        }

        filter
            .and_non_empty(&self.cuisines, Clause::CuisineIn)
            .and_non_empty(&self.meal_types, Clause::MealTypeIn)
            .and_non_empty(&self.diet_types, Clause::DietTypeIn)
            .and_non_empty(&self.cooking_methods, Clause::CookingMethodIn)
            .and_non_empty(&self.difficulties, Clause::DifficultyIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Difficulty,
    Cuisine,
    MealType,
    DietType,
    CookingMethod,
    Rating,
    Popularity,
    CookingTime,
    CreatedAt,
}

impl SortField {
    /// Fields accepted by the plain recipe listing.
    pub const LISTING: &'static [SortField] = &[
        SortField::Name,
        SortField::Difficulty,
        SortField::CookingTime,
        SortField::Rating,
    ];

    /// Fields accepted by advanced search.
    pub const SEARCH: &'static [SortField] = &[
        SortField::Name,
        SortField::Difficulty,
        SortField::Cuisine,
        SortField::MealType,
        SortField::DietType,
        SortField::CookingMethod,
        SortField::Rating,
        SortField::Popularity,
        SortField::CookingTime,
    ];

    pub fn param_name(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Difficulty => "difficulty",
            SortField::Cuisine => "cuisine",
            SortField::MealType => "mealType",
            SortField::DietType => "dietType",
            SortField::CookingMethod => "cookingMethod",
            SortField::Rating => "rating",
            SortField::Popularity => "popularity",
            SortField::CookingTime => "cookingTime",
            SortField::CreatedAt => "createdAt",
        }
    }

    /// Resolves a request parameter against an allow-list. Anything absent or
    /// outside the list sorts by name.
    pub fn resolve(param: Option<&str>, allowed: &[SortField]) -> SortField {
        param
            .map(str::trim)
            .and_then(|p| {
                allowed
                    .iter()
                    .copied()
                    .find(|field| field.param_name().eq_ignore_ascii_case(p))
            })
            .unwrap_or(SortField::Name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parses `asc`/`desc` case-insensitively; an absent value yields `default`.
    pub fn parse_or(param: Option<&str>, default: Direction) -> AppResult<Direction> {
        let Some(raw) = param.map(str::trim) else {
            return Ok(default);
        };
        if raw.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(AppError::invalid(format!(
                "Invalid sort direction '{}', expected 'asc' or 'desc'",
                raw
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeSort {
    pub field: SortField,
    pub direction: Direction,
}

impl RecipeSort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    /// The named orderings offered on a user's own recipe list. Unknown names sort newest first.
    pub fn preset(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some("oldest") => Self::asc(SortField::CreatedAt),
            Some("name_asc") => Self::asc(SortField::Name),
            Some("name_desc") => Self::desc(SortField::Name),
            Some("rating") => Self::desc(SortField::Rating),
            Some("popularity") => Self::desc(SortField::Popularity),
            _ => Self::desc(SortField::CreatedAt),
        }
    }

    /// Total order used by the memory store. Missing optional values sort
    /// after present ones ascending and before them descending, and ties
    /// break on id ascending, which is what Postgres does with the same ORDER BY.
    pub fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        fn optional(a: Option<&str>, b: Option<&str>) -> Ordering {
            match (a, b) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }

        let primary = match self.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Difficulty => optional(
                a.difficulty.map(|d| d.as_str()),
                b.difficulty.map(|d| d.as_str()),
            ),
            SortField::Cuisine => a.cuisine.as_str().cmp(b.cuisine.as_str()),
            SortField::MealType => a.meal_type.as_str().cmp(b.meal_type.as_str()),
            SortField::DietType => optional(
                a.diet_type.map(|d| d.as_str()),
                b.diet_type.map(|d| d.as_str()),
            ),
            SortField::CookingMethod => optional(
                a.cooking_method.map(|m| m.as_str()),
                b.cooking_method.map(|m| m.as_str()),
            ),
            SortField::Rating => a.rating.total_cmp(&b.rating),
            SortField::Popularity => a.popularity.cmp(&b.popularity),
            SortField::CookingTime => a.cooking_time.cmp(&b.cooking_time),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match self.direction {
            Direction::Asc => primary,
            Direction::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub sort: RecipeSort,
    pub page: PageRequest,
}

impl RecipeQuery {
    pub fn new(filter: RecipeFilter, sort: RecipeSort, page: PageRequest) -> Self {
        Self { filter, sort, page }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeIngredient;
    use chrono::{TimeZone, Utc};

    fn recipe(name: &str, ingredients: &[Uuid], cooking_time: i32) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            author_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            cuisine: CuisineType::Italian,
            meal_type: MealType::Dinner,
            cooking_time,
            diet_type: None,
            cooking_method: Some(CookingMethod::Boiling),
            difficulty: Some(DifficultyLevel::Easy),
            ingredients: ingredients
                .iter()
                .map(|id| RecipeIngredient {
                    ingredient_id: *id,
                    quantity: 1.0,
                    unit: None,
                    notes: None,
                })
                .collect(),
            instructions: "cook".to_string(),
            image_url: None,
            rating: 0.0,
            popularity: 0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let filter = AdvancedFilterCriteria::default().to_filter();
        assert!(filter.clauses().is_empty());
        assert!(filter.matches(&recipe("anything", &[], 500)));
    }

    #[test]
    fn test_include_requires_every_ingredient() {
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        let criteria = AdvancedFilterCriteria {
            include_ingredients: vec![x, y, x],
            ..Default::default()
        };
        let filter = criteria.to_filter();
        assert_eq!(filter.clauses().len(), 2);
        assert!(filter.matches(&recipe("both", &[x, y], 10)));
        assert!(!filter.matches(&recipe("only x", &[x], 10)));
    }

    #[test]
    fn test_exclude_rejects_any_listed_ingredient() {
        let (x, z) = (Uuid::new_v4(), Uuid::new_v4());
        let criteria = AdvancedFilterCriteria {
            exclude_ingredients: vec![z],
            ..Default::default()
        };
        let filter = criteria.to_filter();
        assert!(filter.matches(&recipe("clean", &[x], 10)));
        assert!(!filter.matches(&recipe("tainted", &[x, z], 10)));
    }

    #[test]
    fn test_criteria_intersect() {
        let x = Uuid::new_v4();
        let criteria = AdvancedFilterCriteria {
            search: Some("PASTA".to_string()),
            include_ingredients: vec![x],
            max_cooking_time: Some(30),
            cuisines: vec![CuisineType::Italian],
            difficulties: vec![DifficultyLevel::Easy, DifficultyLevel::Medium],
            ..Default::default()
        };
        let filter = criteria.to_filter();
        assert!(filter.matches(&recipe("Quick pasta", &[x], 30)));
        assert!(!filter.matches(&recipe("Quick pasta", &[x], 31)));
        assert!(!filter.matches(&recipe("Risotto", &[x], 20)));

        let mut mexican = recipe("Pasta taco", &[x], 20);
        mexican.cuisine = CuisineType::Mexican;
        assert!(!filter.matches(&mexican));
    }

    #[test]
    fn test_optional_enum_filter_skips_unset_field() {
        let filter = RecipeFilter::all().and(Clause::DietTypeIn(vec![DietType::Vegan]));
        assert!(!filter.matches(&recipe("no diet", &[], 10)));
    }

    #[test]
    fn test_blank_search_adds_nothing() {
        assert!(RecipeFilter::all().name_contains(Some("   ")).clauses().is_empty());
        assert!(RecipeFilter::all().name_contains(None).clauses().is_empty());
    }

    #[test]
    fn test_sort_field_falls_back_to_name() {
        assert_eq!(
            SortField::resolve(Some("popularity"), SortField::LISTING),
            SortField::Name
        );
        assert_eq!(
            SortField::resolve(Some("popularity"), SortField::SEARCH),
            SortField::Popularity
        );
        assert_eq!(
            SortField::resolve(Some("COOKINGTIME"), SortField::LISTING),
            SortField::CookingTime
        );
        assert_eq!(SortField::resolve(Some("bogus"), SortField::SEARCH), SortField::Name);
        assert_eq!(SortField::resolve(None, SortField::SEARCH), SortField::Name);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::parse_or(Some("DESC"), Direction::Asc).unwrap(), Direction::Desc);
        assert_eq!(Direction::parse_or(Some("asc"), Direction::Desc).unwrap(), Direction::Asc);
        assert_eq!(Direction::parse_or(None, Direction::Desc).unwrap(), Direction::Desc);
        assert!(matches!(
            Direction::parse_or(Some("sideways"), Direction::Asc),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_presets() {
        assert_eq!(RecipeSort::preset(Some("oldest")), RecipeSort::asc(SortField::CreatedAt));
        assert_eq!(RecipeSort::preset(Some("rating")), RecipeSort::desc(SortField::Rating));
        assert_eq!(RecipeSort::preset(Some("whatever")), RecipeSort::desc(SortField::CreatedAt));
        assert_eq!(RecipeSort::preset(None), RecipeSort::desc(SortField::CreatedAt));
    }

    #[test]
    fn test_compare_puts_missing_values_last_ascending() {
        let easy = recipe("a", &[], 10);
        let mut unset = recipe("b", &[], 10);
        unset.difficulty = None;
        let sort = RecipeSort::asc(SortField::Difficulty);
        assert_eq!(sort.compare(&easy, &unset), Ordering::Less);
        let sort = RecipeSort::desc(SortField::Difficulty);
        assert_eq!(sort.compare(&easy, &unset), Ordering::Greater);
    }
}
