use super::{Page, PageRequest, Repo, Store};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    rating_from_tenths, rating_to_tenths, Ingredient, IngredientCategory, RatingSummary, Recipe,
    RecipeIngredient, Review, ShoppingList, UnknownVariant, User, UserPreferences,
};
use crate::query::{Clause, Direction, RecipeFilter, RecipeQuery, RecipeSort, SortField};
use crate::raw_sql::{contains_pattern, count_over};
use crate::schema::{
    favorite_recipes, ingredient_substitutes, ingredients, recipe_ingredients, recipes, reviews,
    shopping_list_ingredients, shopping_lists, user_preferences, users,
};
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, not, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use uuid::Uuid;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for PgStore {
    fn run(&self, work: &mut dyn FnMut(&mut dyn Repo) -> AppResult<()>) -> AppResult<()> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<_, AppError, _>(|conn| work(&mut PgRepo { conn }))
    }
}

struct PgRepo<'c> {
    conn: &'c mut PgConnection,
}

fn decode<T>(column: &str, value: &str) -> AppResult<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt {column} column: {e}")))
}

fn decode_opt<T>(column: &str, value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.map(|v| decode(column, v)).transpose()
}

fn decode_set<T>(column: &str, values: &[Option<String>]) -> AppResult<BTreeSet<T>>
where
    T: FromStr<Err = UnknownVariant> + Ord,
{
    values.iter().flatten().map(|v| decode(column, v)).collect()
}

fn encode_set<T: std::fmt::Display>(values: &BTreeSet<T>) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    roles: Vec<Option<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            roles: user.roles.iter().cloned().map(Some).collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            roles: row.roles.into_iter().flatten().collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_preferences)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct PreferencesRow {
    user_id: Uuid,
    preferred_cuisines: Vec<Option<String>>,
    preferred_meal_types: Vec<Option<String>>,
    dietary_restrictions: Vec<Option<String>>,
    preferred_cooking_methods: Vec<Option<String>>,
    preferred_difficulty: Option<String>,
}

impl PreferencesRow {
    fn into_domain(self) -> AppResult<UserPreferences> {
        Ok(UserPreferences {
            user_id: self.user_id,
            preferred_cuisines: decode_set("preferred_cuisines", &self.preferred_cuisines)?,
            preferred_meal_types: decode_set("preferred_meal_types", &self.preferred_meal_types)?,
            dietary_restrictions: decode_set("dietary_restrictions", &self.dietary_restrictions)?,
            preferred_cooking_methods: decode_set(
                "preferred_cooking_methods",
                &self.preferred_cooking_methods,
            )?,
            preferred_difficulty: decode_opt(
                "preferred_difficulty",
                self.preferred_difficulty.as_deref(),
            )?,
        })
    }
}

impl From<&UserPreferences> for PreferencesRow {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            user_id: prefs.user_id,
            preferred_cuisines: encode_set(&prefs.preferred_cuisines),
            preferred_meal_types: encode_set(&prefs.preferred_meal_types),
            dietary_restrictions: encode_set(&prefs.dietary_restrictions),
            preferred_cooking_methods: encode_set(&prefs.preferred_cooking_methods),
            preferred_difficulty: prefs.preferred_difficulty.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct IngredientRow {
    id: Uuid,
    name: String,
    category: String,
    nutritional_value: Option<String>,
}

impl From<&Ingredient> for IngredientRow {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name.clone(),
            category: ingredient.category.to_string(),
            nutritional_value: ingredient.nutritional_value.clone(),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct RecipeRow {
    id: Uuid,
    author_id: Uuid,
    name: String,
    description: Option<String>,
    cuisine: String,
    meal_type: String,
    cooking_time: i32,
    diet_type: Option<String>,
    cooking_method: Option<String>,
    difficulty: Option<String>,
    instructions: String,
    image_url: Option<String>,
    rating_tenths: i32,
    popularity: i32,
    created_at: DateTime<Utc>,
}

impl From<&Recipe> for RecipeRow {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            author_id: recipe.author_id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            cuisine: recipe.cuisine.to_string(),
            meal_type: recipe.meal_type.to_string(),
            cooking_time: recipe.cooking_time,
            diet_type: recipe.diet_type.map(|d| d.to_string()),
            cooking_method: recipe.cooking_method.map(|m| m.to_string()),
            difficulty: recipe.difficulty.map(|d| d.to_string()),
            instructions: recipe.instructions.clone(),
            image_url: recipe.image_url.clone(),
            rating_tenths: rating_to_tenths(recipe.rating),
            popularity: recipe.popularity,
            created_at: recipe.created_at,
        }
    }
}

impl RecipeRow {
    fn into_domain(self, ingredients: Vec<RecipeIngredient>) -> AppResult<Recipe> {
        Ok(Recipe {
            id: self.id,
            author_id: self.author_id,
            name: self.name,
            description: self.description,
            cuisine: decode("cuisine", &self.cuisine)?,
            meal_type: decode("meal_type", &self.meal_type)?,
            cooking_time: self.cooking_time,
            diet_type: decode_opt("diet_type", self.diet_type.as_deref())?,
            cooking_method: decode_opt("cooking_method", self.cooking_method.as_deref())?,
            difficulty: decode_opt("difficulty", self.difficulty.as_deref())?,
            ingredients,
            instructions: self.instructions,
            image_url: self.image_url,
            rating: rating_from_tenths(self.rating_tenths),
            popularity: self.popularity,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = recipe_ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct RecipeLineRow {
    id: Uuid,
    recipe_id: Uuid,
    ingredient_id: Uuid,
    position: i32,
    quantity: f64,
    unit: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    recipe_id: Uuid,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            recipe_id: review.recipe_id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            recipe_id: row.recipe_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = shopping_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct ShoppingListRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&ShoppingList> for ShoppingListRow {
    fn from(list: &ShoppingList) -> Self {
        Self {
            id: list.id,
            user_id: list.user_id,
            status: list.status.to_string(),
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}

/// Applies every clause of the filter. Ingredient clauses are `IN (SELECT ...)`
/// subqueries rather than joins so each recipe row appears once.
fn filtered(filter: &RecipeFilter) -> recipes::BoxedQuery<'static, Pg> {
    fn names<T: std::fmt::Display>(values: &[T]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }
    fn recipes_using(ingredient_id: Uuid) -> recipe_ingredients::BoxedQuery<'static, Pg, diesel::sql_types::Uuid> {
        recipe_ingredients::table
            .filter(recipe_ingredients::ingredient_id.eq(ingredient_id))
            .select(recipe_ingredients::recipe_id)
            .into_boxed()
    }

    let mut query = recipes::table.into_boxed();
    for clause in filter.clauses() {
        query = match clause {
            Clause::NameContains(text) => query.filter(recipes::name.ilike(contains_pattern(text))),
            Clause::HasIngredient(id) => query.filter(recipes::id.eq_any(recipes_using(*id))),
            Clause::LacksIngredient(id) => {
                query.filter(not(recipes::id.eq_any(recipes_using(*id))))
            }
            Clause::MaxCookingTime(max) => query.filter(recipes::cooking_time.le(*max)),
            Clause::CuisineIn(set) => query.filter(recipes::cuisine.eq_any(names(set))),
            Clause::MealTypeIn(set) => query.filter(recipes::meal_type.eq_any(names(set))),
            Clause::DietTypeIn(set) => query.filter(recipes::diet_type.eq_any(names(set))),
            Clause::CookingMethodIn(set) => {
                query.filter(recipes::cooking_method.eq_any(names(set)))
            }
            Clause::DifficultyIn(set) => query.filter(recipes::difficulty.eq_any(names(set))),
            Clause::AuthoredBy(author) => query.filter(recipes::author_id.eq(*author)),
            Clause::IdNotIn(ids) => query.filter(not(recipes::id.eq_any(ids.clone()))),
        };
    }
    query
}

macro_rules! order_by {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            Direction::Asc => $query.order($column.asc()),
            Direction::Desc => $query.order($column.desc()),
        }
    };
}

/// Postgres puts NULLs last ascending and first descending, matching `RecipeSort::compare`.
fn ordered(
    query: recipes::BoxedQuery<'static, Pg>,
    sort: RecipeSort,
) -> recipes::BoxedQuery<'static, Pg> {
    let direction = sort.direction;
    let query = match sort.field {
        SortField::Name => order_by!(query, recipes::name, direction),
        SortField::Difficulty => order_by!(query, recipes::difficulty, direction),
        SortField::Cuisine => order_by!(query, recipes::cuisine, direction),
        SortField::MealType => order_by!(query, recipes::meal_type, direction),
        SortField::DietType => order_by!(query, recipes::diet_type, direction),
        SortField::CookingMethod => order_by!(query, recipes::cooking_method, direction),
        SortField::Rating => order_by!(query, recipes::rating_tenths, direction),
        SortField::Popularity => order_by!(query, recipes::popularity, direction),
        SortField::CookingTime => order_by!(query, recipes::cooking_time, direction),
        SortField::CreatedAt => order_by!(query, recipes::created_at, direction),
    };
    query.then_order_by(recipes::id.asc())
}

impl PgRepo<'_> {
    fn load_lines(&mut self, recipe_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<RecipeIngredient>>> {
        let rows: Vec<RecipeLineRow> = recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
            .order((recipe_ingredients::recipe_id, recipe_ingredients::position))
            .select(RecipeLineRow::as_select())
            .load(self.conn)?;

        let mut lines: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
        for row in rows {
            lines.entry(row.recipe_id).or_default().push(RecipeIngredient {
                ingredient_id: row.ingredient_id,
                quantity: row.quantity,
                unit: row.unit,
                notes: row.notes,
            });
        }
        Ok(lines)
    }

    fn hydrate_recipes(&mut self, rows: Vec<RecipeRow>) -> AppResult<Vec<Recipe>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.load_lines(&ids)?;
        rows.into_iter()
            .map(|row| {
                let own = lines.remove(&row.id).unwrap_or_default();
                row.into_domain(own)
            })
            .collect()
    }

    fn write_lines(&mut self, recipe: &Recipe) -> AppResult<()> {
        diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe.id)))
            .execute(self.conn)?;
        let rows: Vec<RecipeLineRow> = recipe
            .ingredients
            .iter()
            .enumerate()
            .map(|(position, line)| RecipeLineRow {
                id: Uuid::new_v4(),
                recipe_id: recipe.id,
                ingredient_id: line.ingredient_id,
                position: position as i32,
                quantity: line.quantity,
                unit: line.unit.clone(),
                notes: line.notes.clone(),
            })
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(recipe_ingredients::table)
                .values(&rows)
                .execute(self.conn)?;
        }
        Ok(())
    }

    fn hydrate_ingredients(&mut self, rows: Vec<IngredientRow>) -> AppResult<Vec<Ingredient>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let links: Vec<(Uuid, Uuid)> = ingredient_substitutes::table
            .filter(
                ingredient_substitutes::ingredient_id
                    .eq_any(&ids)
                    .or(ingredient_substitutes::substitute_id.eq_any(&ids)),
            )
            .select((
                ingredient_substitutes::ingredient_id,
                ingredient_substitutes::substitute_id,
            ))
            .load(self.conn)?;

        rows.into_iter()
            .map(|row| {
                let substitutes = links
                    .iter()
                    .filter(|(from, _)| *from == row.id)
                    .map(|(_, to)| *to)
                    .collect();
                let substitute_for = links
                    .iter()
                    .filter(|(_, to)| *to == row.id)
                    .map(|(from, _)| *from)
                    .collect();
                Ok(Ingredient {
                    id: row.id,
                    category: decode("category", &row.category)?,
                    name: row.name,
                    nutritional_value: row.nutritional_value,
                    substitutes,
                    substitute_for,
                })
            })
            .collect()
    }

    fn hydrate_shopping_lists(&mut self, rows: Vec<ShoppingListRow>) -> AppResult<Vec<ShoppingList>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let items: Vec<(Uuid, Uuid)> = shopping_list_ingredients::table
            .filter(shopping_list_ingredients::shopping_list_id.eq_any(&ids))
            .select((
                shopping_list_ingredients::shopping_list_id,
                shopping_list_ingredients::ingredient_id,
            ))
            .load(self.conn)?;

        rows.into_iter()
            .map(|row| {
                Ok(ShoppingList {
                    ingredient_ids: items
                        .iter()
                        .filter(|(list, _)| *list == row.id)
                        .map(|(_, ingredient)| *ingredient)
                        .collect(),
                    id: row.id,
                    user_id: row.user_id,
                    status: decode("status", &row.status)?,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    fn write_shopping_items(&mut self, list: &ShoppingList) -> AppResult<()> {
        diesel::delete(
            shopping_list_ingredients::table
                .filter(shopping_list_ingredients::shopping_list_id.eq(list.id)),
        )
        .execute(self.conn)?;
        let rows: Vec<_> = list
            .ingredient_ids
            .iter()
            .map(|ingredient_id| {
                (
                    shopping_list_ingredients::shopping_list_id.eq(list.id),
                    shopping_list_ingredients::ingredient_id.eq(*ingredient_id),
                )
            })
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(shopping_list_ingredients::table)
                .values(&rows)
                .execute(self.conn)?;
        }
        Ok(())
    }

    fn recipe_page(
        &mut self,
        rows: Vec<(RecipeRow, i64)>,
        request: PageRequest,
        count: impl FnOnce(&mut PgConnection) -> QueryResult<i64>,
    ) -> AppResult<Page<Recipe>> {
        let total = match rows.first() {
            Some((_, total)) => *total,
            // Past the last page the window count has no row to ride on.
            None if request.page > 0 => count(self.conn)?,
            None => 0,
        };
        let recipes = self.hydrate_recipes(rows.into_iter().map(|(row, _)| row).collect())?;
        Ok(Page::new(recipes, total, request))
    }
}

impl Repo for PgRepo<'_> {
    fn find_user(&mut self, id: Uuid) -> AppResult<Option<User>> {
        Ok(users::table
            .find(id)
            .select(UserRow::as_select())
            .first(self.conn)
            .optional()?
            .map(User::from))
    }

    fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        Ok(users::table
            .filter(crate::email_equals_ignore_case!(email.to_string()))
            .select(UserRow::as_select())
            .first(self.conn)
            .optional()?
            .map(User::from))
    }

    fn find_users(&mut self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        Ok(users::table
            .filter(users::id.eq_any(ids))
            .select(UserRow::as_select())
            .load(self.conn)?
            .into_iter()
            .map(User::from)
            .collect())
    }

    fn list_users(&mut self, page: PageRequest) -> AppResult<Page<User>> {
        let rows: Vec<(UserRow, i64)> = users::table
            .order((users::email.asc(), users::id.asc()))
            .select((UserRow::as_select(), count_over()))
            .limit(page.size)
            .offset(page.offset())
            .load(self.conn)?;
        let total = match rows.first() {
            Some((_, total)) => *total,
            None => users::table.count().get_result(self.conn)?,
        };
        Ok(Page::new(
            rows.into_iter().map(|(row, _)| User::from(row)).collect(),
            total,
            page,
        ))
    }

    fn insert_user(&mut self, user: &User) -> AppResult<()> {
        diesel::insert_into(users::table)
            .values(UserRow::from(user))
            .execute(self.conn)?;
        Ok(())
    }

    fn update_user(&mut self, user: &User) -> AppResult<()> {
        diesel::update(users::table.find(user.id))
            .set(UserRow::from(user))
            .execute(self.conn)?;
        Ok(())
    }

    fn find_preferences(&mut self, user_id: Uuid) -> AppResult<Option<UserPreferences>> {
        user_preferences::table
            .find(user_id)
            .select(PreferencesRow::as_select())
            .first(self.conn)
            .optional()?
            .map(PreferencesRow::into_domain)
            .transpose()
    }

    fn save_preferences(&mut self, preferences: &UserPreferences) -> AppResult<()> {
        let row = PreferencesRow::from(preferences);
        diesel::insert_into(user_preferences::table)
            .values(&row)
            .on_conflict(user_preferences::user_id)
            .do_update()
            .set(&row)
            .execute(self.conn)?;
        Ok(())
    }

    fn find_ingredient(&mut self, id: Uuid) -> AppResult<Option<Ingredient>> {
        let row = ingredients::table
            .find(id)
            .select(IngredientRow::as_select())
            .first(self.conn)
            .optional()?;
        match row {
            Some(row) => Ok(self.hydrate_ingredients(vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn find_ingredients(&mut self, ids: &[Uuid]) -> AppResult<Vec<Ingredient>> {
        let rows = ingredients::table
            .filter(ingredients::id.eq_any(ids))
            .select(IngredientRow::as_select())
            .load(self.conn)?;
        self.hydrate_ingredients(rows)
    }

    fn find_ingredient_by_name(&mut self, name: &str) -> AppResult<Option<Ingredient>> {
        let row = ingredients::table
            .filter(crate::ingredient_name_equals_ignore_case!(name.to_string()))
            .select(IngredientRow::as_select())
            .first(self.conn)
            .optional()?;
        match row {
            Some(row) => Ok(self.hydrate_ingredients(vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn search_ingredients(
        &mut self,
        name: Option<&str>,
        category: Option<IngredientCategory>,
        page: PageRequest,
    ) -> AppResult<Page<Ingredient>> {
        let build = || {
            let mut query = ingredients::table.into_boxed::<Pg>();
            if let Some(name) = name {
                query = query.filter(ingredients::name.ilike(contains_pattern(name)));
            }
            if let Some(category) = category {
                query = query.filter(ingredients::category.eq(category.to_string()));
            }
            query
        };

        let rows: Vec<(IngredientRow, i64)> = build()
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .select((IngredientRow::as_select(), count_over()))
            .limit(page.size)
            .offset(page.offset())
            .load(self.conn)?;
        let total = match rows.first() {
            Some((_, total)) => *total,
            None if page.page > 0 => build().count().get_result(self.conn)?,
            None => 0,
        };
        let found = self.hydrate_ingredients(rows.into_iter().map(|(row, _)| row).collect())?;
        Ok(Page::new(found, total, page))
    }

    fn insert_ingredient(&mut self, ingredient: &Ingredient) -> AppResult<()> {
        diesel::insert_into(ingredients::table)
            .values(IngredientRow::from(ingredient))
            .execute(self.conn)?;
        Ok(())
    }

    fn save_ingredient(&mut self, ingredient: &Ingredient) -> AppResult<()> {
        diesel::update(ingredients::table.find(ingredient.id))
            .set(IngredientRow::from(ingredient))
            .execute(self.conn)?;
        Ok(())
    }

    // One row per link; concurrent links on the same ingredient never touch
    // each other's rows.
    fn link_substitute(&mut self, ingredient_id: Uuid, substitute_id: Uuid) -> AppResult<()> {
        diesel::insert_into(ingredient_substitutes::table)
            .values((
                ingredient_substitutes::ingredient_id.eq(ingredient_id),
                ingredient_substitutes::substitute_id.eq(substitute_id),
            ))
            .on_conflict_do_nothing()
            .execute(self.conn)?;
        Ok(())
    }

    fn unlink_substitute(&mut self, ingredient_id: Uuid, substitute_id: Uuid) -> AppResult<bool> {
        let removed = diesel::delete(
            ingredient_substitutes::table
                .filter(ingredient_substitutes::ingredient_id.eq(ingredient_id))
                .filter(ingredient_substitutes::substitute_id.eq(substitute_id)),
        )
        .execute(self.conn)?;
        Ok(removed > 0)
    }

    fn delete_ingredient(&mut self, id: Uuid) -> AppResult<()> {
        diesel::delete(
            ingredient_substitutes::table.filter(
                ingredient_substitutes::ingredient_id
                    .eq(id)
                    .or(ingredient_substitutes::substitute_id.eq(id)),
            ),
        )
        .execute(self.conn)?;
        diesel::delete(
            shopping_list_ingredients::table
                .filter(shopping_list_ingredients::ingredient_id.eq(id)),
        )
        .execute(self.conn)?;
        diesel::delete(ingredients::table.find(id)).execute(self.conn)?;
        Ok(())
    }

    fn ingredient_in_use(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(diesel::select(diesel::dsl::exists(
            recipe_ingredients::table.filter(recipe_ingredients::ingredient_id.eq(id)),
        ))
        .get_result(self.conn)?)
    }

    fn find_recipe(&mut self, id: Uuid) -> AppResult<Option<Recipe>> {
        let row = recipes::table
            .find(id)
            .select(RecipeRow::as_select())
            .first(self.conn)
            .optional()?;
        match row {
            Some(row) => Ok(self.hydrate_recipes(vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn lock_recipe(&mut self, id: Uuid) -> AppResult<Option<Recipe>> {
        let row = recipes::table
            .find(id)
            .select(RecipeRow::as_select())
            .for_update()
            .first(self.conn)
            .optional()?;
        match row {
            Some(row) => Ok(self.hydrate_recipes(vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn find_recipes(&mut self, ids: &[Uuid]) -> AppResult<Vec<Recipe>> {
        let rows = recipes::table
            .filter(recipes::id.eq_any(ids))
            .select(RecipeRow::as_select())
            .load(self.conn)?;
        self.hydrate_recipes(rows)
    }

    fn insert_recipe(&mut self, recipe: &Recipe) -> AppResult<()> {
        diesel::insert_into(recipes::table)
            .values(RecipeRow::from(recipe))
            .execute(self.conn)?;
        self.write_lines(recipe)
    }

    fn save_recipe(&mut self, recipe: &Recipe) -> AppResult<()> {
        diesel::update(recipes::table.find(recipe.id))
            .set(RecipeRow::from(recipe))
            .execute(self.conn)?;
        self.write_lines(recipe)
    }

    fn save_recipe_stats(&mut self, recipe: &Recipe) -> AppResult<()> {
        diesel::update(recipes::table.find(recipe.id))
            .set((
                recipes::rating_tenths.eq(rating_to_tenths(recipe.rating)),
                recipes::popularity.eq(recipe.popularity),
            ))
            .execute(self.conn)?;
        Ok(())
    }

    fn delete_recipe(&mut self, id: Uuid) -> AppResult<()> {
        // Lines, reviews and favorites go with it through ON DELETE CASCADE.
        diesel::delete(recipes::table.find(id)).execute(self.conn)?;
        Ok(())
    }

    fn query_recipes(&mut self, query: &RecipeQuery) -> AppResult<Page<Recipe>> {
        let rows: Vec<(RecipeRow, i64)> = ordered(filtered(&query.filter), query.sort)
            .select((RecipeRow::as_select(), count_over()))
            .limit(query.page.size)
            .offset(query.page.offset())
            .load(self.conn)?;
        let filter = &query.filter;
        self.recipe_page(rows, query.page, |conn| {
            filtered(filter).count().get_result(conn)
        })
    }

    fn is_favorite(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        Ok(diesel::select(diesel::dsl::exists(
            favorite_recipes::table.find((user_id, recipe_id)),
        ))
        .get_result(self.conn)?)
    }

    fn insert_favorite(
        &mut self,
        user_id: Uuid,
        recipe_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        diesel::insert_into(favorite_recipes::table)
            .values((
                favorite_recipes::user_id.eq(user_id),
                favorite_recipes::recipe_id.eq(recipe_id),
                favorite_recipes::created_at.eq(at),
            ))
            .execute(self.conn)?;
        Ok(())
    }

    fn delete_favorite(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let deleted = diesel::delete(favorite_recipes::table.find((user_id, recipe_id)))
            .execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn favorite_recipes(&mut self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Recipe>> {
        let rows: Vec<(RecipeRow, i64)> = favorite_recipes::table
            .inner_join(recipes::table)
            .filter(favorite_recipes::user_id.eq(user_id))
            .order((favorite_recipes::created_at.desc(), recipes::id.desc()))
            .select((RecipeRow::as_select(), count_over()))
            .limit(page.size)
            .offset(page.offset())
            .load(self.conn)?;
        self.recipe_page(rows, page, |conn| {
            favorite_recipes::table
                .filter(favorite_recipes::user_id.eq(user_id))
                .count()
                .get_result(conn)
        })
    }

    fn find_review(&mut self, id: Uuid) -> AppResult<Option<Review>> {
        Ok(reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(self.conn)
            .optional()?
            .map(Review::from))
    }

    fn review_exists(&mut self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        Ok(diesel::select(diesel::dsl::exists(
            reviews::table
                .filter(reviews::user_id.eq(user_id))
                .filter(reviews::recipe_id.eq(recipe_id)),
        ))
        .get_result(self.conn)?)
    }

    fn insert_review(&mut self, review: &Review) -> AppResult<()> {
        diesel::insert_into(reviews::table)
            .values(ReviewRow::from(review))
            .execute(self.conn)?;
        Ok(())
    }

    fn save_review(&mut self, review: &Review) -> AppResult<bool> {
        let updated = diesel::update(reviews::table.find(review.id))
            .set(ReviewRow::from(review))
            .execute(self.conn)?;
        Ok(updated > 0)
    }

    fn delete_review(&mut self, id: Uuid) -> AppResult<bool> {
        let deleted = diesel::delete(reviews::table.find(id)).execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn reviews_for_recipe(
        &mut self,
        recipe_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<Review>> {
        let rows: Vec<(ReviewRow, i64)> = reviews::table
            .filter(reviews::recipe_id.eq(recipe_id))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .select((ReviewRow::as_select(), count_over()))
            .limit(page.size)
            .offset(page.offset())
            .load(self.conn)?;
        let total = match rows.first() {
            Some((_, total)) => *total,
            None => reviews::table
                .filter(reviews::recipe_id.eq(recipe_id))
                .count()
                .get_result(self.conn)?,
        };
        Ok(Page::new(
            rows.into_iter().map(|(row, _)| Review::from(row)).collect(),
            total,
            page,
        ))
    }

    fn reviews_by_user(&mut self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Review>> {
        let rows: Vec<(ReviewRow, i64)> = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .select((ReviewRow::as_select(), count_over()))
            .limit(page.size)
            .offset(page.offset())
            .load(self.conn)?;
        let total = match rows.first() {
            Some((_, total)) => *total,
            None => reviews::table
                .filter(reviews::user_id.eq(user_id))
                .count()
                .get_result(self.conn)?,
        };
        Ok(Page::new(
            rows.into_iter().map(|(row, _)| Review::from(row)).collect(),
            total,
            page,
        ))
    }

    fn rating_summary(&mut self, recipe_id: Uuid) -> AppResult<RatingSummary> {
        let (count, total): (i64, Option<i64>) = reviews::table
            .filter(reviews::recipe_id.eq(recipe_id))
            .select((count_star(), sum(reviews::rating)))
            .first(self.conn)?;
        Ok(RatingSummary {
            count,
            total: total.unwrap_or(0),
        })
    }

    fn find_shopping_list(&mut self, id: Uuid, user_id: Uuid) -> AppResult<Option<ShoppingList>> {
        let row = shopping_lists::table
            .find(id)
            .filter(shopping_lists::user_id.eq(user_id))
            .select(ShoppingListRow::as_select())
            .first(self.conn)
            .optional()?;
        match row {
            Some(row) => Ok(self.hydrate_shopping_lists(vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn shopping_lists_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<ShoppingList>> {
        let rows = shopping_lists::table
            .filter(shopping_lists::user_id.eq(user_id))
            .order((shopping_lists::created_at.desc(), shopping_lists::id.desc()))
            .select(ShoppingListRow::as_select())
            .load(self.conn)?;
        self.hydrate_shopping_lists(rows)
    }

    fn insert_shopping_list(&mut self, list: &ShoppingList) -> AppResult<()> {
        diesel::insert_into(shopping_lists::table)
            .values(ShoppingListRow::from(list))
            .execute(self.conn)?;
        self.write_shopping_items(list)
    }

    fn save_shopping_list(&mut self, list: &ShoppingList) -> AppResult<()> {
        diesel::update(shopping_lists::table.find(list.id))
            .set(ShoppingListRow::from(list))
            .execute(self.conn)?;
        self.write_shopping_items(list)
    }

    fn delete_shopping_list(&mut self, id: Uuid) -> AppResult<()> {
        diesel::delete(shopping_lists::table.find(id)).execute(self.conn)?;
        Ok(())
    }
}
