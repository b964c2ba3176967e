//! Shared fixtures: an in-memory app pinned to a fixed instant, plus helpers
//! that seed users, ingredients and recipes without going through HTTP.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use kooking_server::clock::{Clock, FixedClock};
use base64::Engine;
use kooking_server::config::{AppConfig, AuthConfig};
use kooking_server::models::{
    CuisineType, IngredientCategory, MealType, User, UserPreferences, ROLE_ADMIN, ROLE_USER,
};
use kooking_server::error::AppResult;
use kooking_server::store::{MemoryStore, Repo, Store};
use kooking_server::types::{IngredientRequest, RecipeDetail, RecipeLineRequest, RecipeRequest};
use kooking_server::{AppContext, AppState};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Saturday 2024-06-15, 12:30: summer, lunch time.
pub fn summer_noon() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .unwrap()
        .and_utc()
}

/// The embedded auth defaults plus a signing key that only tests know.
pub fn auth_config() -> AuthConfig {
    let mut auth = AppConfig::defaults().unwrap().auth;
    auth.jwt_secret =
        base64::engine::general_purpose::STANDARD.encode(b"kooking-integration-test-signing-key");
    auth
}

pub fn app_at(at: DateTime<Utc>) -> AppState {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(at));
    AppContext::build(&auth_config(), store, clock).unwrap()
}

pub fn app() -> AppState {
    app_at(summer_noon())
}

/// Inserts a user directly. The password hash is not a real hash, so this
/// user cannot log in; use the auth service for that.
pub fn user(state: &AppState, email: &str) -> User {
    insert_user(state, email, &[ROLE_USER])
}

pub fn admin(state: &AppState, email: &str) -> User {
    insert_user(state, email, &[ROLE_USER, ROLE_ADMIN])
}

fn insert_user(state: &AppState, email: &str, roles: &[&str]) -> User {
    let now = state.clock.now();
    let user = User {
        id: Uuid::new_v4(),
        first_name: "Test".to_string(),
        last_name: "Cook".to_string(),
        email: email.to_string(),
        password_hash: "unusable".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .transaction(|repo| {
            repo.insert_user(&user)?;
            repo.save_preferences(&UserPreferences::empty(user.id))
        })
        .unwrap();
    user
}

pub fn ingredient(state: &AppState, name: &str) -> Uuid {
    state
        .ingredients()
        .create(IngredientRequest {
            name: name.to_string(),
            category: IngredientCategory::Other,
            nutritional_value: None,
        })
        .unwrap()
        .id
}

pub fn recipe_request(name: &str, ingredients: &[Uuid]) -> RecipeRequest {
    RecipeRequest {
        name: name.to_string(),
        description: None,
        cuisine: CuisineType::Italian,
        meal_type: MealType::Dinner,
        cooking_time: 30,
        diet_type: None,
        cooking_method: None,
        difficulty: None,
        ingredients: ingredients
            .iter()
            .map(|id| RecipeLineRequest {
                ingredient_id: *id,
                quantity: 1.0,
                unit: Some("pinch".to_string()),
                notes: None,
            })
            .collect(),
        instructions: "Mix and cook.".to_string(),
        image_url: None,
    }
}

pub fn recipe(state: &AppState, author: &User, name: &str, ingredients: &[Uuid]) -> RecipeDetail {
    state
        .recipes()
        .create(author, recipe_request(name, ingredients))
        .unwrap()
}

pub fn recipe_with(
    state: &AppState,
    author: &User,
    name: &str,
    edit: impl FnOnce(&mut RecipeRequest),
) -> RecipeDetail {
    let mut request = recipe_request(name, &[]);
    edit(&mut request);
    state.recipes().create(author, request).unwrap()
}

/// Counts transactions so a test can prove an operation never reached storage.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub transactions: AtomicUsize,
}

impl CountingStore {
    pub fn count(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }
}

impl Store for CountingStore {
    fn run(&self, work: &mut dyn FnMut(&mut dyn Repo) -> AppResult<()>) -> AppResult<()> {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        self.inner.run(work)
    }
}

/// An app over a `CountingStore`, returned alongside the store for inspection.
pub fn counted_app() -> (AppState, Arc<CountingStore>) {
    let counting = Arc::new(CountingStore::default());
    let store: Arc<dyn Store> = counting.clone();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(summer_noon()));
    (AppContext::build(&auth_config(), store, clock).unwrap(), counting)
}
