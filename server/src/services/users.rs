use super::{require_user, validate_name};
use crate::clock::Clock;
use crate::error::AppResult;
use crate::models::{User, UserPreferences};
use crate::query::{Clause, RecipeFilter, RecipeQuery, RecipeSort, SortField};
use crate::store::{Page, PageRequest, Store};
use crate::types::{PreferencesBody, ProfileUpdateRequest, RecipeCard, UserProfile};

pub struct UserService<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    pub fn profile(&self, user: &User) -> AppResult<UserProfile> {
        let user = self.store.transaction(|repo| require_user(repo, user.id))?;
        Ok(UserProfile::from(&user))
    }

    /// Only the name fields change; email and roles stay as they are.
    pub fn update_profile(&self, user: &User, request: ProfileUpdateRequest) -> AppResult<UserProfile> {
        validate_name("First name", &request.first_name)?;
        validate_name("Last name", &request.last_name)?;
        let now = self.clock.now();

        self.store.transaction(|repo| {
            let existing = require_user(repo, user.id)?;
            let updated = User {
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                updated_at: now,
                ..existing
            };
            repo.update_user(&updated)?;
            tracing::info!(user_id = %updated.id, "profile updated");
            Ok(UserProfile::from(&updated))
        })
    }

    pub fn preferences(&self, user: &User) -> AppResult<PreferencesBody> {
        let stored = self.store.transaction(|repo| repo.find_preferences(user.id))?;
        let preferences = stored.unwrap_or_else(|| UserPreferences::empty(user.id));
        Ok(PreferencesBody::from(&preferences))
    }

    /// Every set and the difficulty are overwritten; nothing is merged.
    pub fn update_preferences(&self, user: &User, body: PreferencesBody) -> AppResult<PreferencesBody> {
        let preferences = UserPreferences {
            user_id: user.id,
            preferred_cuisines: body.preferred_cuisines,
            preferred_meal_types: body.preferred_meal_types,
            dietary_restrictions: body.dietary_restrictions,
            preferred_cooking_methods: body.preferred_cooking_methods,
            preferred_difficulty: body.preferred_difficulty,
        };
        self.store.transaction(|repo| {
            require_user(repo, user.id)?;
            repo.save_preferences(&preferences)
        })?;
        tracing::debug!(user_id = %user.id, "preferences replaced");
        Ok(PreferencesBody::from(&preferences))
    }

    pub fn favorite_recipes(&self, user: &User, page: PageRequest) -> AppResult<Page<RecipeCard>> {
        let found = self
            .store
            .transaction(|repo| repo.favorite_recipes(user.id, page))?;
        Ok(found.map(|recipe| RecipeCard::from(&recipe)))
    }

    /// Newest first.
    pub fn own_recipes(&self, user: &User, page: PageRequest) -> AppResult<Page<RecipeCard>> {
        let query = RecipeQuery::new(
            RecipeFilter::all().and(Clause::AuthoredBy(user.id)),
            RecipeSort::desc(SortField::CreatedAt),
            page,
        );
        let found = self.store.transaction(|repo| repo.query_recipes(&query))?;
        Ok(found.map(|recipe| RecipeCard::from(&recipe)))
    }

    pub fn list_users(&self, page: PageRequest) -> AppResult<Page<UserProfile>> {
        let found = self.store.transaction(|repo| repo.list_users(page))?;
        Ok(found.map(|user| UserProfile::from(&user)))
    }
}
