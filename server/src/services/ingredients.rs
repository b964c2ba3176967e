use super::require_ingredient;
use crate::error::{AppError, AppResult};
use crate::models::{Ingredient, IngredientCategory};
use crate::store::{Page, PageRequest, Repo, Store};
use crate::types::{IngredientBrief, IngredientRequest, IngredientResponse};
use std::collections::BTreeSet;
use uuid::Uuid;

/// The shared ingredient catalog and its substitute relation.
///
/// The relation is read back as two adjacency sets on every ingredient, but
/// it is written one link at a time through `link_substitute` and
/// `unlink_substitute`, never by saving the sets wholesale.
pub struct IngredientService<'a> {
    store: &'a dyn Store,
}

fn validate(request: &IngredientRequest) -> AppResult<()> {
    if request.name.trim().is_empty() {
        return Err(AppError::invalid("Ingredient name cannot be empty"));
    }
    Ok(())
}

/// Rejects `name` if another ingredient already uses it, ignoring case.
fn ensure_name_free(repo: &mut dyn Repo, name: &str, except: Option<Uuid>) -> AppResult<()> {
    match repo.find_ingredient_by_name(name)? {
        Some(existing) if Some(existing.id) != except => Err(AppError::Conflict(format!(
            "Ingredient with name '{}' already exists",
            existing.name
        ))),
        _ => Ok(()),
    }
}

fn response(repo: &mut dyn Repo, ingredient: &Ingredient) -> AppResult<IngredientResponse> {
    let ids: Vec<Uuid> = ingredient.substitutes.iter().copied().collect();
    let substitutes = repo.find_ingredients(&ids)?;
    Ok(IngredientResponse::new(ingredient, &substitutes))
}

impl<'a> IngredientService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub fn list(
        &self,
        search: Option<&str>,
        category: Option<IngredientCategory>,
        page: PageRequest,
    ) -> AppResult<Page<IngredientResponse>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.store.transaction(|repo| {
            let found = repo.search_ingredients(search, category, page)?;
            found.try_map(|ingredient| response(repo, &ingredient))
        })
    }

    pub fn get(&self, id: Uuid) -> AppResult<IngredientResponse> {
        self.store.transaction(|repo| {
            let ingredient = require_ingredient(repo, id)?;
            response(repo, &ingredient)
        })
    }

    pub fn categories(&self) -> Vec<IngredientCategory> {
        IngredientCategory::ALL.to_vec()
    }

    pub fn substitutes(&self, id: Uuid) -> AppResult<Vec<IngredientBrief>> {
        self.store.transaction(|repo| {
            let ingredient = require_ingredient(repo, id)?;
            let ids: Vec<Uuid> = ingredient.substitutes.iter().copied().collect();
            let mut briefs: Vec<IngredientBrief> = repo
                .find_ingredients(&ids)?
                .iter()
                .map(IngredientBrief::from)
                .collect();
            briefs.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(briefs)
        })
    }

    pub fn create(&self, request: IngredientRequest) -> AppResult<IngredientResponse> {
        validate(&request)?;
        let name = request.name.trim().to_string();

        self.store.transaction(|repo| {
            ensure_name_free(repo, &name, None)?;
            let ingredient = Ingredient {
                id: Uuid::new_v4(),
                name: name.clone(),
                category: request.category,
                nutritional_value: request.nutritional_value.clone(),
                substitutes: BTreeSet::new(),
                substitute_for: BTreeSet::new(),
            };
            repo.insert_ingredient(&ingredient)?;
            tracing::info!(ingredient_id = %ingredient.id, name = %ingredient.name, "ingredient created");
            response(repo, &ingredient)
        })
    }

    /// Renaming to the ingredient's own name, in any casing, is allowed.
    pub fn update(&self, id: Uuid, request: IngredientRequest) -> AppResult<IngredientResponse> {
        validate(&request)?;
        let name = request.name.trim().to_string();

        self.store.transaction(|repo| {
            let existing = require_ingredient(repo, id)?;
            ensure_name_free(repo, &name, Some(id))?;
            let updated = Ingredient {
                name: name.clone(),
                category: request.category,
                nutritional_value: request.nutritional_value.clone(),
                ..existing
            };
            repo.save_ingredient(&updated)?;
            tracing::info!(ingredient_id = %id, "ingredient updated");
            response(repo, &updated)
        })
    }

    /// Unlinks the ingredient from every neighbor in both directions, then
    /// removes it. Fails with Conflict while any recipe still uses it.
    pub fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.transaction(|repo| {
            let ingredient = require_ingredient(repo, id)?;
            if repo.ingredient_in_use(id)? {
                return Err(AppError::Conflict(format!(
                    "Ingredient '{}' is used by at least one recipe",
                    ingredient.name
                )));
            }

            for substitute_id in &ingredient.substitutes {
                repo.unlink_substitute(id, *substitute_id)?;
            }
            for original_id in &ingredient.substitute_for {
                repo.unlink_substitute(*original_id, id)?;
            }
            let unlinked = ingredient.substitutes.len() + ingredient.substitute_for.len();

            repo.delete_ingredient(id)?;
            tracing::info!(ingredient_id = %id, unlinked, "ingredient deleted");
            Ok(())
        })
    }

    /// Records `substitute_id` as a substitute of `id`. Only the one link is
    /// written, so concurrent links on the same ingredient all survive.
    pub fn add_substitute(&self, id: Uuid, substitute_id: Uuid) -> AppResult<IngredientResponse> {
        if id == substitute_id {
            return Err(AppError::invalid("An ingredient cannot be a substitute for itself"));
        }

        self.store.transaction(|repo| {
            require_ingredient(repo, id)?;
            require_ingredient(repo, substitute_id)?;
            repo.link_substitute(id, substitute_id)?;
            tracing::info!(ingredient_id = %id, %substitute_id, "substitute linked");
            let ingredient = require_ingredient(repo, id)?;
            response(repo, &ingredient)
        })
    }

    pub fn remove_substitute(&self, id: Uuid, substitute_id: Uuid) -> AppResult<IngredientResponse> {
        self.store.transaction(|repo| {
            require_ingredient(repo, id)?;
            require_ingredient(repo, substitute_id)?;
            if repo.unlink_substitute(id, substitute_id)? {
                tracing::info!(ingredient_id = %id, %substitute_id, "substitute unlinked");
            }
            let ingredient = require_ingredient(repo, id)?;
            response(repo, &ingredient)
        })
    }
}
