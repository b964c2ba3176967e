use super::{require_ingredient, require_ingredients, require_user};
use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::models::{ShoppingList, ShoppingStatus, User};
use crate::store::{Repo, Store};
use crate::types::{ShoppingListRequest, ShoppingListResponse, ShoppingListUpdateRequest};
use std::collections::BTreeSet;
use uuid::Uuid;

pub struct ShoppingListService<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
}

/// Lists are only visible to their owner; anyone else gets NotFound.
fn owned_list(repo: &mut dyn Repo, owner: &User, id: Uuid) -> AppResult<ShoppingList> {
    repo.find_shopping_list(id, owner.id)?
        .ok_or_else(|| AppError::not_found("Shopping list", id))
}

fn response(repo: &mut dyn Repo, owner: &User, list: &ShoppingList) -> AppResult<ShoppingListResponse> {
    let ids: Vec<Uuid> = list.ingredient_ids.iter().copied().collect();
    let ingredients = repo.find_ingredients(&ids)?;
    Ok(ShoppingListResponse::new(list, owner, &ingredients))
}

impl<'a> ShoppingListService<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    pub fn for_user(&self, owner: &User) -> AppResult<Vec<ShoppingListResponse>> {
        self.store.transaction(|repo| {
            let lists = repo.shopping_lists_for_user(owner.id)?;
            lists.iter().map(|list| response(repo, owner, list)).collect()
        })
    }

    pub fn get(&self, owner: &User, id: Uuid) -> AppResult<ShoppingListResponse> {
        self.store.transaction(|repo| {
            let list = owned_list(repo, owner, id)?;
            response(repo, owner, &list)
        })
    }

    pub fn create(&self, owner: &User, request: ShoppingListRequest) -> AppResult<ShoppingListResponse> {
        let now = self.clock.now();
        self.store.transaction(|repo| {
            let owner = require_user(repo, owner.id)?;
            require_ingredients(repo, &request.ingredient_ids)?;
            let list = ShoppingList {
                id: Uuid::new_v4(),
                user_id: owner.id,
                ingredient_ids: request.ingredient_ids.clone(),
                status: ShoppingStatus::Active,
                created_at: now,
                updated_at: now,
            };
            repo.insert_shopping_list(&list)?;
            tracing::info!(list_id = %list.id, user_id = %owner.id, items = list.ingredient_ids.len(), "shopping list created");
            response(repo, &owner, &list)
        })
    }

    pub fn update(
        &self,
        owner: &User,
        id: Uuid,
        request: ShoppingListUpdateRequest,
    ) -> AppResult<ShoppingListResponse> {
        let now = self.clock.now();
        self.store.transaction(|repo| {
            let mut list = owned_list(repo, owner, id)?;
            if let Some(ids) = &request.ingredient_ids {
                require_ingredients(repo, ids)?;
                list.ingredient_ids = ids.clone();
            }
            if let Some(status) = request.status {
                list.status = status;
            }
            list.updated_at = now;
            repo.save_shopping_list(&list)?;
            tracing::debug!(list_id = %id, "shopping list updated");
            response(repo, owner, &list)
        })
    }

    pub fn update_status(
        &self,
        owner: &User,
        id: Uuid,
        status: ShoppingStatus,
    ) -> AppResult<ShoppingListResponse> {
        self.update(
            owner,
            id,
            ShoppingListUpdateRequest {
                ingredient_ids: None,
                status: Some(status),
            },
        )
    }

    pub fn delete(&self, owner: &User, id: Uuid) -> AppResult<()> {
        self.store.transaction(|repo| {
            owned_list(repo, owner, id)?;
            repo.delete_shopping_list(id)?;
            tracing::info!(list_id = %id, "shopping list deleted");
            Ok(())
        })
    }

    pub fn add_ingredients(
        &self,
        owner: &User,
        id: Uuid,
        ingredient_ids: &BTreeSet<Uuid>,
    ) -> AppResult<ShoppingListResponse> {
        if ingredient_ids.is_empty() {
            return Err(AppError::invalid("No ingredients given"));
        }
        let now = self.clock.now();
        self.store.transaction(|repo| {
            let mut list = owned_list(repo, owner, id)?;
            require_ingredients(repo, ingredient_ids)?;
            list.ingredient_ids.extend(ingredient_ids.iter().copied());
            list.updated_at = now;
            repo.save_shopping_list(&list)?;
            response(repo, owner, &list)
        })
    }

    pub fn remove_ingredient(
        &self,
        owner: &User,
        id: Uuid,
        ingredient_id: Uuid,
    ) -> AppResult<ShoppingListResponse> {
        let now = self.clock.now();
        self.store.transaction(|repo| {
            let mut list = owned_list(repo, owner, id)?;
            require_ingredient(repo, ingredient_id)?;
            list.ingredient_ids.remove(&ingredient_id);
            list.updated_at = now;
            repo.save_shopping_list(&list)?;
            response(repo, owner, &list)
        })
    }
}
