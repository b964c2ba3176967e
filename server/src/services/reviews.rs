use super::{lock_recipe, rating, require_recipe, users_by_id};
use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::models::{Recipe, Review, User};
use crate::store::{Page, PageRequest, Repo, Store};
use crate::types::{ReviewRequest, ReviewResponse};
use std::collections::HashMap;
use uuid::Uuid;

pub struct ReviewService<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
}

fn validate(request: &ReviewRequest) -> AppResult<()> {
    if !(1..=5).contains(&request.rating) {
        return Err(AppError::invalid("Rating must be between 1 and 5"));
    }
    Ok(())
}

fn responses(repo: &mut dyn Repo, reviews: &[Review]) -> AppResult<Vec<ReviewResponse>> {
    let recipe_ids: Vec<Uuid> = reviews.iter().map(|r| r.recipe_id).collect();
    let recipes: HashMap<Uuid, Recipe> = repo
        .find_recipes(&recipe_ids)?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();
    let users = users_by_id(
        repo,
        reviews
            .iter()
            .map(|r| r.user_id)
            .chain(recipes.values().map(|r| r.author_id)),
    )?;

    reviews
        .iter()
        .map(|review| {
            let recipe = recipes
                .get(&review.recipe_id)
                .ok_or_else(|| AppError::not_found("Recipe", review.recipe_id))?;
            let author = users
                .get(&review.user_id)
                .ok_or_else(|| AppError::not_found("User", review.user_id))?;
            let recipe_author = users
                .get(&recipe.author_id)
                .ok_or_else(|| AppError::not_found("User", recipe.author_id))?;
            Ok(ReviewResponse::new(review, author, recipe, recipe_author))
        })
        .collect()
}

fn into_page(repo: &mut dyn Repo, page: Page<Review>) -> AppResult<Page<ReviewResponse>> {
    let items = responses(repo, &page.items)?;
    Ok(Page::new(items, page.total, page.request))
}

fn single(repo: &mut dyn Repo, review: &Review) -> AppResult<ReviewResponse> {
    responses(repo, std::slice::from_ref(review))?
        .pop()
        .ok_or_else(|| AppError::not_found("Review", review.id))
}

/// Loads a review the caller is allowed to change.
fn owned_review(repo: &mut dyn Repo, caller: &User, id: Uuid) -> AppResult<Review> {
    let review = repo
        .find_review(id)?
        .ok_or_else(|| AppError::not_found("Review", id))?;
    if review.user_id != caller.id {
        return Err(AppError::Forbidden(
            "Only the author can modify this review".to_string(),
        ));
    }
    Ok(review)
}

impl<'a> ReviewService<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    pub fn for_recipe(&self, recipe_id: Uuid, page: PageRequest) -> AppResult<Page<ReviewResponse>> {
        self.store.transaction(|repo| {
            require_recipe(repo, recipe_id)?;
            let found = repo.reviews_for_recipe(recipe_id, page)?;
            into_page(repo, found)
        })
    }

    pub fn by_user(&self, user: &User, page: PageRequest) -> AppResult<Page<ReviewResponse>> {
        self.store.transaction(|repo| {
            let found = repo.reviews_by_user(user.id, page)?;
            into_page(repo, found)
        })
    }

    /// One review per user and recipe. The recipe row stays locked until the
    /// new rating is written.
    pub fn create(
        &self,
        user: &User,
        recipe_id: Uuid,
        request: ReviewRequest,
    ) -> AppResult<ReviewResponse> {
        validate(&request)?;
        let now = self.clock.now();

        self.store.transaction(|repo| {
            let mut recipe = lock_recipe(repo, recipe_id)?;
            if repo.review_exists(user.id, recipe_id)? {
                return Err(AppError::Conflict(
                    "You have already reviewed this recipe".to_string(),
                ));
            }
            let review = Review {
                id: Uuid::new_v4(),
                user_id: user.id,
                recipe_id,
                rating: request.rating,
                comment: request.comment.clone(),
                created_at: now,
                updated_at: now,
            };
            repo.insert_review(&review)?;
            rating::refresh(repo, &mut recipe)?;
            tracing::info!(review_id = %review.id, %recipe_id, rating = review.rating, "review created");
            single(repo, &review)
        })
    }

    pub fn update(&self, user: &User, id: Uuid, request: ReviewRequest) -> AppResult<ReviewResponse> {
        validate(&request)?;
        let now = self.clock.now();

        self.store.transaction(|repo| {
            let review = owned_review(repo, user, id)?;
            let mut recipe = lock_recipe(repo, review.recipe_id)?;
            let review = Review {
                rating: request.rating,
                comment: request.comment.clone(),
                updated_at: now,
                ..review
            };
            // A delete that committed while we waited on the recipe lock
            // leaves nothing to update.
            if !repo.save_review(&review)? {
                return Err(AppError::not_found("Review", id));
            }
            rating::refresh(repo, &mut recipe)?;
            tracing::info!(review_id = %id, recipe_id = %recipe.id, "review updated");
            single(repo, &review)
        })
    }

    pub fn delete(&self, user: &User, id: Uuid) -> AppResult<()> {
        self.store.transaction(|repo| {
            let review = owned_review(repo, user, id)?;
            let mut recipe = lock_recipe(repo, review.recipe_id)?;
            if !repo.delete_review(id)? {
                return Err(AppError::not_found("Review", id));
            }
            rating::refresh(repo, &mut recipe)?;
            tracing::info!(review_id = %id, recipe_id = %recipe.id, "review deleted");
            Ok(())
        })
    }
}
