//! Keeps a recipe's displayed rating equal to the rounded mean of its reviews.

use crate::error::AppResult;
use crate::models::{rating_from_tenths, RatingSummary, Recipe};
use crate::store::Repo;

/// Mean rating rounded half-up to one decimal, or exactly 0.0 with no reviews.
///
/// Works in integers: `round(10 * total / count)` with halves rounded up is
/// `floor((20 * total + count) / (2 * count))` for non-negative totals.
pub fn rounded_mean(summary: RatingSummary) -> f64 {
    if summary.count == 0 {
        return 0.0;
    }
    let tenths = (20 * summary.total + summary.count) / (2 * summary.count);
    rating_from_tenths(tenths as i32)
}

/// Recomputes and persists the rating of a recipe the caller has locked in
/// the current transaction.
pub fn refresh(repo: &mut dyn Repo, recipe: &mut Recipe) -> AppResult<f64> {
    let summary = repo.rating_summary(recipe.id)?;
    recipe.rating = rounded_mean(summary);
    repo.save_recipe_stats(recipe)?;
    tracing::debug!(recipe_id = %recipe.id, reviews = summary.count, rating = recipe.rating, "rating refreshed");
    Ok(recipe.rating)
}
