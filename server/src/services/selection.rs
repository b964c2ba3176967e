//! Trending, seasonal and recommended recipe picks.

use super::RecipeService;
use crate::error::AppResult;
use crate::models::{CuisineType, MealType};
use crate::query::{Clause, RecipeFilter, RecipeQuery, RecipeSort, SortField};
use crate::store::PageRequest;
use crate::types::RecipeCard;
use chrono::{Datelike, Timelike};
use uuid::Uuid;

pub const FEATURED_LIMIT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn of_month(month: u32) -> Season {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn cuisines(self) -> [CuisineType; 4] {
        use CuisineType::*;
        match self {
            Season::Winter => [Russian, German, French, British],
            Season::Spring => [Mediterranean, Japanese, Greek, Vietnamese],
            Season::Summer => [Mexican, Spanish, Thai, Italian],
            Season::Fall => [Indian, Moroccan, Turkish, American],
        }
    }
}

pub fn meal_type_at(hour: u32) -> MealType {
    match hour {
        5..=10 => MealType::Breakfast,
        11..=14 => MealType::Lunch,
        15..=17 => MealType::Snack,
        _ => MealType::Dinner,
    }
}

impl RecipeService<'_> {
    pub fn trending(&self) -> AppResult<Vec<RecipeCard>> {
        self.top(RecipeFilter::all(), RecipeSort::desc(SortField::Popularity), FEATURED_LIMIT)
    }

    pub fn seasonal(&self) -> AppResult<Vec<RecipeCard>> {
        let season = Season::of_month(self.clock.local_now().month());
        let filter = RecipeFilter::all().and(Clause::CuisineIn(season.cuisines().to_vec()));
        self.top(filter, RecipeSort::desc(SortField::Popularity), FEATURED_LIMIT)
    }

    /// Best-rated recipes for the current meal, topped up with the most
    /// popular of the rest when there are fewer than the limit.
    pub fn recommended(&self) -> AppResult<Vec<RecipeCard>> {
        let meal = meal_type_at(self.clock.local_now().hour());

        self.store.transaction(|repo| {
            let first = repo.query_recipes(&RecipeQuery::new(
                RecipeFilter::all().and(Clause::MealTypeIn(vec![meal])),
                RecipeSort::desc(SortField::Rating),
                PageRequest::first(FEATURED_LIMIT),
            ))?;
            let mut picked = first.items;

            let remaining = FEATURED_LIMIT - picked.len() as i64;
            if remaining > 0 {
                let taken: Vec<Uuid> = picked.iter().map(|r| r.id).collect();
                let rest = if taken.is_empty() {
                    RecipeFilter::all()
                } else {
                    RecipeFilter::all().and(Clause::IdNotIn(taken))
                };
                let backfill = repo.query_recipes(&RecipeQuery::new(
                    rest,
                    RecipeSort::desc(SortField::Popularity),
                    PageRequest::first(remaining),
                ))?;
                picked.extend(backfill.items);
            }

            tracing::debug!(meal_type = %meal, count = picked.len(), "recommended recipes");
            Ok(picked.iter().map(RecipeCard::from).collect())
        })
    }

    fn top(&self, filter: RecipeFilter, sort: RecipeSort, limit: i64) -> AppResult<Vec<RecipeCard>> {
        let query = RecipeQuery::new(filter, sort, PageRequest::first(limit));
        let found = self.store.transaction(|repo| repo.query_recipes(&query))?;
        Ok(found.items.iter().map(RecipeCard::from).collect())
    }
}
