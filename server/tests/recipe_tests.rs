//! Recipe aggregate: ownership, favorites, search and the featured listings.

mod common;

use kooking_server::error::AppError;
use kooking_server::models::{CuisineType, DifficultyLevel, MealType};
use kooking_server::query::{AdvancedFilterCriteria, RecipeSort, SortField};
use kooking_server::services::UserRecipeFilter;
use kooking_server::store::PageRequest;
use std::collections::HashSet;
use uuid::Uuid;

fn search(
    state: &kooking_server::AppState,
    criteria: AdvancedFilterCriteria,
) -> Vec<Uuid> {
    state
        .recipes()
        .advanced_search(&criteria, RecipeSort::asc(SortField::Name), PageRequest::first(100))
        .unwrap()
        .items
        .into_iter()
        .map(|card| card.id)
        .collect()
}

#[test]
fn test_salt_and_pepper_search() {
    let state = common::app();
    let author = common::user(&state, "cook@example.com");
    let salt = common::ingredient(&state, "Salt");
    let pepper = common::ingredient(&state, "Pepper");
    let recipe = common::recipe_with(&state, &author, "Seasoned eggs", |r| {
        r.cooking_time = 20;
        r.ingredients = common::recipe_request("", &[salt, pepper]).ingredients;
    });

    let found = search(
        &state,
        AdvancedFilterCriteria {
            include_ingredients: vec![salt],
            max_cooking_time: Some(30),
            ..Default::default()
        },
    );
    assert_eq!(found, vec![recipe.id]);

    let found = search(
        &state,
        AdvancedFilterCriteria {
            exclude_ingredients: vec![salt],
            ..Default::default()
        },
    );
    assert!(found.is_empty());
}

#[test]
fn test_search_intersects_every_constraint() {
    let state = common::app();
    let author = common::user(&state, "cook@example.com");
    let x = common::ingredient(&state, "Tomato");
    let y = common::ingredient(&state, "Basil");
    let z = common::ingredient(&state, "Anchovy");

    let both = common::recipe(&state, &author, "Caprese", &[x, y]);
    // Duplicate lines must not duplicate the recipe in results
    common::recipe(&state, &author, "Double tomato", &[x, x, y]);
    common::recipe(&state, &author, "Tomato only", &[x]);
    common::recipe(&state, &author, "Puttanesca", &[x, y, z]);
    let slow = common::recipe_with(&state, &author, "Slow sauce", |r| {
        r.cooking_time = 240;
        r.ingredients = common::recipe_request("", &[x, y]).ingredients;
    });
    common::recipe_with(&state, &author, "Thai basil", |r| {
        r.cuisine = CuisineType::Thai;
        r.ingredients = common::recipe_request("", &[x, y]).ingredients;
    });

    let found = search(
        &state,
        AdvancedFilterCriteria {
            include_ingredients: vec![x, y, x],
            exclude_ingredients: vec![z],
            max_cooking_time: Some(60),
            cuisines: vec![CuisineType::Italian],
            ..Default::default()
        },
    );
    let distinct: HashSet<Uuid> = found.iter().copied().collect();
    assert_eq!(distinct.len(), found.len());
    assert_eq!(found.len(), 2);
    assert!(found.contains(&both.id));
    assert!(!found.contains(&slow.id));

    let all_with_both = search(
        &state,
        AdvancedFilterCriteria {
            include_ingredients: vec![x, y],
            ..Default::default()
        },
    );
    assert_eq!(all_with_both.len(), 5);
}

#[test]
fn test_search_with_no_criteria_returns_everything() {
    let state = common::app();
    let author = common::user(&state, "cook@example.com");
    for name in ["A", "B", "C"] {
        common::recipe(&state, &author, name, &[]);
    }
    assert_eq!(search(&state, AdvancedFilterCriteria::default()).len(), 3);
}

#[test]
fn test_listing_sorts_and_pages() {
    let state = common::app();
    let author = common::user(&state, "cook@example.com");
    common::recipe_with(&state, &author, "Bagel", |r| r.difficulty = Some(DifficultyLevel::Hard));
    common::recipe_with(&state, &author, "Apple pie", |r| r.difficulty = Some(DifficultyLevel::Easy));
    common::recipe(&state, &author, "Curry", &[]);

    let page = state
        .recipes()
        .list(None, RecipeSort::asc(SortField::Name), PageRequest::new(0, 2))
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages(), 2);
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Apple pie", "Bagel"]);

    let page = state
        .recipes()
        .list(Some("AG"), RecipeSort::desc(SortField::Name), PageRequest::first(10))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Bagel");
}

#[test]
fn test_non_author_update_is_forbidden_and_changes_nothing() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    let intruder = common::user(&state, "intruder@example.com");
    let flour = common::ingredient(&state, "Flour");
    let sugar = common::ingredient(&state, "Sugar");
    let original = common::recipe(&state, &author, "Cake", &[flour]);

    let err = state
        .recipes()
        .update(&intruder, original.id, common::recipe_request("Not cake", &[sugar]))
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let after = state.recipes().get(original.id, Some(author.id)).unwrap();
    assert_eq!(after, original);
}

#[test]
fn test_author_update_replaces_lines_and_keeps_stats() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    let fan = common::user(&state, "fan@example.com");
    let flour = common::ingredient(&state, "Flour");
    let sugar = common::ingredient(&state, "Sugar");
    let recipe = common::recipe(&state, &author, "Cake", &[flour]);
    state.recipes().favorite(&fan, recipe.id).unwrap();

    let updated = state
        .recipes()
        .update(&author, recipe.id, common::recipe_request("Sweet cake", &[sugar]))
        .unwrap();
    assert_eq!(updated.name, "Sweet cake");
    assert_eq!(updated.ingredients.len(), 1);
    assert_eq!(updated.ingredients[0].ingredient_name, "Sugar");
    assert_eq!(updated.popularity, 1);
    assert_eq!(updated.created_at, recipe.created_at);
    assert_eq!(updated.author.id, author.id);
}

#[test]
fn test_create_rejects_unknown_ingredient_and_bad_quantity() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");

    let err = state
        .recipes()
        .create(&author, common::recipe_request("Mystery", &[Uuid::new_v4()]))
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let salt = common::ingredient(&state, "Salt");
    let mut request = common::recipe_request("Salty", &[salt]);
    request.ingredients[0].quantity = 0.0;
    let err = state.recipes().create(&author, request).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn test_favorite_round_trip() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    let fan = common::user(&state, "fan@example.com");
    let recipe = common::recipe(&state, &author, "Pancakes", &[]);

    let card = state.recipes().favorite(&fan, recipe.id).unwrap();
    assert_eq!(card.popularity, 1);
    assert!(state.recipes().get(recipe.id, Some(fan.id)).unwrap().is_favorite);
    assert!(!state.recipes().get(recipe.id, None).unwrap().is_favorite);

    let err = state.recipes().favorite(&fan, recipe.id).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let card = state.recipes().unfavorite(&fan, recipe.id).unwrap();
    assert_eq!(card.popularity, 0);

    let err = state.recipes().unfavorite(&fan, recipe.id).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(state.recipes().get(recipe.id, None).unwrap().popularity, 0);
}

#[test]
fn test_delete_by_anyone_removes_everything() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    let other = common::user(&state, "other@example.com");
    let recipe = common::recipe(&state, &author, "Soup", &[]);
    state.recipes().favorite(&other, recipe.id).unwrap();

    state.recipes().delete(&other, recipe.id).unwrap();
    assert!(matches!(
        state.recipes().get(recipe.id, None).unwrap_err(),
        AppError::NotFound(_)
    ));
    assert_eq!(
        state
            .users()
            .favorite_recipes(&other, PageRequest::first(10))
            .unwrap()
            .total,
        0
    );
}

#[test]
fn test_user_recipes_ignore_unknown_filters() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    let other = common::user(&state, "other@example.com");
    common::recipe_with(&state, &author, "Tacos", |r| r.cuisine = CuisineType::Mexican);
    common::recipe_with(&state, &author, "Ramen", |r| r.cuisine = CuisineType::Japanese);
    common::recipe(&state, &other, "Lasagna", &[]);

    let filter = UserRecipeFilter {
        cuisine: Some("mexican".to_string()),
        ..Default::default()
    };
    let page = state
        .recipes()
        .user_recipes(&author, &filter, PageRequest::first(12))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Tacos");

    let filter = UserRecipeFilter {
        cuisine: Some("martian".to_string()),
        meal_type: Some("elevenses".to_string()),
        sort: Some("name_desc".to_string()),
        ..Default::default()
    };
    let page = state
        .recipes()
        .user_recipes(&author, &filter, PageRequest::first(12))
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Tacos", "Ramen"]);
}

#[test]
fn test_trending_orders_by_popularity() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    let fans: Vec<_> = (0..2)
        .map(|i| common::user(&state, &format!("fan{i}@example.com")))
        .collect();
    let quiet = common::recipe(&state, &author, "Quiet", &[]);
    let loud = common::recipe(&state, &author, "Loud", &[]);
    let middling = common::recipe(&state, &author, "Middling", &[]);
    for fan in &fans {
        state.recipes().favorite(fan, loud.id).unwrap();
    }
    state.recipes().favorite(&fans[0], middling.id).unwrap();

    let ids: Vec<_> = state
        .recipes()
        .trending()
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![loud.id, middling.id, quiet.id]);
}

#[test]
fn test_seasonal_picks_summer_cuisines_in_june() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    common::recipe_with(&state, &author, "Borscht", |r| r.cuisine = CuisineType::Russian);
    let tacos = common::recipe_with(&state, &author, "Tacos", |r| r.cuisine = CuisineType::Mexican);
    let pad_thai = common::recipe_with(&state, &author, "Pad thai", |r| r.cuisine = CuisineType::Thai);

    let ids: HashSet<Uuid> = state
        .recipes()
        .seasonal()
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, HashSet::from([tacos.id, pad_thai.id]));
}

#[test]
fn test_recommended_prefers_the_current_meal_then_backfills() {
    // 12:30 is lunch
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    let fan = common::user(&state, "fan@example.com");
    let lunch = common::recipe_with(&state, &author, "Sandwich", |r| r.meal_type = MealType::Lunch);
    let popular_dinner = common::recipe(&state, &author, "Roast", &[]);
    let dinner = common::recipe(&state, &author, "Stew", &[]);
    state.recipes().favorite(&fan, popular_dinner.id).unwrap();

    let ids: Vec<_> = state
        .recipes()
        .recommended()
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], lunch.id);
    assert_eq!(ids[1], popular_dinner.id);
    assert_eq!(ids[2], dinner.id);
}

#[test]
fn test_featured_lists_are_capped() {
    let state = common::app();
    let author = common::user(&state, "author@example.com");
    for i in 0..25 {
        common::recipe_with(&state, &author, &format!("Lunch {i}"), |r| r.meal_type = MealType::Lunch);
    }
    assert_eq!(state.recipes().trending().unwrap().len(), 20);
    assert_eq!(state.recipes().recommended().unwrap().len(), 20);
    assert_eq!(state.recipes().seasonal().unwrap().len(), 20);
}
