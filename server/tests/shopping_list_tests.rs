//! Shopping lists and the per-user account surface.

mod common;

use kooking_server::error::AppError;
use kooking_server::models::{CuisineType, DifficultyLevel, ShoppingStatus};
use kooking_server::store::PageRequest;
use kooking_server::types::{
    PreferencesBody, ProfileUpdateRequest, ShoppingListRequest, ShoppingListUpdateRequest,
};
use std::collections::BTreeSet;
use uuid::Uuid;

fn ids(items: &[Uuid]) -> BTreeSet<Uuid> {
    items.iter().copied().collect()
}

#[test]
fn test_list_lifecycle() {
    let state = common::app();
    let owner = common::user(&state, "owner@example.com");
    let milk = common::ingredient(&state, "Milk");
    let eggs = common::ingredient(&state, "Eggs");
    let bread = common::ingredient(&state, "Bread");

    let list = state
        .shopping_lists()
        .create(&owner, ShoppingListRequest { ingredient_ids: ids(&[milk]) })
        .unwrap();
    assert_eq!(list.status, ShoppingStatus::Active);
    assert_eq!(list.user.id, owner.id);

    let list = state
        .shopping_lists()
        .add_ingredients(&owner, list.id, &ids(&[eggs, bread, milk]))
        .unwrap();
    let names: Vec<_> = list.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Bread", "Eggs", "Milk"]);

    let list = state
        .shopping_lists()
        .remove_ingredient(&owner, list.id, bread)
        .unwrap();
    assert_eq!(list.ingredients.len(), 2);

    let list = state
        .shopping_lists()
        .update_status(&owner, list.id, ShoppingStatus::Completed)
        .unwrap();
    assert_eq!(list.status, ShoppingStatus::Completed);
    assert_eq!(list.ingredients.len(), 2);

    let list = state
        .shopping_lists()
        .update(
            &owner,
            list.id,
            ShoppingListUpdateRequest {
                ingredient_ids: Some(ids(&[bread])),
                status: None,
            },
        )
        .unwrap();
    assert_eq!(list.status, ShoppingStatus::Completed);
    assert_eq!(list.ingredients.len(), 1);

    state.shopping_lists().delete(&owner, list.id).unwrap();
    assert!(state.shopping_lists().for_user(&owner).unwrap().is_empty());
}

#[test]
fn test_other_users_lists_are_invisible() {
    let state = common::app();
    let owner = common::user(&state, "owner@example.com");
    let snoop = common::user(&state, "snoop@example.com");
    let list = state
        .shopping_lists()
        .create(&owner, ShoppingListRequest::default())
        .unwrap();

    assert!(matches!(
        state.shopping_lists().get(&snoop, list.id).unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        state.shopping_lists().delete(&snoop, list.id).unwrap_err(),
        AppError::NotFound(_)
    ));
    assert_eq!(state.shopping_lists().for_user(&owner).unwrap().len(), 1);
    assert!(state.shopping_lists().for_user(&snoop).unwrap().is_empty());
}

#[test]
fn test_unknown_ingredients_are_rejected() {
    let state = common::app();
    let owner = common::user(&state, "owner@example.com");
    let milk = common::ingredient(&state, "Milk");

    let err = state
        .shopping_lists()
        .create(&owner, ShoppingListRequest { ingredient_ids: ids(&[milk, Uuid::new_v4()]) })
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(state.shopping_lists().for_user(&owner).unwrap().is_empty());

    let list = state
        .shopping_lists()
        .create(&owner, ShoppingListRequest { ingredient_ids: ids(&[milk]) })
        .unwrap();
    let err = state
        .shopping_lists()
        .remove_ingredient(&owner, list.id, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = state
        .shopping_lists()
        .add_ingredients(&owner, list.id, &BTreeSet::new())
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn test_profile_update_keeps_email() {
    let state = common::app();
    let user = common::user(&state, "cook@example.com");

    let profile = state
        .users()
        .update_profile(
            &user,
            ProfileUpdateRequest {
                first_name: "Julia".to_string(),
                last_name: "Child".to_string(),
            },
        )
        .unwrap();
    assert_eq!(profile.first_name, "Julia");
    assert_eq!(profile.email, "cook@example.com");
    assert_eq!(state.users().profile(&user).unwrap(), profile);

    let err = state
        .users()
        .update_profile(
            &user,
            ProfileUpdateRequest {
                first_name: "J".to_string(),
                last_name: "Child".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn test_preferences_are_replaced_wholesale() {
    let state = common::app();
    let user = common::user(&state, "cook@example.com");

    let first = PreferencesBody {
        preferred_cuisines: BTreeSet::from([CuisineType::Thai, CuisineType::Greek]),
        preferred_difficulty: Some(DifficultyLevel::Easy),
        ..Default::default()
    };
    assert_eq!(state.users().update_preferences(&user, first.clone()).unwrap(), first);
    assert_eq!(state.users().preferences(&user).unwrap(), first);

    let second = PreferencesBody {
        preferred_cuisines: BTreeSet::from([CuisineType::Korean]),
        ..Default::default()
    };
    state.users().update_preferences(&user, second.clone()).unwrap();
    assert_eq!(state.users().preferences(&user).unwrap(), second);
}

#[test]
fn test_favorite_and_own_recipe_pages() {
    let state = common::app();
    let cook = common::user(&state, "cook@example.com");
    let other = common::user(&state, "other@example.com");
    let mine = common::recipe(&state, &cook, "Mine", &[]);
    let theirs = common::recipe(&state, &other, "Theirs", &[]);
    state.recipes().favorite(&cook, theirs.id).unwrap();

    let favorites = state.users().favorite_recipes(&cook, PageRequest::first(10)).unwrap();
    assert_eq!(favorites.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![theirs.id]);

    let own = state.users().own_recipes(&cook, PageRequest::first(10)).unwrap();
    assert_eq!(own.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![mine.id]);

    let everyone = state.users().list_users(PageRequest::first(10)).unwrap();
    assert_eq!(everyone.total, 2);
}
