//! Drives the assembled router end to end: routing, authentication, status
//! codes and JSON bodies.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use kooking_server::api;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn recipe_body(name: &str) -> Value {
    json!({
        "name": name,
        "cuisine": "ITALIAN",
        "mealType": "DINNER",
        "cookingTime": 25,
        "ingredients": [],
        "instructions": "Boil, then drain."
    })
}

#[tokio::test]
async fn test_health() {
    let app = api::router(common::app());
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
}

#[tokio::test]
async fn test_register_login_and_use_the_token() {
    let app = api::router(common::app());

    let registration = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "a@x.com",
        "password": "pw123456",
        "confirmPassword": "pw123456"
    });
    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(registration.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@x.com");

    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(registration)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let credentials = json!({ "email": "a@x.com", "password": "pw123456" });
    let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Ada");

    let (status, body) = send(&app, Method::POST, "/api/recipes", Some(&token), Some(recipe_body("Penne"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"]["email"], "a@x.com");
    assert_eq!(body["isFavorite"], false);
    let id = body["id"].as_str().unwrap().to_string();

    let uri = format!("/api/recipes/{id}/favorite");
    let (status, body) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["popularity"], 1);

    let (status, body) = send(&app, Method::GET, &format!("/api/recipes/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFavorite"], true);

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = api::router(common::app());

    let (status, body) = send(&app, Method::GET, "/api/shopping-lists/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::POST, "/api/recipes", None, Some(recipe_body("Penne"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Public reads stay open without a header, but a bad header is still rejected
    let (status, _) = send(&app, Method::GET, "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/recipes", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sort_direction_must_be_asc_or_desc() {
    let app = api::router(common::app());

    let (status, body) = send(&app, Method::GET, "/api/recipes?sortDirection=sideways", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sideways"));

    let (status, _) = send(&app, Method::GET, "/api/recipes/advanced-search?sortDirection=up", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown sort fields fall back instead of failing
    let (status, body) = send(&app, Method::GET, "/api/recipes?sortBy=colour&sortDirection=DESC", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 0);
    assert_eq!(body["pageSize"], 10);
}

#[tokio::test]
async fn test_bad_enum_in_search_is_a_bad_request() {
    let app = api::router(common::app());
    let (status, _) = send(&app, Method::GET, "/api/recipes/advanced-search?cuisines=italian,martian", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::GET, "/api/recipes/advanced-search?cuisines=italian,french", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_route_requires_admin_role() {
    let state = common::app();
    let cook = common::user(&state, "cook@example.com");
    let boss = common::admin(&state, "boss@example.com");
    let cook_token = state.tokens.generate(&cook.email).unwrap();
    let boss_token = state.tokens.generate(&boss.email).unwrap();
    let app = api::router(state);

    let (status, _) = send(&app, Method::GET, "/api/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/admin/users", Some(&cook_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/api/admin/users", Some(&boss_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 2);
}

#[tokio::test]
async fn test_ingredient_and_review_flow() {
    let state = common::app();
    let cook = common::user(&state, "cook@example.com");
    let critic = common::user(&state, "critic@example.com");
    let cook_token = state.tokens.generate(&cook.email).unwrap();
    let critic_token = state.tokens.generate(&critic.email).unwrap();
    let app = api::router(state);

    let (status, salt) = send(
        &app,
        Method::POST,
        "/api/ingredients",
        Some(&cook_token),
        Some(json!({ "name": "Salt", "category": "SPICE" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let salt_id = salt["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, &format!("/api/ingredients/{salt_id}/substitutes/{salt_id}"), Some(&cook_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) = send(&app, Method::GET, "/api/ingredients?category=spice", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["pageSize"], 20);

    let (_, recipe) = send(&app, Method::POST, "/api/recipes", Some(&cook_token), Some(recipe_body("Fries"))).await;
    let recipe_id = recipe["id"].as_str().unwrap().to_string();
    let reviews_uri = format!("/api/reviews/recipe/{recipe_id}");

    let (status, review) = send(&app, Method::POST, &reviews_uri, Some(&critic_token), Some(json!({ "rating": 5 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, Method::POST, &reviews_uri, Some(&critic_token), Some(json!({ "rating": 4 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let review_uri = format!("/api/reviews/{}", review["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::DELETE, &review_uri, Some(&cook_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &review_uri, Some(&critic_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, listed) = send(&app, Method::GET, &reviews_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["totalElements"], 0);

    let (status, _) = send(&app, Method::PUT, &format!("/api/recipes/{recipe_id}"), Some(&critic_token), Some(recipe_body("Chips"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_google_login_redirects() {
    let app = api::router(common::app());
    let request = Request::builder()
        .uri("/api/auth/google")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/oauth2/authorization/google"
    );
}

#[tokio::test]
async fn test_unknown_recipe_is_not_found() {
    let app = api::router(common::app());
    let uri = format!("/api/recipes/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Recipe"));
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let state = common::app();
    let cook = common::user(&state, "cook@example.com");
    common::recipe(&state, &cook, "Penne", &[]);
    let app = api::router(state);

    let uri = format!("/api/recipes?page={}&size=10", i64::MAX);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], json!([]));
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["last"], true);

    let (status, body) = send(&app, Method::GET, "/api/ingredients?page=99999999999999999&size=100", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], json!([]));
}
