//! Handler tests for the Users domain
//!
//! Drive the router with `oneshot` against the in-memory repository and check
//! status codes, response bodies and error bodies.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ErrorResponse;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> Router {
    let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
    let service = UserService::new(InMemoryUserRepository::new()).with_hasher(hasher);
    handlers::router(service)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn signup(data: &TestDataBuilder, label: &str) -> Value {
    json!({
        "username": data.username(label),
        "email": data.email(label),
        "password": data.password(),
    })
}

async fn create(app: &Router, body: Value) -> UserResponse {
    let response = app.clone().oneshot(json_request("POST", "/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_user_returns_201() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_create_201");

    let response = app
        .oneshot(json_request("POST", "/", signup(&data, "alice")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["username"], data.username("alice"));
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_superuser"], false);
    assert_eq!(body["created_at"], body["updated_at"]);
    assert!(body.get("hashed_password").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_create_user_validates_input() {
    let app = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({"username": "", "email": "not-an-email", "password": "short"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "VALIDATION_ERROR");
    let details = error.details.unwrap();
    assert!(details.get("username").is_some());
    assert!(details.get("email").is_some());
    assert!(details.get("password").is_some());
}

#[tokio::test]
async fn test_create_user_missing_field_is_invalid_json() {
    let app = app();

    let response = app
        .oneshot(json_request("POST", "/", json!({"username": "bob"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "INVALID_JSON");
}

#[tokio::test]
async fn test_duplicate_email_returns_400() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_duplicate_email");
    create(&app, signup(&data, "alice")).await;

    let mut again = signup(&data, "other");
    again["email"] = json!(data.email("alice"));

    let response = app.oneshot(json_request("POST", "/", again)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "DUPLICATE_EMAIL");
    assert_eq!(error.message, "Email already registered");
}

#[tokio::test]
async fn test_duplicate_username_returns_400() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_duplicate_username");
    create(&app, signup(&data, "alice")).await;

    let mut again = signup(&data, "other");
    again["username"] = json!(data.username("alice"));

    let response = app.oneshot(json_request("POST", "/", again)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "DUPLICATE_USERNAME");
    assert_eq!(error.message, "Username already taken");
}

#[tokio::test]
async fn test_duplicate_email_and_username_reports_email() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_duplicate_both");
    create(&app, signup(&data, "alice")).await;

    let response = app
        .oneshot(json_request("POST", "/", signup(&data, "alice")))
        .await
        .unwrap();

    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn test_get_user() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_get");
    let created = create(&app, signup(&data, "alice")).await;

    let response = app
        .oneshot(empty_request("GET", &format!("/{}", created.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched: UserResponse = json_body(response.into_body()).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_unknown_user_returns_404() {
    let response = app().oneshot(empty_request("GET", "/999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "NOT_FOUND");
    assert_eq!(error.message, "User not found");
}

#[tokio::test]
async fn test_non_integer_id_returns_422() {
    let response = app().oneshot(empty_request("GET", "/abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "INVALID_PATH_PARAM");
}

#[tokio::test]
async fn test_list_users_paginates() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_list");
    for label in ["a", "b", "c", "d", "e"] {
        create(&app, signup(&data, label)).await;
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?skip=0&limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Vec<UserResponse> = json_body(response.into_body()).await;
    assert_eq!(page.len(), 2);
    assert!(page[0].id < page[1].id);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?skip=4&limit=2"))
        .await
        .unwrap();
    let page: Vec<UserResponse> = json_body(response.into_body()).await;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].username, data.username("e"));

    let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
    let all: Vec<UserResponse> = json_body(response.into_body()).await;
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn test_list_users_rejects_bad_query() {
    for uri in ["/?limit=0", "/?limit=501", "/?skip=-1", "/?limit=many"] {
        let response = app().oneshot(empty_request("GET", uri)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "expected 422 for {uri}"
        );
    }
}

#[tokio::test]
async fn test_partial_update_changes_only_given_field() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_partial_update");
    let created = create(&app, signup(&data, "alice")).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/{}", created.id),
            json!({"full_name": "Alice Liddell", "email": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated: UserResponse = json_body(response.into_body()).await;
    assert_eq!(updated.full_name.as_deref(), Some("Alice Liddell"));
    assert_eq!(updated.email, created.email);
    assert_eq!(updated.username, created.username);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let response = app
        .oneshot(empty_request("GET", &format!("/{}", created.id)))
        .await
        .unwrap();
    let fetched: UserResponse = json_body(response.into_body()).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_to_taken_email_leaves_user_unchanged() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_update_conflict");
    let alice = create(&app, signup(&data, "alice")).await;
    let bob = create(&app, signup(&data, "bob")).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/{}", alice.id),
            json!({"email": bob.email, "full_name": "Mallory"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "DUPLICATE_EMAIL");

    let response = app
        .oneshot(empty_request("GET", &format!("/{}", alice.id)))
        .await
        .unwrap();
    let fetched: UserResponse = json_body(response.into_body()).await;
    assert_eq!(fetched, alice);
}

#[tokio::test]
async fn test_update_unknown_user_returns_404() {
    let response = app()
        .oneshot(json_request("PUT", "/999", json!({"full_name": "Nobody"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_validates_input() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_update_validation");
    let created = create(&app, signup(&data, "alice")).await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", created.id),
            json!({"password": "short"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_user_returns_204_then_404() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_delete");
    let created = create(&app, signup(&data, "alice")).await;
    let uri = format!("/{}", created.id);

    let response = app.clone().oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());

    let response = app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_creates_same_email_one_wins() {
    let app = app();
    let data = TestDataBuilder::from_test_name("handler_concurrent");

    let requests = (0..10).map(|i| {
        let app = app.clone();
        let body = json!({
            "username": data.username(&format!("racer{i}")),
            "email": data.email("racer"),
            "password": data.password(),
        });
        async move { app.oneshot(json_request("POST", "/", body)).await.unwrap().status() }
    });

    let statuses = futures::future::join_all(requests).await;

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let rejected = statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count();
    assert_eq!(created, 1);
    assert_eq!(rejected, 9);
}
