//! End-to-end tests for the HTTP API.
//!
//! Requests are driven through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`, against the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use todo_core::TodoRepository;
use todo_testing::{FailingTodoRepository, InMemoryTodoRepository, stepping_clock};
use todo_web::{AppState, CORRELATION_ID_HEADER, build_router};
use tower::ServiceExt;

// ============================================================================
// Helpers
// ============================================================================

struct TestApp {
    router: Router,
    repository: InMemoryTodoRepository,
}

impl TestApp {
    fn new() -> Self {
        let repository = InMemoryTodoRepository::new(Arc::new(stepping_clock()));
        let router = build_router(AppState::new(Arc::new(repository.clone())));
        Self { router, repository }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        send(&self.router, request).await
    }

    async fn create(&self, text: &str) -> Value {
        let (status, body) = self
            .request(Method::POST, "/api/todos", Some(json!({ "text": text })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn list(&self) -> Vec<Value> {
        let (status, body) = self.request(Method::GET, "/api/todos", None).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().expect("list body is an array").clone()
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn todo_uri(id: &Value) -> String {
    format!("/api/todos/{}", id.as_str().expect("id is a string"))
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_then_list_contains_exactly_one_entry() {
    let app = TestApp::new();

    let created = app.create("buy milk").await;

    assert_eq!(created["text"], "buy milk");
    assert_eq!(created["completed"], false);
    assert!(created["id"].is_string());
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let todos = app.list().await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0], created);
}

#[tokio::test]
async fn create_trims_text_and_honours_completed() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(json!({ "text": "  walk dog  ", "completed": true })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["text"], "walk dog");
    assert_eq!(body["completed"], true);
}

#[tokio::test]
async fn create_without_text_is_rejected_and_persists_nothing() {
    let app = TestApp::new();

    for body in [json!({}), json!({ "text": "" }), json!({ "text": "   " })] {
        let (status, response) = app.request(Method::POST, "/api/todos", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], "Text is required");
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }

    assert!(app.repository.is_empty());
}

#[tokio::test]
async fn create_with_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\":"))
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(app.repository.is_empty());
}

#[tokio::test]
async fn create_with_non_string_text_is_bad_request() {
    let app = TestApp::new();

    let (status, _) = app
        .request(Method::POST, "/api/todos", Some(json!({ "text": 42 })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.repository.is_empty());
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn list_is_newest_first() {
    let app = TestApp::new();
    let t1 = app.create("one").await;
    let t2 = app.create("two").await;
    let t3 = app.create("three").await;

    let ids: Vec<Value> = app.list().await.into_iter().map(|t| t["id"].clone()).collect();

    assert_eq!(ids, vec![t3["id"].clone(), t2["id"].clone(), t1["id"].clone()]);
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let app = TestApp::new();

    assert!(app.list().await.is_empty());
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn update_completed_changes_only_completed_and_updated_at() {
    let app = TestApp::new();
    let created = app.create("buy milk").await;

    let (status, updated) = app
        .request(
            Method::PATCH,
            &todo_uri(&created["id"]),
            Some(json!({ "completed": true })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["text"], created["text"]);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

#[tokio::test]
async fn update_text_is_trimmed() {
    let app = TestApp::new();
    let created = app.create("buy milk").await;

    let (status, updated) = app
        .request(
            Method::PATCH,
            &todo_uri(&created["id"]),
            Some(json!({ "text": "  buy oat milk " })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["text"], "buy oat milk");
    assert_eq!(updated["completed"], false);
}

#[tokio::test]
async fn update_with_blank_text_is_rejected() {
    let app = TestApp::new();
    let created = app.create("buy milk").await;

    let (status, body) = app
        .request(
            Method::PATCH,
            &todo_uri(&created["id"]),
            Some(json!({ "text": "  " })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Text is required");
    assert_eq!(app.list().await, vec![created]);
}

#[tokio::test]
async fn update_with_non_allow_listed_field_is_rejected_and_record_unchanged() {
    let app = TestApp::new();
    let created = app.create("buy milk").await;

    for body in [
        json!({ "createdAt": "2000-01-01T00:00:00Z" }),
        json!({ "completed": true, "id": "00000000-0000-0000-0000-000000000000" }),
        json!({ "owner": "mallory" }),
    ] {
        let (status, _) = app
            .request(Method::PATCH, &todo_uri(&created["id"]), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.list().await, vec![created]);
}

#[tokio::test]
async fn update_unknown_id_is_not_found_and_creates_nothing() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::PATCH,
            "/api/todos/6f1c1c2e-8f7a-4d5e-9a43-2b1f0c9d8e7a",
            Some(json!({ "completed": true })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo not found");
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(app.repository.is_empty());
}

#[tokio::test]
async fn malformed_id_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .request(
            Method::PATCH,
            "/api/todos/not-an-id",
            Some(json!({ "completed": true })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::DELETE, "/api/todos/not-an-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn delete_twice_succeeds_then_not_found() {
    let app = TestApp::new();
    let created = app.create("buy milk").await;
    let uri = todo_uri(&created["id"]);

    let (status, body) = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Todo deleted successfully" }));

    let (status, body) = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo not found");
}

// ============================================================================
// Scenario
// ============================================================================

#[tokio::test]
async fn full_lifecycle() {
    let app = TestApp::new();

    let created = app.create("buy milk").await;
    assert_eq!(created["completed"], false);
    let uri = todo_uri(&created["id"]);

    let (status, updated) = app
        .request(Method::PATCH, &uri, Some(json!({ "completed": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["text"], "buy milk");

    let (status, _) = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    assert!(app.list().await.iter().all(|t| t["id"] != created["id"]));
}

// ============================================================================
// Store failure
// ============================================================================

#[tokio::test]
async fn store_failure_is_server_error_on_every_endpoint() {
    let router = build_router(AppState::new(Arc::new(FailingTodoRepository::new(
        "connection refused",
    ))));
    let id = "6f1c1c2e-8f7a-4d5e-9a43-2b1f0c9d8e7a";

    let requests = [
        (Method::GET, "/api/todos".to_string(), None),
        (Method::POST, "/api/todos".to_string(), Some(json!({ "text": "x" }))),
        (
            Method::PATCH,
            format!("/api/todos/{id}"),
            Some(json!({ "completed": true })),
        ),
        (Method::DELETE, format!("/api/todos/{id}"), None),
    ];

    for (method, uri, body) in requests {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server error");
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"], "connection refused");
    }
}

// ============================================================================
// Health, correlation and CORS
// ============================================================================

#[tokio::test]
async fn health_endpoints() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));

    let (status, body) = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ready" }));

    let failing = build_router(AppState::new(Arc::new(FailingTodoRepository::new("down"))));
    let request = Request::builder().uri("/health/ready").body(Body::empty()).unwrap();
    let (status, _) = send(&failing, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn every_response_carries_a_correlation_id() {
    let app = TestApp::new();

    for uri in ["/api/todos", "/api/todos/not-an-id", "/health"] {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert!(
            response.headers().contains_key(CORRELATION_ID_HEADER),
            "missing correlation id on {uri}"
        );
    }
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/todos")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn repository_sees_what_the_api_wrote() {
    let app = TestApp::new();
    let created = app.create("buy milk").await;

    let stored = app.repository.find_all().await.unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.to_string(), created["id"].as_str().unwrap());
}
