mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn create_then_read_returns_same_fields() {
    let app = TestApp::new();
    let res = app
        .json(Method::POST, "/api/posts", json!({"title": "Hello", "body": "World"}))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let created = res.json()["data"].clone();
    assert_eq!(created["title"], "Hello");
    assert_eq!(created["body"], "World");
    assert_eq!(created["created_at"], created["updated_at"]);

    let id = created["id"].as_i64().unwrap();
    let read = app.get(&format!("/api/posts/{}", id)).await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.json()["data"], created);
}

#[tokio::test]
async fn missing_title_is_422_with_field_details() {
    let app = TestApp::new();
    let res = app.json(Method::POST, "/api/posts", json!({"body": "World"})).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json(),
        json!({
            "error": {
                "code": "validation_error",
                "message": "validation: The title field is required.",
                "details": {
                    "title": [{"rule": "required", "message": "The title field is required."}]
                }
            }
        })
    );
}

#[tokio::test]
async fn non_string_title_fails_string_rule() {
    let app = TestApp::new();
    let res = app.json(Method::POST, "/api/posts", json!({"title": 5, "body": "b"})).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json()["error"]["details"]["title"][0]["rule"], "string");
}

#[tokio::test]
async fn non_object_body_is_bad_request() {
    let app = TestApp::new();
    let res = app.json(Method::POST, "/api/posts", json!(["title"])).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"]["code"], "bad_request");
}

#[tokio::test]
async fn list_counts_and_windows() {
    let app = TestApp::new();
    for i in 0..5 {
        app.json(Method::POST, "/api/posts", json!({"title": format!("t{i}"), "body": "b"}))
            .await;
    }
    let all = app.get("/api/posts").await.json();
    assert_eq!(all["data"].as_array().unwrap().len(), 5);
    assert_eq!(all["meta"], json!({"count": 5, "total": 5, "limit": 100, "offset": 0}));

    let window = app.get("/api/posts?limit=2&offset=1").await.json();
    let titles: Vec<_> = window["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["t3", "t2"]);
    assert_eq!(window["meta"]["total"], 5);

    let capped = app.get("/api/posts?limit=5000").await.json();
    assert_eq!(capped["meta"]["limit"], 1000);
}

#[tokio::test]
async fn put_updates_and_delete_removes() {
    let app = TestApp::new();
    let created = app
        .json(Method::POST, "/api/posts", json!({"title": "a", "body": "b"}))
        .await
        .json();
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/posts/{}", id);

    let updated = app.json(Method::PUT, &uri, json!({"title": "a2", "body": "b2"})).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["data"]["title"], "a2");
    assert_eq!(updated.json()["data"]["created_at"], created["data"]["created_at"]);

    let del = app.delete(&uri).await;
    assert_eq!(del.status, StatusCode::NO_CONTENT);

    let gone = app.get(&uri).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json()["error"]["code"], "not_found");
    assert_eq!(app.delete(&uri).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_of_missing_post_is_not_found() {
    let app = TestApp::new();
    let res = app.json(Method::PATCH, "/api/posts/7", json!({"title": "x", "body": "y"})).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_ready_version() {
    let app = TestApp::new();
    assert_eq!(app.get("/health").await.json(), json!({"status": "ok"}));
    assert_eq!(
        app.get("/ready").await.json(),
        json!({"status": "ok", "database": "ok"})
    );
    let version = app.get("/version").await.json();
    assert_eq!(version["name"], "postboard");
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let app = TestApp::new();
    let res = app.raw(Method::POST, "/api/posts", "application/json", "{not json").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let err = &res.json()["error"];
    assert_eq!(err["code"], "bad_request");
    assert!(err["message"].as_str().unwrap().starts_with("Failed to parse the request body as JSON"));
}

#[tokio::test]
async fn missing_json_content_type_is_415_envelope() {
    let app = TestApp::new();
    let created = app
        .json(Method::POST, "/api/posts", json!({"title": "t", "body": "b"}))
        .await
        .json();
    let uri = format!("/api/posts/{}", created["data"]["id"]);
    let res = app.raw(Method::PUT, &uri, "text/plain", r#"{"title":"t","body":"b"}"#).await;
    assert_eq!(res.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(res.json()["error"]["code"], "unsupported_media_type");
}

#[tokio::test]
async fn oversized_json_is_413_envelope() {
    let app = TestApp::new();
    let big = format!(r#"{{"title":"t","body":"{}"}}"#, "x".repeat(2 * 1024 * 1024));
    let res = app.raw(Method::POST, "/api/posts", "application/json", big).await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(res.json()["error"]["code"], "payload_too_large");
}

#[tokio::test]
async fn null_character_is_rejected_before_storage() {
    let app = TestApp::new();
    let res = app
        .json(Method::POST, "/api/posts", json!({"title": "t", "body": "a\u{0}b"}))
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json()["error"]["details"]["body"][0]["rule"], "string");
    assert_eq!(app.get("/api/posts").await.json()["meta"]["total"], 0);
}
