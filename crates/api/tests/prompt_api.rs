//! HTTP-level integration tests for the `/prompts` resource.
//!
//! Covers the full write/read lifecycle, list filters, validation and owner
//! isolation across session and API-key access.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get, get_auth, get_with_api_key, post_json_auth, put_json_auth,
};
use serde_json::Value;
use sqlx::PgPool;

/// List prompt versions for `token` and return the `data` array.
async fn list(pool: &PgPool, token: &str, query: &str) -> Vec<Value> {
    let uri = format!("/api/v1/prompts{query}");
    let response = get_auth(common::build_test_app(pool.clone()), &uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].as_array().unwrap().clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_to_end_lifecycle(pool: PgPool) {
    let (_, token) = common::register_and_login(&pool, "a@x.com").await;

    // First write creates the prompt at version 1.
    let v1 = common::create_prompt(&pool, &token, "greeting", "hi", Some("v1")).await;
    assert_eq!(v1["version"], 1);
    assert_eq!(v1["tag"], "v1");
    assert_eq!(v1["name"], "greeting");
    assert_eq!(v1["content"], "hi");
    let v1_id = v1["id"].as_i64().unwrap();

    // Blank tag clears it.
    let uri = format!("/api/v1/prompts/{v1_id}");
    let body = serde_json::json!({ "tag": "" });
    let response = put_json_auth(common::build_test_app(pool.clone()), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["tag"].is_null());

    let listed = list(&pool, &token, "?name=greeting").await;
    assert_eq!(listed.len(), 1);
    assert!(listed[0]["tag"].is_null());

    // Second write for the same name.
    let v2 = common::create_prompt(&pool, &token, "greeting", "hello", None).await;
    assert_eq!(v2["version"], 2);
    assert_eq!(v2["prompt_id"], v1["prompt_id"]);

    // Deleting version 2 keeps the prompt.
    let uri = format!("/api/v1/prompts/{}", v2["id"]);
    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let listed = list(&pool, &token, "?name=greeting").await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["version"], 1);

    // Deleting version 1 removes the prompt entirely.
    let uri = format!("/api/v1/prompts/{v1_id}");
    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(list(&pool, &token, "").await.is_empty());

    let prompts: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM prompts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(prompts.0, 0);
}

/// An API key reads its owner's prompts and never another user's same-named prompt.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_api_key_read_is_owner_scoped(pool: PgPool) {
    let (_, alice) = common::register_and_login(&pool, "a@x.com").await;
    let (_, bob) = common::register_and_login(&pool, "b@x.com").await;
    common::create_prompt(&pool, &alice, "greeting", "alice says hi", None).await;
    common::create_prompt(&pool, &bob, "greeting", "bob says hi", None).await;
    common::create_prompt(&pool, &bob, "greeting", "bob again", None).await;

    let raw = common::create_api_key(&pool, &alice, "ci").await["api_key"]
        .as_str()
        .unwrap()
        .to_string();

    let response = get_with_api_key(
        common::build_test_app(pool),
        "/api/v1/prompts?name=greeting",
        &raw,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["content"], "alice says hi");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_requires_credentials(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/prompts").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_latest_and_limit(pool: PgPool) {
    let (_, token) = common::register_and_login(&pool, "a@x.com").await;
    common::create_prompt(&pool, &token, "greeting", "one", Some("prod")).await;
    common::create_prompt(&pool, &token, "greeting", "two", Some("dev")).await;
    common::create_prompt(&pool, &token, "greeting", "three", None).await;
    common::create_prompt(&pool, &token, "farewell", "bye", Some("prod")).await;

    let all = list(&pool, &token, "").await;
    let order: Vec<(String, i64)> = all
        .iter()
        .map(|v| {
            (
                v["name"].as_str().unwrap().to_string(),
                v["version"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        order,
        [
            ("farewell".to_string(), 1),
            ("greeting".to_string(), 3),
            ("greeting".to_string(), 2),
            ("greeting".to_string(), 1),
        ]
    );

    let latest = list(&pool, &token, "?name=greeting&latest=true").await;
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0]["version"], 3);

    let limited = list(&pool, &token, "?name=greeting&limit=2").await;
    assert_eq!(limited.len(), 2);

    let prod = list(&pool, &token, "?tag=prod").await;
    assert_eq!(prod.len(), 2);
    assert!(prod.iter().all(|v| v["tag"] == "prod"));

    let tagged = list(&pool, &token, "?name=greeting&tag=dev").await;
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0]["content"], "two");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_rejects_bad_parameters(pool: PgPool) {
    let (_, token) = common::register_and_login(&pool, "a@x.com").await;

    for query in ["?limit=0", "?limit=101", "?name=", "?tag="] {
        let uri = format!("/api/v1/prompts{query}");
        let response = get_auth(common::build_test_app(pool.clone()), &uri, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {query}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_validation(pool: PgPool) {
    let (_, token) = common::register_and_login(&pool, "a@x.com").await;

    for body in [
        serde_json::json!({ "name": "", "content": "hi" }),
        serde_json::json!({ "name": "greeting", "content": "" }),
        serde_json::json!({ "name": "n".repeat(256), "content": "hi" }),
        serde_json::json!({ "name": "greeting", "content": "hi", "tag": "t".repeat(65) }),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, "/api/v1/prompts", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_content_and_tag(pool: PgPool) {
    let (_, token) = common::register_and_login(&pool, "a@x.com").await;
    let v1 = common::create_prompt(&pool, &token, "greeting", "hi", Some("v1")).await;
    let uri = format!("/api/v1/prompts/{}", v1["id"]);

    let body = serde_json::json!({ "content": "hello", "tag": "  v2 " });
    let response = put_json_auth(common::build_test_app(pool.clone()), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["content"], "hello");
    assert_eq!(json["tag"], "v2");
    assert_eq!(json["version"], 1);
    assert_eq!(json["created_at"], v1["created_at"]);

    // Content-only update leaves the tag alone.
    let body = serde_json::json!({ "content": "hey" });
    let response = put_json_auth(common::build_test_app(pool), &uri, body, &token).await;
    assert_eq!(body_json(response).await["tag"], "v2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_requires_a_field(pool: PgPool) {
    let (_, token) = common::register_and_login(&pool, "a@x.com").await;
    let v1 = common::create_prompt(&pool, &token, "greeting", "hi", None).await;
    let uri = format!("/api/v1/prompts/{}", v1["id"]);

    for body in [
        serde_json::json!({}),
        serde_json::json!({ "content": null }),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = put_json_auth(app, &uri, body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_owner_cannot_touch_version(pool: PgPool) {
    let (_, alice) = common::register_and_login(&pool, "a@x.com").await;
    let (_, bob) = common::register_and_login(&pool, "b@x.com").await;
    let v1 = common::create_prompt(&pool, &alice, "greeting", "hi", Some("v1")).await;
    let uri = format!("/api/v1/prompts/{}", v1["id"]);

    let body = serde_json::json!({ "tag": "mine" });
    let response = put_json_auth(common::build_test_app(pool.clone()), &uri, body, &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let listed = list(&pool, &alice, "").await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["tag"], "v1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_version_is_not_found(pool: PgPool) {
    let (_, token) = common::register_and_login(&pool, "a@x.com").await;

    let body = serde_json::json!({ "content": "hi" });
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/prompts/999999",
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response =
        delete_auth(common::build_test_app(pool), "/api/v1/prompts/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
