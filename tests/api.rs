mod common;

use serde_json::{Value, json};

use common::test_server::TestServer;

async fn push_schema(
    client: &reqwest::Client,
    base_url: &str,
    graph: &str,
    service: &str,
    version: &str,
    type_defs: &str,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/schema/push"))
        .json(&json!({
            "graph_name": graph,
            "service_name": service,
            "type_defs": type_defs,
            "version": version,
        }))
        .send()
        .await
        .expect("push schema")
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .expect("health");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");
}

#[tokio::test]
async fn test_push_returns_stored_version() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "foo",
        "1",
        "type Query { hello: String }",
    )
    .await;
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("parse push response");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["graph_name"], json!("my_graph"));
    assert_eq!(body["data"]["service_name"], json!("foo"));
    assert_eq!(body["data"]["is_active"], json!(true));
    assert_eq!(body["data"]["schema_id"], json!(1));
    assert_eq!(body["data"]["updated_at"], Value::Null);
    assert!(!body["data"]["uid"].as_str().expect("uid").is_empty());
    assert_eq!(body["data"]["hash"].as_str().expect("hash").len(), 64);
}

#[tokio::test]
async fn test_duplicate_push_returns_existing_record() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    let type_defs = "type Query { hello: String }";

    let first: Value = push_schema(&client, &server.base_url, "my_graph", "foo", "1", type_defs)
        .await
        .json()
        .await
        .expect("parse");
    let second: Value = push_schema(&client, &server.base_url, "my_graph", "foo", "2", type_defs)
        .await
        .json()
        .await
        .expect("parse");

    assert_eq!(first["data"]["uid"], second["data"]["uid"]);
    assert_eq!(first["data"]["hash"], second["data"]["hash"]);
}

#[tokio::test]
async fn test_schema_diff_reports_added_field() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "foo",
        "1",
        "type Query { hello: String }",
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/schema/diff", server.base_url))
        .json(&json!({
            "graph_name": "my_graph",
            "service_name": "foo",
            "type_defs": "type Query { hello: String world: String }",
        }))
        .send()
        .await
        .expect("diff schema");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("parse diff response");
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": [
                {
                    "criticality": {
                        "level": "NON_BREAKING",
                    },
                    "type": "FIELD_ADDED",
                    "message": "Field 'world' was added to object type 'Query'",
                    "path": "Query.world",
                }
            ],
        })
    );
}

#[tokio::test]
async fn test_schema_diff_detects_breaking_change() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "foo",
        "1",
        "type Query { hello: String world: String }",
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/schema/diff", server.base_url))
        .json(&json!({
            "graph_name": "my_graph",
            "service_name": "foo",
            "type_defs": "type Query { hello: String }",
        }))
        .send()
        .await
        .expect("diff schema");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("parse diff response");
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": [
                {
                    "criticality": {
                        "level": "BREAKING",
                        "reason": "Removing a field is a breaking change. It is preferable to deprecate the field before removing it.",
                    },
                    "type": "FIELD_REMOVED",
                    "message": "Field 'world' was removed from object type 'Query'",
                    "path": "Query.world",
                }
            ],
        })
    );
}

#[tokio::test]
async fn test_schema_diff_missing_type_defs_is_400() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/schema/diff", server.base_url))
        .json(&json!({
            "graph_name": "my_graph",
            "service_name": "foo",
        }))
        .send()
        .await
        .expect("diff schema");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("parse error response");
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "body should have required property 'type_defs'",
        })
    );
}

#[tokio::test]
async fn test_diff_against_service_without_versions_is_404() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/schema/diff", server.base_url))
        .json(&json!({
            "graph_name": "my_graph",
            "service_name": "ghost",
            "type_defs": "type Query { hello: String }",
        }))
        .send()
        .await
        .expect("diff schema");
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.expect("parse error response");
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_latest_composes_all_active_fragments() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "accounts",
        "1",
        "type Query { me: User } type User { id: ID }",
    )
    .await;
    push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "products",
        "1",
        "type Query { products: [Product] } type Product { id: ID }",
    )
    .await;

    let resp = client
        .get(format!(
            "{}/schema/latest?graph_name=my_graph",
            server.base_url
        ))
        .send()
        .await
        .expect("get latest");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("parse latest response");
    assert_eq!(body["success"], json!(true));

    let rows = body["data"].as_array().expect("data array");
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert!(!row["version"].as_str().expect("version").is_empty());
        assert!(!row["typeDefs"].as_str().expect("typeDefs").is_empty());
        assert!(!row["serviceName"].as_str().expect("serviceName").is_empty());
        assert!(row["schemaId"].as_i64().expect("schemaId") >= 1);
    }
}

#[tokio::test]
async fn test_latest_for_unknown_graph_is_404() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/schema/latest?graph_name=ghost", server.base_url))
        .send()
        .await
        .expect("get latest");
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.expect("parse error response");
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_latest_fails_when_fragments_conflict() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "a",
        "1",
        "type Money { amount: Int }",
    )
    .await;
    push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "b",
        "1",
        "type Money { amount: Float }",
    )
    .await;

    let resp = client
        .get(format!(
            "{}/schema/latest?graph_name=my_graph",
            server.base_url
        ))
        .send()
        .await
        .expect("get latest");
    assert_eq!(resp.status(), 500);

    let body: Value = resp.json().await.expect("parse error response");
    assert_eq!(body["success"], json!(false));
    assert!(
        body["error"]
            .as_str()
            .expect("error message")
            .contains("composition")
    );
}

#[tokio::test]
async fn test_versions_lists_index_newest_first() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "foo",
        "1",
        "type Query { a: String }",
    )
    .await;
    push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "foo",
        "2",
        "type Query { a: String b: String }",
    )
    .await;

    let resp = client
        .get(format!(
            "{}/schema/versions?graph_name=my_graph",
            server.base_url
        ))
        .send()
        .await
        .expect("list versions");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("parse versions response");
    let entries = body["data"].as_array().expect("data array");
    assert_eq!(entries.len(), 2);

    let first = entries[0]["uid"].as_str().expect("uid");
    let second = entries[1]["uid"].as_str().expect("uid");
    assert!(first > second, "index must be sorted newest first");
}

#[tokio::test]
async fn test_deactivate_then_latest_is_404() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let pushed: Value = push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "foo",
        "1",
        "type Query { hello: String }",
    )
    .await
    .json()
    .await
    .expect("parse push response");
    let uid = pushed["data"]["uid"].as_str().expect("uid");

    let resp = client
        .post(format!("{}/schema/deactivate", server.base_url))
        .json(&json!({ "graph_name": "my_graph", "uid": uid }))
        .send()
        .await
        .expect("deactivate");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("parse deactivate response");
    assert_eq!(body["data"]["is_active"], json!(false));
    assert!(!body["data"]["updated_at"].is_null());

    // The service now has no active version, so composition must abort.
    let resp = client
        .get(format!(
            "{}/schema/latest?graph_name=my_graph",
            server.base_url
        ))
        .send()
        .await
        .expect("get latest");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_remove_version_shrinks_index() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let pushed: Value = push_schema(
        &client,
        &server.base_url,
        "my_graph",
        "foo",
        "1",
        "type Query { hello: String }",
    )
    .await
    .json()
    .await
    .expect("parse push response");
    let uid = pushed["data"]["uid"].as_str().expect("uid");

    let resp = client
        .delete(format!("{}/schema/my_graph/{uid}", server.base_url))
        .send()
        .await
        .expect("remove");
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!(
            "{}/schema/versions?graph_name=my_graph",
            server.base_url
        ))
        .send()
        .await
        .expect("list versions");
    let body: Value = resp.json().await.expect("parse versions response");
    assert!(body["data"].as_array().expect("data array").is_empty());

    // Removing again is a 404.
    let resp = client
        .delete(format!("{}/schema/my_graph/{uid}", server.base_url))
        .send()
        .await
        .expect("remove again");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_push_rejects_invalid_graph_name() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = push_schema(
        &client,
        &server.base_url,
        "my graph!",
        "foo",
        "1",
        "type Query { hello: String }",
    )
    .await;
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("parse error response");
    assert_eq!(body["success"], json!(false));
}
