use std::fs;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use docgraph_server::bootstrap::{BootstrapError, build_graph, load_registry};
use docgraph_server::build_app;
use docgraph_server::config::AppConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

const DEFINITIONS: &str = r#"{
  "collections": [
    {"name": "organization", "fields": {"_id": "id", "name": "string"}},
    {"name": "user", "fields": {
      "_id": "id",
      "name": "string",
      "organizationId": {"link": "organization"}
    }}
  ]
}"#;

const SEED: &str = r#"{
  "organization": [{"_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2", "name": "Chipotle"}],
  "user": [{"name": "ben", "organizationId": "7d444840-9dc0-11d1-b245-5ffdce74fad2"}]
}"#;

fn config_in(dir: &tempfile::TempDir, definitions: &str, seed: Option<&str>) -> AppConfig {
    let defs_path = dir.path().join("collections.json");
    fs::write(&defs_path, definitions).expect("write definitions");

    let mut cfg = AppConfig::default();
    cfg.schema.collections = defs_path.to_string_lossy().to_string();
    if let Some(seed) = seed {
        let seed_path = dir.path().join("seed.json");
        fs::write(&seed_path, seed).expect("write seed");
        cfg.seed.path = Some(seed_path.to_string_lossy().to_string());
    }
    cfg
}

#[tokio::test]
async fn serves_seeded_graph() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let cfg = config_in(&dir, DEFINITIONS, Some(SEED));
    let graph = build_graph(&cfg).await.expect("graph builds");
    let app = build_app(graph);

    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"query": "{ users { name organizationId { name } } }"}).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({"data": {"users": [{"name": "ben", "organizationId": {"name": "Chipotle"}}]}})
    );
}

#[tokio::test]
async fn healthz_responds() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let cfg = config_in(&dir, DEFINITIONS, None);
    let app = build_app(build_graph(&cfg).await.expect("graph builds"));

    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unresolved_link_fails_startup() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let definitions = r#"{"collections": [{"name": "user", "fields": {"orgId": {"link": "organization"}}}]}"#;
    let cfg = config_in(&dir, definitions, None);

    let err = build_graph(&cfg).await.err().expect("build should fail");
    assert!(matches!(err, BootstrapError::Schema(_)));
}

#[tokio::test]
async fn malformed_seed_is_reported() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let cfg = config_in(&dir, DEFINITIONS, Some("{not json"));

    let err = build_graph(&cfg).await.err().expect("seed should fail");
    assert!(matches!(err, BootstrapError::SeedParse { .. }));
}

#[test]
fn missing_definitions_file() {
    let err = load_registry("/nonexistent/collections.json").unwrap_err();
    assert!(matches!(err, BootstrapError::Definitions { .. }));
    assert!(err.to_string().contains("/nonexistent/collections.json"));
}

#[test]
fn demo_definitions_load() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/collections.toml");
    let registry = load_registry(path).expect("demo definitions load");
    assert_eq!(registry.len(), 4);
    assert!(registry.get("userStatus").unwrap().is_enum());
}
