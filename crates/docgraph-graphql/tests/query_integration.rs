//! Integration tests for query execution.
//!
//! A small organization/team/user dataset is seeded into the in-memory store
//! and queried through [`DocGraph`], checking link traversal, filter
//! arguments, fragments, variables and the projections sent to the store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docgraph_core::{CollectionDef, CollectionRegistry, Document, DocumentId, FieldDef, FieldKind};
use docgraph_db_memory::InMemoryStore;
use docgraph_graphql::{DocGraph, GraphQLConfig, QueryOptions, TemplateQuery};
use docgraph_storage::{DocumentStore, DynStore, FindOptions, StoreError};
use serde_json::{Value, json};

// =============================================================================
// Fixtures
// =============================================================================

struct Ids {
    chipotle: DocumentId,
    cava: DocumentId,
    burrito_makers: DocumentId,
    ben: DocumentId,
    ted: DocumentId,
}

fn registry() -> CollectionRegistry {
    CollectionRegistry::from_definitions([
        CollectionDef::new("organization")
            .field("_id", FieldDef::id())
            .field("name", FieldDef::string()),
        CollectionDef::new("team")
            .field("_id", FieldDef::id())
            .field("name", FieldDef::string())
            .field("organizationId", FieldDef::link("organization")),
        CollectionDef::new("userStatus")
            .field("_id", FieldDef::scalar(FieldKind::Integer))
            .field("name", FieldDef::string())
            .with_values(vec![
                json!({"_id": 1, "name": "Active"}),
                json!({"_id": 2, "name": "Inactive"}),
            ])
            .unwrap(),
        CollectionDef::new("user")
            .field("_id", FieldDef::id())
            .field("name", FieldDef::string())
            .field("organizationId", FieldDef::link("organization"))
            .field("teamIds", FieldDef::array(FieldDef::link("team")))
            .field("status", FieldDef::link("userStatus"))
            .field(
                "computed",
                FieldDef::computed(FieldKind::String, |doc| {
                    let name = doc.get("name").and_then(Value::as_str).unwrap_or_default();
                    json!(format!("Hello {name} from a computed property!"))
                }),
            ),
    ])
    .unwrap()
}

async fn seeded_store() -> (Arc<InMemoryStore>, Ids) {
    let ids = Ids {
        chipotle: DocumentId::new(),
        cava: DocumentId::new(),
        burrito_makers: DocumentId::new(),
        ben: DocumentId::new(),
        ted: DocumentId::new(),
    };
    let chopped = DocumentId::new();
    let chipotle_marketing = DocumentId::new();
    let cava_engineers = DocumentId::new();

    let store = Arc::new(InMemoryStore::new());
    store
        .seed(json!({
            "organization": [
                {"_id": ids.chipotle.to_string(), "name": "Chipotle"},
                {"_id": chopped.to_string(), "name": "Chopped"},
                {"_id": ids.cava.to_string(), "name": "Cava"}
            ],
            "team": [
                {"_id": ids.burrito_makers.to_string(), "name": "burritoMakers", "organizationId": ids.chipotle.to_string()},
                {"_id": chipotle_marketing.to_string(), "name": "chipotleMarketing", "organizationId": ids.chipotle.to_string()},
                {"_id": cava_engineers.to_string(), "name": "cavaEngineers", "organizationId": ids.cava.to_string()},
                {"name": "choppedExec", "organizationId": chopped.to_string()}
            ],
            "user": [
                {
                    "_id": ids.ben.to_string(),
                    "name": "ben",
                    "organizationId": ids.chipotle.to_string(),
                    "teamIds": [ids.burrito_makers.to_string(), chipotle_marketing.to_string()]
                },
                {
                    "_id": ids.ted.to_string(),
                    "name": "ted",
                    "organizationId": ids.cava.to_string(),
                    "teamIds": [cava_engineers.to_string()],
                    "status": 1
                },
                {"name": "noTeams", "organizationId": ids.chipotle.to_string()}
            ]
        }))
        .await
        .unwrap();

    (store, ids)
}

async fn graph() -> (DocGraph, Ids) {
    let (store, ids) = seeded_store().await;
    let graph = DocGraph::build(registry(), store, GraphQLConfig::default()).unwrap();
    (graph, ids)
}

async fn data(graph: &DocGraph, input: impl Into<docgraph_graphql::QueryInput>) -> Value {
    let response = graph.query(input).await;
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

// =============================================================================
// Recording Store
// =============================================================================

/// Wraps a store and records every `find_*` call.
struct RecordingStore {
    inner: Arc<InMemoryStore>,
    calls: Mutex<Vec<(String, FindOptions)>>,
}

impl RecordingStore {
    fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, FindOptions)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, collection: &str, options: &FindOptions) {
        self.calls
            .lock()
            .unwrap()
            .push((collection.to_string(), options.clone()));
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn find_one(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Option<Document>, StoreError> {
        self.record(collection, options);
        self.inner.find_one(collection, options).await
    }

    async fn find_all(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.record(collection, options);
        self.inner.find_all(collection, options).await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
        self.inner.insert(collection, document).await
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

async fn recording_graph() -> (DocGraph, Arc<RecordingStore>) {
    let (store, _) = seeded_store().await;
    let recorder = Arc::new(RecordingStore::new(store));
    let dyn_store: DynStore = recorder.clone();
    let graph = DocGraph::build(registry(), dyn_store, GraphQLConfig::default()).unwrap();
    (graph, recorder)
}

// =============================================================================
// Link Traversal
// =============================================================================

#[tokio::test]
async fn test_single_link_populates() {
    let (graph, _) = graph().await;
    let result = data(&graph, "{ users { name organizationId { name } } }").await;

    assert_eq!(
        result,
        json!({
            "users": [
                {"name": "ben", "organizationId": {"name": "Chipotle"}},
                {"name": "ted", "organizationId": {"name": "Cava"}},
                {"name": "noTeams", "organizationId": {"name": "Chipotle"}}
            ]
        })
    );
}

#[tokio::test]
async fn test_array_of_links_populates() {
    let (graph, _) = graph().await;
    let result = data(
        &graph,
        "{ users { name teamIds { name, organizationId { name } } } }",
    )
    .await;

    assert_eq!(
        result,
        json!({
            "users": [
                {
                    "name": "ben",
                    "teamIds": [
                        {"name": "burritoMakers", "organizationId": {"name": "Chipotle"}},
                        {"name": "chipotleMarketing", "organizationId": {"name": "Chipotle"}}
                    ]
                },
                {
                    "name": "ted",
                    "teamIds": [
                        {"name": "cavaEngineers", "organizationId": {"name": "Cava"}}
                    ]
                },
                {"name": "noTeams", "teamIds": []}
            ]
        })
    );
}

#[tokio::test]
async fn test_array_of_links_keeps_parent_order() {
    let first = DocumentId::new();
    let second = DocumentId::new();
    let third = DocumentId::new();
    let store = Arc::new(InMemoryStore::new());
    store
        .seed(json!({
            "team": [
                {"_id": first.to_string(), "name": "first"},
                {"_id": second.to_string(), "name": "second"},
                {"_id": third.to_string(), "name": "third"}
            ],
            "user": [{
                "name": "ben",
                "teamIds": [third.to_string(), first.to_string(), second.to_string()]
            }]
        }))
        .await
        .unwrap();
    let graph = DocGraph::build(registry(), store, GraphQLConfig::default()).unwrap();

    let result = data(&graph, "{ user { teamIds { name } } }").await;
    assert_eq!(
        result,
        json!({"user": {"teamIds": [{"name": "third"}, {"name": "first"}, {"name": "second"}]}})
    );

    let query = format!(
        r#"{{ user {{ teamIds(_id: ["{first}", "{third}"]) {{ name }} }} }}"#
    );
    let result = data(&graph, query.as_str()).await;
    assert_eq!(
        result,
        json!({"user": {"teamIds": [{"name": "third"}, {"name": "first"}]}})
    );
}

#[tokio::test]
async fn test_enum_link_populates() {
    let (graph, ids) = graph().await;
    let options = QueryOptions::new(
        "query getUserById($id: [ID]) { user(_id: $id) { status { name } } }",
    )
    .with_variables(json!({"id": [ids.ted.to_string()]}));

    assert_eq!(
        data(&graph, options).await,
        json!({"user": {"status": {"name": "Active"}}})
    );
}

#[tokio::test]
async fn test_missing_enum_link_is_null() {
    let (graph, _) = graph().await;
    let result = data(&graph, r#"{ user(name: "ben") { name status { name } } }"#).await;
    assert_eq!(result, json!({"user": {"name": "ben", "status": null}}));
}

#[tokio::test]
async fn test_enum_root_fields() {
    let (graph, _) = graph().await;
    let result = data(
        &graph,
        "{ userStatuses { name } userStatus(_id: 2) { _id name } }",
    )
    .await;
    assert_eq!(
        result,
        json!({
            "userStatuses": [{"name": "Active"}, {"name": "Inactive"}],
            "userStatus": {"_id": 2, "name": "Inactive"}
        })
    );
}

// =============================================================================
// Arguments
// =============================================================================

#[tokio::test]
async fn test_filter_by_id() {
    let (graph, ids) = graph().await;
    let query = format!(
        r#"{{ user(_id: ["{}"]) {{ name teamIds {{ name organizationId {{ name }} }} }} }}"#,
        ids.ted
    );

    assert_eq!(
        data(&graph, query).await,
        json!({
            "user": {
                "name": "ted",
                "teamIds": [{"name": "cavaEngineers", "organizationId": {"name": "Cava"}}]
            }
        })
    );
}

#[tokio::test]
async fn test_filter_by_linked_document() {
    let (graph, ids) = graph().await;
    let query = format!(
        r#"{{ users(teamIds: ["{}"]) {{ name teamIds {{ name }} }} }}"#,
        ids.burrito_makers
    );

    assert_eq!(
        data(&graph, query).await,
        json!({
            "users": [
                {
                    "name": "ben",
                    "teamIds": [{"name": "burritoMakers"}, {"name": "chipotleMarketing"}]
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_link_field_argument_intersects() {
    let (graph, ids) = graph().await;
    let query = format!(
        r#"{{ users {{ name teamIds(_id: "{}") {{ name organizationId {{ name }} }} }} }}"#,
        ids.burrito_makers
    );

    assert_eq!(
        data(&graph, query).await,
        json!({
            "users": [
                {
                    "name": "ben",
                    "teamIds": [{"name": "burritoMakers", "organizationId": {"name": "Chipotle"}}]
                },
                {"name": "ted", "teamIds": []},
                {"name": "noTeams", "teamIds": []}
            ]
        })
    );
}

#[tokio::test]
async fn test_single_link_argument_excludes() {
    let (graph, ids) = graph().await;
    let query = format!(
        r#"{{ users {{ name organizationId(_id: ["{}"]) {{ name }} }} }}"#,
        ids.cava
    );

    assert_eq!(
        data(&graph, query).await,
        json!({
            "users": [
                {"name": "ben", "organizationId": null},
                {"name": "ted", "organizationId": {"name": "Cava"}},
                {"name": "noTeams", "organizationId": null}
            ]
        })
    );
}

#[tokio::test]
async fn test_multiple_values_match_any() {
    let (graph, _) = graph().await;
    let result = data(&graph, r#"{ users(name: ["ted", "noTeams"]) { name } }"#).await;
    assert_eq!(result, json!({"users": [{"name": "ted"}, {"name": "noTeams"}]}));
}

#[tokio::test]
async fn test_no_match() {
    let (graph, _) = graph().await;
    let result = data(&graph, r#"{ user(name: "nobody") { name } users(name: "nobody") { name } }"#).await;
    assert_eq!(result, json!({"user": null, "users": []}));
}

#[tokio::test]
async fn test_invalid_id_reports_error() {
    let (graph, _) = graph().await;
    let response = graph
        .query(r#"{ user(_id: ["not-an-id"]) { name } users { name } }"#)
        .await;

    assert_eq!(response.errors.len(), 1);
    let error = serde_json::to_value(&response.errors[0]).unwrap();
    assert_eq!(error["extensions"]["code"], "INVALID_ID");
    assert_eq!(error["path"], json!(["user"]));
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "user": null,
            "users": [{"name": "ben"}, {"name": "ted"}, {"name": "noTeams"}]
        })
    );
}

#[tokio::test]
async fn test_invalid_link_id_nulls_only_that_field() {
    let chipotle = DocumentId::new();
    let store = Arc::new(InMemoryStore::new());
    store
        .seed(json!({
            "organization": [{"_id": chipotle.to_string(), "name": "Chipotle"}],
            "user": [
                {"name": "ben", "organizationId": chipotle.to_string()},
                {"name": "broken", "organizationId": "not-an-id"}
            ]
        }))
        .await
        .unwrap();
    let graph = DocGraph::build(registry(), store, GraphQLConfig::default()).unwrap();

    let response = graph.query("{ users { name organizationId { name } } }").await;

    assert_eq!(response.errors.len(), 1);
    let error = serde_json::to_value(&response.errors[0]).unwrap();
    assert_eq!(error["extensions"]["code"], "INVALID_ID");
    assert_eq!(error["path"], json!(["users", 1, "organizationId"]));
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "users": [
                {"name": "ben", "organizationId": {"name": "Chipotle"}},
                {"name": "broken", "organizationId": null}
            ]
        })
    );
}

// =============================================================================
// Query Shapes
// =============================================================================

#[tokio::test]
async fn test_fragments() {
    let (graph, _) = graph().await;
    let query = r#"
        query userQuery {
            user(name: "ben") {
                ...userProps
            }
        }

        fragment userProps on user {
            name
            teamIds {
                name
            }
        }
    "#;

    assert_eq!(
        data(&graph, query).await,
        json!({
            "user": {
                "name": "ben",
                "teamIds": [{"name": "burritoMakers"}, {"name": "chipotleMarketing"}]
            }
        })
    );
}

#[tokio::test]
async fn test_variables() {
    let (graph, ids) = graph().await;
    let options = QueryOptions::new(
        "query getUserById($id: [ID]) { user(_id: $id) { name teamIds { name } } }",
    )
    .with_variables(json!({"id": [ids.ted.to_string()]}))
    .with_operation_name("getUserById");

    assert_eq!(
        data(&graph, options).await,
        json!({"user": {"name": "ted", "teamIds": [{"name": "cavaEngineers"}]}})
    );
}

#[tokio::test]
async fn test_template_query() {
    let (graph, _) = graph().await;
    let template = TemplateQuery::new(
        ["query userNameQuery { users { name ", " { name } } }"],
        ["organizationId"],
    );

    assert_eq!(
        data(&graph, template).await,
        json!({
            "users": [
                {"name": "ben", "organizationId": {"name": "Chipotle"}},
                {"name": "ted", "organizationId": {"name": "Cava"}},
                {"name": "noTeams", "organizationId": {"name": "Chipotle"}}
            ]
        })
    );
}

#[tokio::test]
async fn test_computed_field() {
    let (graph, _) = graph().await;
    let result = data(&graph, r#"{ users(name: "ben") { computed } }"#).await;
    assert_eq!(
        result,
        json!({"users": [{"computed": "Hello ben from a computed property!"}]})
    );
}

// =============================================================================
// Store Interaction
// =============================================================================

#[tokio::test]
async fn test_projection_follows_selection() {
    let (graph, recorder) = recording_graph().await;
    data(&graph, "{ users { name organizationId { name } } }").await;

    let calls = recorder.calls();
    let (collection, options) = &calls[0];
    assert_eq!(collection, "user");
    let projection = options.projection.as_ref().unwrap();
    assert_eq!(
        projection.to_json(),
        json!({"_id": 1, "name": 1, "organizationId": 1})
    );

    let (collection, options) = &calls[1];
    assert_eq!(collection, "organization");
    assert_eq!(
        options.projection.as_ref().unwrap().to_json(),
        json!({"_id": 1, "name": 1})
    );
}

#[tokio::test]
async fn test_projection_includes_fragment_fields() {
    let (graph, recorder) = recording_graph().await;
    data(
        &graph,
        r#"{ user(name: "ben") { ...props } } fragment props on user { name teamIds { name } }"#,
    )
    .await;

    let calls = recorder.calls();
    let projection = calls[0].1.projection.as_ref().unwrap();
    assert!(projection.contains("name"));
    assert!(projection.contains("teamIds"));
    assert!(!projection.contains("organizationId"));
}

#[tokio::test]
async fn test_computed_field_disables_projection() {
    let (graph, recorder) = recording_graph().await;
    data(&graph, r#"{ users(name: "ben") { computed } }"#).await;

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.projection.is_none());
}

#[tokio::test]
async fn test_empty_link_skips_store() {
    let (graph, recorder) = recording_graph().await;
    data(&graph, r#"{ user(name: "noTeams") { teamIds { name } } }"#).await;

    let collections: Vec<_> = recorder.calls().into_iter().map(|(c, _)| c).collect();
    assert_eq!(collections, vec!["user".to_string()]);
}

#[tokio::test]
async fn test_auth_and_permission_forwarded() {
    let (graph, recorder) = recording_graph().await;
    let options = QueryOptions::new("{ users { organizationId { name } } }")
        .with_auth(json!({"user": "ben"}))
        .with_permission("edit");
    data(&graph, options).await;

    let calls = recorder.calls();
    assert!(calls.len() > 1);
    for (_, options) in calls {
        assert_eq!(options.auth, Some(json!({"user": "ben"})));
        assert_eq!(options.perm, "edit");
    }
}

#[tokio::test]
async fn test_default_permission() {
    let (graph, recorder) = recording_graph().await;
    data(&graph, "{ users { name } }").await;

    let calls = recorder.calls();
    assert_eq!(calls[0].1.perm, "view");
    assert!(calls[0].1.auth.is_none());
}

#[tokio::test]
async fn test_configured_default_permission() {
    let (store, _) = seeded_store().await;
    let recorder = Arc::new(RecordingStore::new(store));
    let config = GraphQLConfig {
        default_permission: "read".to_string(),
        ..Default::default()
    };
    let graph = DocGraph::build(registry(), recorder.clone() as DynStore, config).unwrap();
    data(&graph, "{ users { name } }").await;

    assert_eq!(recorder.calls()[0].1.perm, "read");
}

// =============================================================================
// Definitions Without `_id`
// =============================================================================

#[tokio::test]
async fn test_id_available_when_definition_omits_it() {
    let registry = CollectionRegistry::from_definitions([
        CollectionDef::new("team").field("name", FieldDef::string()),
        CollectionDef::new("user")
            .field("name", FieldDef::string())
            .field("teamIds", FieldDef::array(FieldDef::link("team"))),
    ])
    .unwrap();

    let red = DocumentId::new();
    let blue = DocumentId::new();
    let store = Arc::new(InMemoryStore::new());
    store
        .seed(json!({
            "team": [
                {"_id": red.to_string(), "name": "red"},
                {"_id": blue.to_string(), "name": "blue"}
            ],
            "user": [{"name": "ben", "teamIds": [red.to_string(), blue.to_string()]}]
        }))
        .await
        .unwrap();
    let graph = DocGraph::build(registry, store, GraphQLConfig::default()).unwrap();

    let query = format!(
        r#"{{ team(_id: ["{blue}"]) {{ _id name }} user {{ teamIds(_id: ["{red}"]) {{ name }} }} }}"#
    );
    let result = data(&graph, query.as_str()).await;
    assert_eq!(
        result,
        json!({
            "team": {"_id": blue.to_string(), "name": "blue"},
            "user": {"teamIds": [{"name": "red"}]}
        })
    );
}
