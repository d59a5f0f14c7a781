//! Axum HTTP handlers for the GraphQL endpoint.
//!
//! - `POST /graphql` - executes a query
//! - `GET /graphql` - serves GraphiQL
//!
//! The `Authorization` header is forwarded to the store as the opaque auth
//! token and `X-Permission` as the permission label. `X-Request-Id` is
//! reused as the correlation id, or a fresh one is generated.

use std::sync::Arc;

use async_graphql::Response;
use async_graphql::http::GraphiQLSource;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::{DocGraph, QueryOptions};

/// Path the GraphQL endpoint is mounted on.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Header carrying the permission label.
pub const PERMISSION_HEADER: &str = "x-permission";

/// Header carrying the caller's correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared across GraphQL handlers.
#[derive(Clone)]
pub struct GraphQLState {
    pub graph: Arc<DocGraph>,
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string.
    pub query: String,

    /// Optional operation name for multi-operation documents.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables for the query.
    pub variables: Option<serde_json::Value>,
}

/// GraphQL response body.
#[derive(Debug, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
}

impl From<Response> for GraphQLResponse {
    fn from(resp: Response) -> Self {
        let data_json = resp.data.into_json().unwrap_or(serde_json::Value::Null);
        let data = if data_json.is_null() {
            None
        } else {
            Some(data_json)
        };

        let errors = resp
            .errors
            .into_iter()
            .map(|e| {
                serde_json::to_value(&e).unwrap_or_else(|_| serde_json::json!({ "message": e.message }))
            })
            .collect();

        Self { data, errors }
    }
}

/// Builds the router serving the GraphQL endpoint.
pub fn router(graph: Arc<DocGraph>) -> Router {
    Router::new()
        .route(GRAPHQL_PATH, get(graphiql_handler).post(graphql_handler))
        .with_state(GraphQLState { graph })
}

/// Handles POST requests to /graphql.
pub async fn graphql_handler(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> impl IntoResponse {
    let options = request_options(&headers, request);
    debug!(
        authenticated = options.auth.is_some(),
        perm = ?options.perm,
        "Processing GraphQL request"
    );

    let response = state.graph.query(options).await;

    // GraphQL always returns 200 OK, even with errors
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(GraphQLResponse::from(response)),
    )
}

/// Serves GraphiQL on GET /graphql.
pub async fn graphiql_handler() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

/// Turns a request body and its headers into query options.
fn request_options(headers: &HeaderMap, request: GraphQLRequest) -> QueryOptions {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    QueryOptions {
        query: request.query,
        variables: request.variables,
        auth: header_value(header::AUTHORIZATION.as_str()).map(serde_json::Value::String),
        perm: header_value(PERMISSION_HEADER),
        operation_name: request.operation_name,
        request_id: Some(
            header_value(REQUEST_ID_HEADER).unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        ),
    }
}
