//! Query entry point.
//!
//! [`DocGraph`] owns the derived schema and executes queries against it.
//! Queries arrive as plain text, as a template invocation, or as a full
//! [`QueryOptions`] value; all three normalize to query text, variables and
//! an [`ExecutionContext`].

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Response, Variables};
use docgraph_core::CollectionRegistry;
use docgraph_storage::DynStore;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GraphQLConfig;
use crate::context::{ExecutionContext, ExecutionContextBuilder};
use crate::error::GraphQLError;
use crate::schema::DocGraphSchemaBuilder;

/// Lifecycle of one query, reported through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Parsing,
    Executing,
    Completed,
    Failed,
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Parsing => write!(f, "parsing"),
            Self::Executing => write!(f, "executing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A query written as template segments with interpolated values.
///
/// Values are substituted verbatim between segments, without escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateQuery {
    pub segments: Vec<String>,
    pub values: Vec<String>,
}

impl TemplateQuery {
    pub fn new<S, V>(segments: impl IntoIterator<Item = S>, values: impl IntoIterator<Item = V>) -> Self
    where
        S: Into<String>,
        V: ToString,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Joins segments and values positionally. With no values only the first
    /// segment is used.
    #[must_use]
    pub fn render(&self) -> String {
        if self.values.is_empty() {
            return self.segments.first().cloned().unwrap_or_default();
        }

        let mut text = String::new();
        for (index, segment) in self.segments.iter().enumerate() {
            text.push_str(segment);
            if let Some(value) = self.values.get(index) {
                text.push_str(value);
            }
        }
        text
    }
}

/// Full query invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub query: String,
    pub variables: Option<Value>,
    /// Opaque authorization token forwarded to the store.
    pub auth: Option<Value>,
    /// Permission label; the configured default when absent.
    pub perm: Option<String>,
    pub operation_name: Option<String>,
    /// Correlation id carried into resolver logs.
    pub request_id: Option<String>,
}

impl QueryOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Value) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_permission(mut self, perm: impl Into<String>) -> Self {
        self.perm = Some(perm.into());
        self
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Any accepted query shape.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    Text(String),
    Template(TemplateQuery),
    Options(QueryOptions),
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<TemplateQuery> for QueryInput {
    fn from(template: TemplateQuery) -> Self {
        Self::Template(template)
    }
}

impl From<QueryOptions> for QueryInput {
    fn from(options: QueryOptions) -> Self {
        Self::Options(options)
    }
}

impl QueryInput {
    /// Normalizes the input into options, filling in nothing but the text.
    #[must_use]
    pub fn into_options(self) -> QueryOptions {
        match self {
            Self::Text(text) => QueryOptions::new(text),
            Self::Template(template) => QueryOptions::new(template.render()),
            Self::Options(options) => options,
        }
    }
}

/// A derived schema ready to answer queries.
pub struct DocGraph {
    schema: Schema,
    registry: Arc<CollectionRegistry>,
    config: GraphQLConfig,
}

impl DocGraph {
    /// Derives the schema for every collection in the registry.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or a collection
    /// definition cannot be turned into a schema.
    pub fn build(
        registry: impl Into<Arc<CollectionRegistry>>,
        store: DynStore,
        config: GraphQLConfig,
    ) -> Result<Self, GraphQLError> {
        config.validate().map_err(GraphQLError::Config)?;
        let registry = registry.into();

        let schema = DocGraphSchemaBuilder::new(
            registry.clone(),
            store.clone(),
            config.to_schema_builder_config(),
        )
        .build()?;

        info!(
            collections = registry.len(),
            backend = store.backend_name(),
            "GraphQL schema ready"
        );

        Ok(Self {
            schema,
            registry,
            config,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GraphQLConfig {
        &self.config
    }

    /// Schema definition language of the derived schema.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// Executes a query. Errors are reported inside the response.
    pub async fn query(&self, input: impl Into<QueryInput>) -> Response {
        debug!(state = %QueryState::Idle, "Query received");
        let options = input.into().into_options();

        debug!(state = %QueryState::Parsing, query = %options.query, "Preparing query");
        let mut context = ExecutionContextBuilder::new()
            .with_auth(options.auth)
            .with_permission_or(options.perm, &self.config.default_permission);
        if let Some(request_id) = options.request_id {
            context = context.with_request_id(request_id);
        }
        let context = context.build();

        let mut request = Request::new(options.query);
        if let Some(variables) = options.variables {
            request = request.variables(Variables::from_json(variables));
        }
        if let Some(name) = options.operation_name {
            request = request.operation_name(name);
        }

        self.execute(request, context).await
    }

    /// Executes a prepared request under an explicit context.
    pub async fn execute(&self, request: Request, context: ExecutionContext) -> Response {
        debug!(
            state = %QueryState::Executing,
            perm = %context.perm,
            request_id = context.request_id.as_deref().unwrap_or("-"),
            "Executing query"
        );
        let response = self.schema.execute(request.data(context)).await;

        if response.errors.is_empty() {
            debug!(state = %QueryState::Completed, "Query completed");
        } else {
            warn!(
                state = %QueryState::Failed,
                errors = response.errors.len(),
                first = %response.errors[0].message,
                "Query finished with errors"
            );
        }
        response
    }
}
