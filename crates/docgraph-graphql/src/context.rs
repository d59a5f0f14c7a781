//! GraphQL execution context.
//!
//! One [`ExecutionContext`] is created per query and attached to the
//! engine's request data. Resolvers read it to forward the caller's
//! authorization token and permission label to the store.
//!
//! # Example
//!
//! ```ignore
//! use docgraph_graphql::ExecutionContextBuilder;
//!
//! let context = ExecutionContextBuilder::new()
//!     .with_auth(Some(serde_json::json!("Bearer abc")))
//!     .with_permission("edit")
//!     .with_request_id("req-123")
//!     .build();
//! ```

use std::sync::LazyLock;

use async_graphql::dynamic::ResolverContext;
use docgraph_storage::DEFAULT_PERMISSION;
use serde_json::Value;

static DEFAULT_CONTEXT: LazyLock<ExecutionContext> = LazyLock::new(ExecutionContext::default);

/// Per-query authorization context. Never interpreted by docgraph itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    /// Opaque authorization token.
    pub auth: Option<Value>,

    /// Permission label.
    pub perm: String,

    /// Request ID for tracing and correlation.
    pub request_id: Option<String>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            auth: None,
            perm: DEFAULT_PERMISSION.to_string(),
            request_id: None,
        }
    }
}

impl ExecutionContext {
    pub fn new(auth: Option<Value>, perm: impl Into<String>) -> Self {
        Self {
            auth,
            perm: perm.into(),
            request_id: None,
        }
    }

    /// Returns whether the request carries an authorization token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth.as_ref().is_some_and(|a| !a.is_null())
    }

    /// Borrows the context attached to the current request, falling back to
    /// the default (no token, `view` permission).
    pub(crate) fn from_resolver<'a>(ctx: &ResolverContext<'a>) -> &'a ExecutionContext {
        ctx.ctx
            .data_opt::<ExecutionContext>()
            .unwrap_or_else(|| &*DEFAULT_CONTEXT)
    }
}

/// Builder for [`ExecutionContext`].
#[derive(Debug, Default)]
pub struct ExecutionContextBuilder {
    auth: Option<Value>,
    perm: Option<String>,
    request_id: Option<String>,
}

impl ExecutionContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Option<Value>) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn with_permission(mut self, perm: impl Into<String>) -> Self {
        self.perm = Some(perm.into());
        self
    }

    /// Uses `perm` when given, otherwise `default`.
    #[must_use]
    pub fn with_permission_or(mut self, perm: Option<String>, default: &str) -> Self {
        self.perm = Some(perm.unwrap_or_else(|| default.to_string()));
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn build(self) -> ExecutionContext {
        ExecutionContext {
            auth: self.auth,
            perm: self
                .perm
                .unwrap_or_else(|| DEFAULT_PERMISSION.to_string()),
            request_id: self.request_id,
        }
    }
}
