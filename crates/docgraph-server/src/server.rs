use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use docgraph_graphql::DocGraph;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::bootstrap::{self, BootstrapError};
use crate::config::AppConfig;

pub struct DocgraphServer {
    addr: SocketAddr,
    app: Router,
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn build_app(graph: Arc<DocGraph>) -> Router {
    docgraph_graphql::router(graph)
        .route("/healthz", get(healthz))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    pub async fn build(self) -> Result<DocgraphServer, BootstrapError> {
        let graph = bootstrap::build_graph(&self.config).await?;
        Ok(DocgraphServer {
            addr: self.config.addr(),
            app: build_app(graph),
        })
    }
}

impl DocgraphServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
