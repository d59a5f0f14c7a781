pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod server;

pub use server::{DocgraphServer, ServerBuilder, build_app};
