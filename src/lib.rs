//! rustrid - X-Request-ID correlation middleware for hyper services
//!
//! This crate provides:
//! - A middleware that echoes a client supplied `X-Request-ID` or generates one
//! - Pluggable argumentless or request-aware ID generators
//! - Per-request skip predicates
//! - A small HTTP server hosting a handler behind the middleware

pub mod config;
pub mod middleware;
pub mod request_id;
pub mod server;
pub mod util;

pub use config::Config;
pub use middleware::{request_id as request_id_layer, RequestIdConfig, RequestIdLayer};
pub use request_id::RequestId;
