//! `X-Request-ID` middleware for hyper services.
//!
//! [`RequestIdLayer::layer`] wraps any `hyper::service::Service` into one
//! with the same request and response types. For each request that is not
//! skipped, the client's `X-Request-ID` is reused when present and non-empty,
//! otherwise a new ID is generated. The ID is stored in the request
//! extensions for the handler and always written to the response.

mod config;
mod context;
mod service;

pub use config::{
    from_header_or_random, skip_paths, ConfigurationError, ContextFn, FixedFn, Generator,
    GeneratorStrategy, RequestIdConfig, RequestIdHook, Skipper,
};
pub use context::RequestContext;
pub use service::{request_id, RequestIdLayer, RequestIdService, ResponseFuture};
