//! HTTP server hosting a handler behind the request ID middleware.

mod handler;
mod listener;

pub use handler::{handle, ClientAddr, HEALTH_PATH};
pub use listener::HttpServer;
