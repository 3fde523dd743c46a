//! Utility functions and helpers.

mod logging;
mod shutdown;

pub use logging::{init_logging, request_span};
pub use shutdown::ShutdownSignal;
