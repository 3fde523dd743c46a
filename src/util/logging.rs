//! Logging initialization and configuration.

use crate::config::LogFormat;
use crate::request_id::RequestId;
use tracing::{info_span, Span};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `level` when set. Fails if a global
/// subscriber has already been installed.
///
/// # Arguments
///
/// * `level` - Log level filter (e.g., "info", "debug")
/// * `format` - Log output format (json or pretty)
pub fn init_logging(level: &str, format: &LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    }
}

/// Span wrapping the handling of one request, so every event logged inside
/// it carries the request ID.
pub fn request_span(id: &RequestId) -> Span {
    info_span!("request", request_id = %id)
}
