//! Configuration validation.

use crate::config::{Config, Strategy};
use hyper::header::HeaderName;

/// Validate the configuration.
///
/// Checks for:
/// - A known log level
/// - Valid header names for `header` and `source_header`
/// - A `source_header` when the context-aware strategy is selected
/// - Skip paths that start with `/`
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing every problem found.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();
    let request_id = &config.request_id;

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if HeaderName::from_bytes(request_id.header.as_bytes()).is_err() {
        errors.push(format!("invalid request id header name '{}'", request_id.header));
    }

    match &request_id.source_header {
        Some(name) => {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.push(format!("invalid source header name '{}'", name));
            }
        }
        None => {
            if request_id.strategy == Strategy::ContextAware {
                errors.push(
                    "context_aware strategy requires a source_header to generate ids from"
                        .to_string(),
                );
            }
        }
    }

    for path in &request_id.skip_paths {
        if !path.starts_with('/') {
            errors.push(format!("skip path '{}' must start with '/'", path));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
