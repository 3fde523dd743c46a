//! Configuration file loading.

use crate::config::{validate_config, Config, GeneratorKind, RequestIdSettings, Strategy};
use crate::middleware::{
    from_header_or_random, skip_paths, ConfigurationError, GeneratorStrategy, RequestIdConfig,
    RequestIdLayer,
};
use crate::request_id::{random_id, sequential_id, uuid_id};
use hyper::header::HeaderName;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),

    #[error("invalid request id middleware configuration: {0}")]
    Interceptor(#[from] ConfigurationError),
}

/// Load configuration from a YAML file.
///
/// This function reads the file, parses the YAML, and validates the configuration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    // Read file contents
    let contents = std::fs::read_to_string(path)?;

    parse_config(&contents)
}

/// Parse and validate configuration from a YAML string.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(contents)?;

    validate_config(&config).map_err(ConfigError::ValidationError)?;

    Ok(config)
}

impl RequestIdSettings {
    /// Translate the file settings into a middleware configuration.
    pub fn to_middleware_config(&self) -> Result<RequestIdConfig, ConfigError> {
        let header = parse_header(&self.header)?;
        let mut config = RequestIdConfig::new().header(header);

        config = match self.generator {
            GeneratorKind::Random => config.generator(random_id),
            GeneratorKind::Uuid => config.generator(uuid_id),
            GeneratorKind::Sequential => config.generator(sequential_id),
        };

        if let Some(source) = &self.source_header {
            config = config.context_generator(from_header_or_random(parse_header(source)?));
        }

        config = config.strategy(self.resolved_strategy());

        if !self.skip_paths.is_empty() {
            config = config.skip(skip_paths(self.skip_paths.clone()));
        }

        Ok(config)
    }

    /// Strategy the built middleware uses.
    ///
    /// A source header alone means the context-aware strategy, since the
    /// fixed generator is always populated from `generator`.
    pub fn resolved_strategy(&self) -> GeneratorStrategy {
        match (self.strategy, &self.source_header) {
            (Strategy::Fixed, _) | (Strategy::Auto, None) => GeneratorStrategy::Fixed,
            (Strategy::ContextAware, _) | (Strategy::Auto, Some(_)) => {
                GeneratorStrategy::ContextAware
            }
        }
    }

    /// Build the middleware layer described by these settings.
    pub fn build_layer(&self) -> Result<RequestIdLayer, ConfigError> {
        Ok(self.to_middleware_config()?.build()?)
    }
}

fn parse_header(name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        ConfigError::ValidationError(format!("invalid header name '{}': {}", name, e))
    })
}
