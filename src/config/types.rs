//! Configuration data types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Request ID middleware settings
    #[serde(default)]
    pub request_id: RequestIdSettings,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address and port to listen on
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Request ID middleware configuration as written in the file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestIdSettings {
    /// Header read from requests and written to responses
    #[serde(default = "default_header")]
    pub header: String,

    /// Which generator to use
    #[serde(default)]
    pub strategy: Strategy,

    /// Generator used by the fixed strategy
    #[serde(default)]
    pub generator: GeneratorKind,

    /// Inbound header whose value the context-aware strategy reuses
    #[serde(default)]
    pub source_header: Option<String>,

    /// Paths that bypass the middleware
    #[serde(default)]
    pub skip_paths: Vec<String>,
}

impl Default for RequestIdSettings {
    fn default() -> Self {
        Self {
            header: default_header(),
            strategy: Strategy::Auto,
            generator: GeneratorKind::Random,
            source_header: None,
            skip_paths: Vec::new(),
        }
    }
}

/// Generation strategy.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Auto,
    Fixed,
    ContextAware,
}

/// Built-in argumentless generators.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// 32 character random hex string
    #[default]
    Random,
    /// Hyphenated UUID v4
    Uuid,
    /// Process-local counter
    Sequential,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_header() -> String {
    "x-request-id".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.request_id.header, "x-request-id");
        assert_eq!(config.request_id.strategy, Strategy::Auto);
        assert!(config.request_id.skip_paths.is_empty());
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: Strategy = serde_yaml::from_str("context_aware").unwrap();
        assert_eq!(strategy, Strategy::ContextAware);

        let kind: GeneratorKind = serde_yaml::from_str("sequential").unwrap();
        assert_eq!(kind, GeneratorKind::Sequential);
    }

    #[test]
    fn test_partial_request_id_section() {
        let settings: RequestIdSettings =
            serde_yaml::from_str("skip_paths: [\"/healthz\"]").unwrap();
        assert_eq!(settings.header, "x-request-id");
        assert_eq!(settings.generator, GeneratorKind::Random);
        assert_eq!(settings.skip_paths, vec!["/healthz".to_string()]);
    }
}
