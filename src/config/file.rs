//! TOML configuration file structure.
//!
//! Every field is optional; [`super::AppConfig`] applies defaults.

use serde::Deserialize;

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// HTTP server settings.
    pub server: Option<ConfigFileServer>,
    /// Default model configuration.
    pub model: Option<ConfigFileModel>,
    /// Provider endpoints and credentials.
    pub providers: Option<ConfigFileProviders>,
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
    /// Metrics settings.
    pub metrics: Option<MetricsSettings>,
}

/// Server section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileServer {
    /// Bind host.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Maximum request body size in bytes.
    pub max_body_bytes: Option<usize>,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Option<Vec<String>>,
}

/// Model section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileModel {
    /// Provider name.
    pub provider: Option<String>,
    /// Hosted model name.
    pub openai_model: Option<String>,
    /// Local model name.
    pub ollama_model: Option<String>,
    /// Local endpoint URL.
    pub ollama_url: Option<String>,
}

/// Providers section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileProviders {
    /// Hosted API base URL.
    pub openai_endpoint: Option<String>,
    /// Hosted API key (may be an environment reference like `${OPENAI_API_KEY}`).
    pub openai_api_key: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive, e.g. `info` or `threadkb=debug`.
    pub level: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<String>,
}

/// Metrics settings.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Whether metrics are enabled.
    pub enabled: Option<bool>,
    /// Port for the Prometheus listener.
    pub port: Option<u16>,
}

/// Observability settings collected from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilitySettings {
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
    /// Metrics settings.
    pub metrics: Option<MetricsSettings>,
}
