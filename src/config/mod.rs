//! Configuration management.
//!
//! Layering, lowest to highest precedence: built-in defaults, the TOML config
//! file, environment variables.

mod file;

pub use file::{
    ConfigFile, ConfigFileModel, ConfigFileProviders, ConfigFileServer, LoggingSettings,
    MetricsSettings, ObservabilitySettings,
};

use crate::llm::{Credentials, ProviderSettings};
use crate::models::{ModelConfig, Provider};
use crate::{Error, Result};
use secrecy::SecretString;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "THREADKB_CONFIG_PATH";

/// Directory name used under the platform config dir.
const APP_DIR: &str = "threadkb";

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Origins allowed to call the API from a browser. Empty disables CORS.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_body_bytes: 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Main configuration for threadkb.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Model configuration used when a request omits one.
    pub model: ModelConfig,
    /// Provider endpoints.
    pub providers: ProviderSettings,
    /// Provider credentials.
    pub credentials: Credentials,
    /// Logging and metrics settings.
    pub observability: ObservabilitySettings,
}

impl AppConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the effective configuration.
    ///
    /// Uses `explicit` if given, then `THREADKB_CONFIG_PATH`, then the default
    /// locations, then built-in defaults; environment overrides are applied
    /// last.
    ///
    /// # Errors
    ///
    /// Returns an error if a named config file cannot be read or parsed, or
    /// if any configured provider name is unknown.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_string(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(default_config_path);

        let config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                Self::load_from_file(&path)?
            },
            None => Self::default(),
        };

        config.with_env_overrides()
    }

    /// Loads configuration from a file path, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file, |key| std::env::var(key).ok())
    }

    /// Converts a `ConfigFile` to `AppConfig`.
    ///
    /// `lookup` resolves `${VAR}` references in secret values.
    fn from_config_file(file: ConfigFile, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(max_body_bytes) = server.max_body_bytes {
                config.server.max_body_bytes = max_body_bytes;
            }
            if let Some(origins) = server.cors_origins {
                config.server.cors_origins = origins;
            }
        }
        if let Some(model) = file.model {
            if let Some(provider) = model.provider {
                config.model.provider = provider.parse::<Provider>()?;
            }
            if let Some(name) = model.openai_model {
                config.model.hosted_model_name = name;
            }
            if let Some(name) = model.ollama_model {
                config.model.local_model_name = name;
            }
            if let Some(url) = model.ollama_url {
                config.model.local_endpoint_url = url;
            }
        }
        if let Some(providers) = file.providers {
            if let Some(endpoint) = providers.openai_endpoint {
                config.providers.openai_endpoint = endpoint;
            }
            if let Some(key) = providers
                .openai_api_key
                .and_then(|value| expand_env_reference(&value, &lookup))
            {
                config.credentials = config
                    .credentials
                    .with_openai_api_key(SecretString::from(key));
            }
        }
        config.observability = ObservabilitySettings {
            logging: file.logging,
            metrics: file.metrics,
        };

        Ok(config)
    }

    /// Applies environment variable overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `THREADKB_PROVIDER` names an unknown provider.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`.
    ///
    /// Unparseable numeric values are ignored.
    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(host) = get("THREADKB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("THREADKB_PORT").and_then(|v| v.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(provider) = get("THREADKB_PROVIDER") {
            self.model.provider = provider.parse::<Provider>()?;
        }
        if let Some(model) = get("THREADKB_OPENAI_MODEL") {
            self.model.hosted_model_name = model;
        }
        if let Some(model) = get("THREADKB_OLLAMA_MODEL") {
            self.model.local_model_name = model;
        }
        if let Some(url) = get("OLLAMA_HOST") {
            self.model.local_endpoint_url = url;
        }
        if let Some(endpoint) = get("THREADKB_OPENAI_ENDPOINT") {
            self.providers.openai_endpoint = endpoint;
        }
        if let Some(key) = get(crate::llm::OPENAI_API_KEY_ENV) {
            self.credentials = self
                .credentials
                .with_openai_api_key(SecretString::from(key));
        }

        Ok(self)
    }

    /// Renders the configuration as TOML with secrets redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let view = ConfigView {
            server: ServerView {
                host: &self.server.host,
                port: self.server.port,
                max_body_bytes: self.server.max_body_bytes,
                cors_origins: &self.server.cors_origins,
            },
            model: ModelView {
                provider: self.model.provider.as_str(),
                openai_model: &self.model.hosted_model_name,
                ollama_model: &self.model.local_model_name,
                ollama_url: &self.model.local_endpoint_url,
            },
            providers: ProvidersView {
                openai_endpoint: &self.providers.openai_endpoint,
                openai_api_key: if self.credentials.has_openai_api_key() {
                    "<redacted>"
                } else {
                    "<unset>"
                },
            },
        };

        toml::to_string_pretty(&view).map_err(|e| Error::OperationFailed {
            operation: "render_config".to_string(),
            cause: e.to_string(),
        })
    }
}

/// Returns the first existing default config file.
///
/// Checks the platform config dir (`~/Library/Application Support/threadkb/`
/// on macOS), then `~/.config/threadkb/` for Unix compatibility.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    let base_dirs = directories::BaseDirs::new()?;

    let platform_config = base_dirs.config_dir().join(APP_DIR).join("config.toml");
    if platform_config.exists() {
        return Some(platform_config);
    }

    let xdg_config = base_dirs
        .home_dir()
        .join(".config")
        .join(APP_DIR)
        .join("config.toml");
    xdg_config.exists().then_some(xdg_config)
}

/// Expands a whole-value `${VAR}` reference; other values pass through.
///
/// Returns `None` when the referenced variable is unset or blank.
fn expand_env_reference(value: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let trimmed = value.trim();
    let resolved = match trimmed
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(var) => lookup(var)?,
        None => trimmed.to_string(),
    };
    let resolved = resolved.trim();
    (!resolved.is_empty()).then(|| resolved.to_string())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Serialize)]
struct ConfigView<'a> {
    server: ServerView<'a>,
    model: ModelView<'a>,
    providers: ProvidersView<'a>,
}

#[derive(Serialize)]
struct ServerView<'a> {
    host: &'a str,
    port: u16,
    max_body_bytes: usize,
    cors_origins: &'a [String],
}

#[derive(Serialize)]
struct ModelView<'a> {
    provider: &'a str,
    openai_model: &'a str,
    ollama_model: &'a str,
    ollama_url: &'a str,
}

#[derive(Serialize)]
struct ProvidersView<'a> {
    openai_endpoint: &'a str,
    openai_api_key: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.providers.openai_endpoint, "https://api.openai.com/v1");
        assert!(!config.credentials.has_openai_api_key());
    }

    #[test]
    fn test_from_config_file_full() {
        let file: ConfigFile = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            max_body_bytes = 2048
            cors_origins = ["http://localhost:5173"]

            [model]
            provider = "ollama"
            ollama_model = "mistral"
            ollama_url = "http://gpu:11434"

            [providers]
            openai_endpoint = "https://proxy.internal/v1"
            openai_api_key = "${TEST_KEY}"

            [logging]
            format = "json"

            [metrics]
            enabled = true
            port = 9100
            "#,
        )
        .unwrap();

        let config =
            AppConfig::from_config_file(file, lookup_from(&[("TEST_KEY", "sk-from-env")])).unwrap();

        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.max_body_bytes, 2048);
        assert_eq!(config.server.cors_origins, ["http://localhost:5173"]);
        assert_eq!(config.model.provider, Provider::Local);
        assert_eq!(config.model.local_model_name, "mistral");
        assert_eq!(config.model.hosted_model_name, "gpt-3.5-turbo");
        assert_eq!(config.providers.openai_endpoint, "https://proxy.internal/v1");
        assert_eq!(
            config
                .credentials
                .openai_api_key()
                .map(ExposeSecret::expose_secret),
            Some("sk-from-env")
        );
        assert_eq!(
            config
                .observability
                .metrics
                .as_ref()
                .and_then(|m| m.port),
            Some(9100)
        );
    }

    #[test]
    fn test_unknown_provider_in_file_is_rejected() {
        let result = AppConfig::from_toml("[model]\nprovider = \"anthropic\"\n");
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = AppConfig::from_toml("[server]\nprot = 1\n");
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::new()
            .apply_env(lookup_from(&[
                ("THREADKB_PORT", "4000"),
                ("THREADKB_PROVIDER", "local"),
                ("OLLAMA_HOST", "http://ollama:11434"),
                ("OPENAI_API_KEY", "sk-env"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.model.provider, Provider::Local);
        assert_eq!(config.model.local_endpoint_url, "http://ollama:11434");
        assert!(config.credentials.has_openai_api_key());
    }

    #[test]
    fn test_env_invalid_port_ignored() {
        let config = AppConfig::new()
            .apply_env(lookup_from(&[("THREADKB_PORT", "not-a-port")]))
            .unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_invalid_provider_rejected() {
        let result = AppConfig::new().apply_env(lookup_from(&[("THREADKB_PROVIDER", "gpt")]));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_expand_env_reference() {
        let lookup = lookup_from(&[("KEY", "value"), ("BLANK", "  ")]);
        assert_eq!(expand_env_reference("${KEY}", &lookup).as_deref(), Some("value"));
        assert_eq!(expand_env_reference("literal", &lookup).as_deref(), Some("literal"));
        assert!(expand_env_reference("${MISSING}", &lookup).is_none());
        assert!(expand_env_reference("${BLANK}", &lookup).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9999").unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/threadkb.toml"));
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }

    #[test]
    fn test_redacted_toml_hides_key() {
        let mut config = AppConfig::new();
        config.credentials = config
            .credentials
            .with_openai_api_key(SecretString::from("sk-very-secret"));

        let rendered = config.to_redacted_toml().unwrap();
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("provider = \"openai\""));
    }
}
