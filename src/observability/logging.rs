//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive string.
    pub filter: String,
    /// Log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Default filter directive.
    pub const DEFAULT_FILTER: &'static str = "info";

    /// Filter directive used for `--verbose`.
    pub const VERBOSE_FILTER: &'static str = "debug";

    /// Builds logging configuration from config settings with env overrides.
    ///
    /// Filter precedence: `THREADKB_LOG`, `RUST_LOG`, `--verbose`, the config
    /// file level, then `info`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, |key| std::env::var(key).ok())
    }

    fn resolve(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let format = get("THREADKB_LOG_FORMAT")
            .or_else(|| settings.and_then(|s| s.format.clone()))
            .and_then(|value| LogFormat::parse(&value))
            .unwrap_or_default();

        let filter = get("THREADKB_LOG")
            .or_else(|| get("RUST_LOG"))
            .or_else(|| verbose.then(|| Self::VERBOSE_FILTER.to_string()))
            .or_else(|| settings.and_then(|s| s.level.clone()))
            .unwrap_or_else(|| Self::DEFAULT_FILTER.to_string());

        let file = get("THREADKB_LOG_FILE")
            .or_else(|| settings.and_then(|s| s.file.clone()))
            .map(PathBuf::from);

        Self {
            format,
            filter,
            file,
        }
    }
}
