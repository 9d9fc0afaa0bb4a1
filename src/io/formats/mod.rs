//! Format adapters for export and import.

pub mod csv;
pub mod json;
pub mod markdown;
pub mod yaml;

use crate::{Error, Result};
use std::path::Path;
use std::str::FromStr;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Pretty-printed JSON object.
    #[default]
    Json,
    /// YAML mapping with a `results` sequence.
    Yaml,
    /// CSV with a `problem,solution` header.
    Csv,
    /// Markdown listing (export only).
    Markdown,
}

impl Format {
    /// Returns all formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Json, Self::Yaml, Self::Csv, Self::Markdown]
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some(ext) => ext
                .parse()
                .map_err(|_| Error::Validation(format!("Unsupported file extension: .{ext}"))),
            None => Err(Error::Validation(
                "Cannot determine format: file has no extension".to_string(),
            )),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(Error::Validation(format!("Unknown format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Csv => write!(f, "csv"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}
