//! Provider credentials.

use secrecy::SecretString;

/// Environment variable holding the hosted provider's API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Credentials handed to invokers when they are built.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    openai_api_key: Option<SecretString>,
}

impl Credentials {
    /// Creates an empty credential set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hosted provider's API key.
    #[must_use]
    pub fn with_openai_api_key(mut self, key: SecretString) -> Self {
        self.openai_api_key = Some(key);
        self
    }

    /// Returns the hosted provider's API key, if any.
    #[must_use]
    pub const fn openai_api_key(&self) -> Option<&SecretString> {
        self.openai_api_key.as_ref()
    }

    /// Returns true when a hosted API key is configured.
    #[must_use]
    pub const fn has_openai_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }
}
