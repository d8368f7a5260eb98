use std::env;

use crate::constants;

/// Process-wide settings for talking to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

impl Settings {
    /// Reads the credential, model and API URL from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let or_default = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self::new(
            lookup(constants::API_KEY_VAR),
            or_default(constants::MODEL_VAR, constants::DEFAULT_GEMINI_MODEL),
            or_default(constants::API_URL_VAR, constants::DEFAULT_GEMINI_API_URL),
        )
    }

    /// Blank credentials are stored as absent.
    pub fn new(api_key: Option<String>, model: String, api_url: String) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            api_key,
            model,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
