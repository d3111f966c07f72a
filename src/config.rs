//! Startup configuration read from the process environment.

use crate::error::{DeemgError, Result};
use crate::generation::providers::{GeminiModel, GeminiProvider};

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GOOGLE_API_KEY"];

/// Environment variable selecting the Gemini model.
pub const MODEL_ENV_VAR: &str = "DEEMG_MODEL";

/// Resolved startup settings.
#[derive(Clone)]
pub struct Config {
    /// Static API credential.
    pub api_key: String,
    /// Model used for generation.
    pub model: GeminiModel,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// A missing API key is fatal: nothing else should be constructed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| {
                DeemgError::Auth(format!(
                    "{} environment variable is not set",
                    API_KEY_ENV_VARS.join(" or ")
                ))
            })?;

        let model = match lookup(MODEL_ENV_VAR) {
            Some(value) if !value.trim().is_empty() => value.parse::<GeminiModel>()?,
            _ => GeminiModel::default(),
        };

        Ok(Self { api_key, model })
    }

    /// Overrides the model.
    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the Gemini provider with the configured credential injected.
    pub fn provider(&self) -> Result<GeminiProvider> {
        GeminiProvider::builder()
            .api_key(&self.api_key)
            .model(self.model)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DeemgError::Auth(_)));
        assert!(err.to_string().contains("API_KEY"));

        assert!(Config::from_lookup(lookup(&[("API_KEY", " ")])).is_err());
    }

    #[test]
    fn test_api_key_precedence() {
        let config = Config::from_lookup(lookup(&[
            ("API_KEY", "primary"),
            ("GOOGLE_API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "primary");

        let config =
            Config::from_lookup(lookup(&[("GOOGLE_API_KEY", " fallback\n")])).unwrap();
        assert_eq!(config.api_key, "fallback");
        assert_eq!(config.model, GeminiModel::NanoBanana);
    }

    #[test]
    fn test_model_from_env() {
        let config =
            Config::from_lookup(lookup(&[("API_KEY", "k"), ("DEEMG_MODEL", "pro")])).unwrap();
        assert_eq!(config.model, GeminiModel::NanoBananaPro);

        assert!(Config::from_lookup(lookup(&[("API_KEY", "k"), ("DEEMG_MODEL", "x")])).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&[("API_KEY", "secret")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(config.with_model(GeminiModel::NanoBananaPro).provider().is_ok());
    }
}
