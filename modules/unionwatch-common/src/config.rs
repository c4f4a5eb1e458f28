use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::PipelineError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BATCH_LIMIT: usize = 20;
pub const MAX_BATCH_LIMIT: usize = 50;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Text generation
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,

    // Batch triage
    pub batch_limit: usize,
    pub batch_concurrency: usize,

    // Record store
    pub store_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            batch_limit: DEFAULT_BATCH_LIMIT,
            batch_concurrency: 1,
            store_path: PathBuf::from("unions.json"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A missing API key is not an error here; it surfaces as a
    /// configuration error on the first generation call.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let defaults = Self::default();
        let batch_limit = parse_number(&lookup, "UNIONWATCH_BATCH_LIMIT", defaults.batch_limit)?
            .clamp(1, MAX_BATCH_LIMIT);
        let batch_concurrency =
            parse_number(&lookup, "UNIONWATCH_BATCH_CONCURRENCY", defaults.batch_concurrency)?
                .max(1);

        Ok(Self {
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            batch_limit,
            batch_concurrency,
            store_path: lookup("UNIONWATCH_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
        })
    }

    /// Log the active configuration with the credential masked.
    pub fn log_redacted(&self) {
        info!(
            gemini_api_key = redact(self.gemini_api_key.as_deref()),
            gemini_model = self.gemini_model.as_str(),
            batch_limit = self.batch_limit,
            batch_concurrency = self.batch_concurrency,
            store_path = %self.store_path.display(),
            "Configuration loaded"
        );
    }
}

fn parse_number(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, PipelineError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PipelineError::Configuration(format!("{key} must be a number, got {raw:?}"))),
    }
}

fn redact(value: Option<&str>) -> String {
    match value {
        None => "<unset>".to_string(),
        Some(v) if v.chars().count() <= 4 => "****".to_string(),
        Some(v) => format!("{}****", v.chars().take(4).collect::<String>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, PipelineError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.batch_limit, DEFAULT_BATCH_LIMIT);
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.store_path, PathBuf::from("unions.json"));
    }

    #[test]
    fn batch_limit_is_clamped() {
        assert_eq!(config_from(&[("UNIONWATCH_BATCH_LIMIT", "500")]).unwrap().batch_limit, MAX_BATCH_LIMIT);
        assert_eq!(config_from(&[("UNIONWATCH_BATCH_LIMIT", "0")]).unwrap().batch_limit, 1);
    }

    #[test]
    fn bad_number_is_configuration_error() {
        let err = config_from(&[("UNIONWATCH_BATCH_CONCURRENCY", "many")]).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn blank_key_is_unset() {
        let config = config_from(&[("GEMINI_API_KEY", "  ")]).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn redact_masks_key() {
        assert_eq!(redact(Some("AIzaSyExample")), "AIza****");
        assert_eq!(redact(Some("abc")), "****");
        assert_eq!(redact(None), "<unset>");
    }
}
