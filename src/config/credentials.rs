use crate::config::toml_config::PricerConfig;
use crate::utils::error::{PricerError, Result};

pub const API_KEY_ENV: &str = "MOUSER_SEARCH_API_KEY";

/// Pick the search API key. The environment wins over the config file and
/// blank values count as missing.
pub fn resolve_api_key(env_value: Option<String>, file_value: Option<&str>) -> Result<String> {
    env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            file_value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .ok_or_else(|| PricerError::MissingConfigError {
            field: "search_api_key".to_string(),
        })
}

pub fn api_key(config: &PricerConfig) -> Result<String> {
    let from_env = std::env::var(API_KEY_ENV).ok();
    if from_env.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        tracing::debug!("Using search API key from {}", API_KEY_ENV);
    }
    resolve_api_key(from_env, config.api.search_api_key.as_deref())
}
