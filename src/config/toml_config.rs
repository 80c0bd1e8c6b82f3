use crate::adapters::http::{DEFAULT_ENDPOINT, DEFAULT_SEARCH_OPTION};
use crate::core::bom::DEFAULT_QUANTITIES;
use crate::core::fetch::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use crate::core::parts::DEFAULT_SUPPLIER_DOMAIN;
use crate::domain::model::PriceFormat;
use crate::utils::error::{PricerError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricerConfig {
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub pricing: PricingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub search_api_key: Option<String>,
    pub search_option: String,
    pub timeout_seconds: Option<u64>,
    pub skip_duplicates: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            search_api_key: None,
            search_option: DEFAULT_SEARCH_OPTION.to_string(),
            timeout_seconds: None,
            skip_duplicates: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub unlimited: bool,
    pub delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            unlimited: false,
            delay_seconds: DEFAULT_RETRY_DELAY.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub quantities: Vec<u32>,
    pub supplier_domain: String,
    pub currency_prefix: String,
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let format = PriceFormat::default();
        Self {
            quantities: DEFAULT_QUANTITIES.to_vec(),
            supplier_domain: DEFAULT_SUPPLIER_DOMAIN.to_string(),
            currency_prefix: format.currency_prefix,
            decimal_separator: format.decimal_separator,
            grouping_separator: format.grouping_separator,
        }
    }
}

impl PricingConfig {
    pub fn price_format(&self) -> PriceFormat {
        PriceFormat {
            currency_prefix: self.currency_prefix.clone(),
            decimal_separator: self.decimal_separator,
            grouping_separator: self.grouping_separator,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_path: String,
    pub exclude_invalid_urls: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_path: "output".to_string(),
            exclude_invalid_urls: false,
        }
    }
}

impl PricerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        tracing::info!("📁 Loading configuration from: {}", path.display());
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${MOUSER_SEARCH_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PricerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for PricerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.endpoint", &self.api.endpoint)?;
        validation::validate_non_empty_string("api.search_option", &self.api.search_option)?;
        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }
        validation::validate_quantities("pricing.quantities", &self.pricing.quantities)?;
        validation::validate_non_empty_string(
            "pricing.supplier_domain",
            &self.pricing.supplier_domain,
        )?;
        if Some(self.pricing.decimal_separator) == self.pricing.grouping_separator {
            return Err(PricerError::InvalidConfigValueError {
                field: "pricing.grouping_separator".to_string(),
                value: self.pricing.decimal_separator.to_string(),
                reason: "must differ from decimal_separator".to_string(),
            });
        }
        validation::validate_path("output.base_path", &self.output.base_path)?;
        Ok(())
    }
}
