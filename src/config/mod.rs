#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;
pub mod toml_config;

use crate::core::fetch::{FixedBackoff, RetryPolicy};
use crate::core::ConfigProvider;
use crate::domain::model::PriceFormat;
use std::time::Duration;
use toml_config::PricerConfig;

/// Everything one pricing run needs, after merging the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input_path: String,
    pub supplier_domain: String,
    pub quantities: Vec<u32>,
    pub price_format: PriceFormat,
    pub exclude_invalid_urls: bool,
    pub skip_duplicates: bool,
    pub max_retries: Option<u32>,
    pub retry_delay: Duration,
}

impl RunSettings {
    pub fn from_config(config: &PricerConfig, input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            supplier_domain: config.pricing.supplier_domain.clone(),
            quantities: config.pricing.quantities.clone(),
            price_format: config.pricing.price_format(),
            exclude_invalid_urls: config.output.exclude_invalid_urls,
            skip_duplicates: config.api.skip_duplicates,
            max_retries: (!config.retry.unlimited).then_some(config.retry.max_retries),
            retry_delay: Duration::from_secs(config.retry.delay_seconds),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy<FixedBackoff> {
        RetryPolicy::new(self.max_retries, FixedBackoff(self.retry_delay))
    }
}

impl ConfigProvider for RunSettings {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn supplier_domain(&self) -> &str {
        &self.supplier_domain
    }

    fn quantities(&self) -> &[u32] {
        &self.quantities
    }

    fn price_format(&self) -> &PriceFormat {
        &self.price_format
    }

    fn exclude_invalid_urls(&self) -> bool {
        self.exclude_invalid_urls
    }

    fn skip_duplicates(&self) -> bool {
        self.skip_duplicates
    }
}
