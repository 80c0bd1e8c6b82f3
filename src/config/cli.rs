use crate::config::toml_config::PricerConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "bom-pricer")]
#[command(about = "Add Mouser price breaks to a bill of materials")]
pub struct CliConfig {
    /// BOM file (CSV) with a Datasheet column
    #[arg(default_value = "BOM_.csv")]
    pub input: String,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "bom-pricer.toml")]
    pub config: String,

    /// Base directory for timestamped output folders
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Drop rows with an empty or `~` Datasheet from the output BOM
    #[arg(long)]
    pub exclude_invalid_urls: bool,

    /// Mouser search option, e.g. Exact or BeginsWith
    #[arg(long)]
    pub search_option: Option<String>,

    /// Retries per part while the API keeps answering empty
    #[arg(long, conflicts_with = "unlimited_retries")]
    pub max_retries: Option<u32>,

    /// Retry rate-limited parts until they succeed
    #[arg(long)]
    pub unlimited_retries: bool,

    /// Seconds to wait before retrying a rate-limited part
    #[arg(long)]
    pub retry_delay_secs: Option<u64>,

    /// Search each part number only once
    #[arg(long)]
    pub skip_duplicates: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut PricerConfig) {
        if let Some(output_dir) = &self.output_dir {
            config.output.base_path = output_dir.clone();
        }
        if self.exclude_invalid_urls {
            config.output.exclude_invalid_urls = true;
        }
        if let Some(option) = &self.search_option {
            config.api.search_option = option.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
            config.retry.unlimited = false;
        }
        if self.unlimited_retries {
            config.retry.unlimited = true;
        }
        if let Some(delay) = self.retry_delay_secs {
            config.retry.delay_seconds = delay;
        }
        if self.skip_duplicates {
            config.api.skip_duplicates = true;
        }
    }
}
