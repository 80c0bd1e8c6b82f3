use bom_pricer::config::credentials;
use bom_pricer::utils::error::ErrorSeverity;
use bom_pricer::utils::{logger, validation::Validate};
use bom_pricer::{
    CliConfig, LocalStorage, MouserClient, PricerConfig, PricingEngine, PricingPipeline,
    RunSettings,
};
use clap::Parser;
use std::path::Path;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting bom-pricer");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match PricerConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 找不到輸入檔只回報，不視為失敗
    if !Path::new(&cli.input).exists() {
        tracing::error!("❌ File '{}' does not exist", cli.input);
        println!("Error: File '{}' does not exist.", cli.input);
        return Ok(());
    }

    // 沒有金鑰就不發出任何請求
    let api_key = match credentials::api_key(&config) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let mut client = MouserClient::new(config.api.endpoint.clone(), api_key)
        .with_search_option(config.api.search_option.clone());
    if let Some(timeout) = config.api.timeout_seconds {
        client = client.with_timeout(Duration::from_secs(timeout));
    }

    let storage = LocalStorage::timestamped(&config.output.base_path)?;
    let settings = RunSettings::from_config(&config, cli.input.clone());
    let retry = settings.retry_policy();
    let pipeline = PricingPipeline::new(storage, client, settings, retry);
    let engine = PricingEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ BOM pricing completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Pricing run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
