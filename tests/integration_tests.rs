use anyhow::Result;
use bom_pricer::core::fetch::{FixedBackoff, RetryPolicy};
use bom_pricer::core::pipeline::{PRICED_BOM_FILE, RESULTS_FILE};
use bom_pricer::core::{Pipeline, ResultSet};
use bom_pricer::domain::model::PartIdentifier;
use bom_pricer::{
    LocalStorage, MouserClient, PricerConfig, PricerError, PricingEngine, PricingPipeline,
    RunSettings,
};
use httpmock::prelude::*;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const SEARCH_PATH: &str = "/api/v1/search/partnumber";

fn write_bom(dir: &Path, content: &str) -> String {
    let path = dir.join("BOM_.csv");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn no_wait(max_retries: u32) -> RetryPolicy<FixedBackoff> {
    RetryPolicy::new(Some(max_retries), FixedBackoff(Duration::ZERO))
}

fn lm358_response() -> serde_json::Value {
    serde_json::json!({
        "Errors": [],
        "SearchResults": {
            "NumberOfResult": 1,
            "Parts": [{
                "MouserPartNumber": "595-LM358DR",
                "Manufacturer": "Texas Instruments",
                "PriceBreaks": [
                    {"Quantity": 1, "Price": "kr 4,12", "Currency": "NOK"},
                    {"Quantity": 10, "Price": "kr 2,95", "Currency": "NOK"},
                    {"Quantity": 100, "Price": "kr 2,10", "Currency": "NOK"},
                    {"Quantity": 1000, "Price": "kr 1,65", "Currency": "NOK"}
                ]
            }]
        }
    })
}

#[tokio::test]
async fn test_end_to_end_supplier_non_supplier_and_malformed_rows() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_bom(
        temp_dir.path(),
        "Reference,Value,Datasheet\n\
U1,LM358,https://www.mouser.com/ProductDetail/Texas-Instruments/595-LM358DR\n\
U2,NE555,https://www.ti.com/lit/ds/symlink/ne555.pdf\n\
U3,TL072,http://[broken\n",
    );
    let output_dir = temp_dir.path().join("out");

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .query_param("apiKey", "test-key")
            .body_contains("595-LM358DR");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(lm358_response());
    });

    let storage = LocalStorage::new(output_dir.clone());
    let client = MouserClient::new(server.url(SEARCH_PATH), "test-key");
    let settings = RunSettings::from_config(&PricerConfig::default(), input);
    let pipeline = PricingPipeline::new(storage, client, settings, no_wait(2));

    let output_path = PricingEngine::new(pipeline).run().await?;

    api_mock.assert_hits(1);
    assert_eq!(output_path, output_dir.display().to_string());

    let results = ResultSet::from_json_slice(&std::fs::read(output_dir.join(RESULTS_FILE))?)?;
    assert_eq!(results.len(), 1);
    assert!(results.contains(&PartIdentifier::from("595-LM358DR")));

    let tsv = std::fs::read_to_string(output_dir.join(PRICED_BOM_FILE))?;
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "Reference\tValue\tDatasheet\tPrice for 1\tPrice for 10\tPrice for 100\tPrice for 1000"
    );
    assert!(lines[1].starts_with("U1\tLM358\t"));
    assert!(lines[1].ends_with("\t4.12\t2.95\t2.10\t1.65"));
    assert!(lines[2].starts_with("U2\t") && lines[2].ends_with("\t\t\t\t"));
    assert!(lines[3].starts_with("U3\t") && lines[3].ends_with("\t\t\t\t"));

    Ok(())
}

#[tokio::test]
async fn test_non_utf8_row_does_not_stop_the_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("BOM_.csv");
    let mut content = b"Reference,Value,Datasheet\n\
R1,10k,https://www.mouser.com/ProductDetail/595-LM358DR\n\
C1,10"
        .to_vec();
    content.push(0xB5);
    content.extend_from_slice(b"F,~\n");
    std::fs::write(&input, content)?;
    let output_dir = temp_dir.path().join("out");

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH).body_contains("595-LM358DR");
        then.status(200).json_body(lm358_response());
    });

    let pipeline = PricingPipeline::new(
        LocalStorage::new(output_dir.clone()),
        MouserClient::new(server.url(SEARCH_PATH), "test-key"),
        RunSettings::from_config(&PricerConfig::default(), input.to_str().unwrap()),
        no_wait(2),
    );
    PricingEngine::new(pipeline).run().await?;

    api_mock.assert_hits(1);
    let tsv = std::fs::read_to_string(output_dir.join(PRICED_BOM_FILE))?;
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].ends_with("\t4.12\t2.95\t2.10\t1.65"));
    assert!(lines[2].starts_with("C1\t10\u{FFFD}F\t~"));

    Ok(())
}

#[tokio::test]
async fn test_rate_limited_part_is_dropped_after_retries() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_bom(
        temp_dir.path(),
        "Reference,Datasheet\nU1,https://www.mouser.com/ProductDetail/595-LM358DR\nC1,~\n",
    );
    let output_dir = temp_dir.path().join("out");

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(429);
    });

    let mut config = PricerConfig::default();
    config.output.exclude_invalid_urls = true;

    let pipeline = PricingPipeline::new(
        LocalStorage::new(output_dir.clone()),
        MouserClient::new(server.url(SEARCH_PATH), "test-key"),
        RunSettings::from_config(&config, input),
        no_wait(2),
    );

    let bom = pipeline.extract().await?;
    let priced = pipeline.transform(bom).await?;

    // 1 次請求 + 2 次重試
    api_mock.assert_hits(3);
    assert!(priced.report.results.is_empty());
    assert_eq!(priced.report.failed.len(), 1);
    assert_eq!(priced.report.failed[0].part.as_str(), "595-LM358DR");
    // `~` row is excluded, the unpriced supplier row stays
    assert_eq!(priced.rows.len(), 1);
    assert!(priced.rows[0].prices.iter().all(Option::is_none));

    pipeline.load(priced).await?;
    let json = std::fs::read_to_string(output_dir.join(RESULTS_FILE))?;
    assert_eq!(json.trim(), "{}");

    Ok(())
}

#[tokio::test]
async fn test_server_error_does_not_stop_the_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_bom(
        temp_dir.path(),
        "Reference,Datasheet\n\
U1,https://www.mouser.com/ProductDetail/BROKEN-1\n\
U2,https://www.mouser.com/ProductDetail/595-LM358DR\n",
    );

    let server = MockServer::start();
    let broken_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH).body_contains("BROKEN-1");
        then.status(500);
    });
    let ok_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH).body_contains("595-LM358DR");
        then.status(200).json_body(lm358_response());
    });

    let pipeline = PricingPipeline::new(
        LocalStorage::new(temp_dir.path().join("out")),
        MouserClient::new(server.url(SEARCH_PATH), "test-key"),
        RunSettings::from_config(&PricerConfig::default(), input),
        no_wait(2),
    );

    let bom = pipeline.extract().await?;
    let priced = pipeline.transform(bom).await?;

    broken_mock.assert_hits(1);
    ok_mock.assert_hits(1);
    assert_eq!(priced.report.results.len(), 1);
    assert_eq!(priced.report.failed[0].part.as_str(), "BROKEN-1");
    assert!(priced.rows[1].prices.iter().all(Option::is_some));

    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let pipeline = PricingPipeline::new(
        LocalStorage::new(temp_dir.path().join("out")),
        MouserClient::new("http://127.0.0.1:9/search", "test-key"),
        RunSettings::from_config(
            &PricerConfig::default(),
            temp_dir.path().join("missing.csv").to_str().unwrap(),
        ),
        no_wait(0),
    );

    let err = pipeline.extract().await.unwrap_err();
    assert!(matches!(err, PricerError::IoError(_)));
}

#[tokio::test]
async fn test_failure_reason_does_not_contain_api_key() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_bom(
        temp_dir.path(),
        "Reference,Datasheet\nU1,https://www.mouser.com/ProductDetail/595-LM358DR\n",
    );

    let pipeline = PricingPipeline::new(
        LocalStorage::new(temp_dir.path().join("out")),
        MouserClient::new("http://127.0.0.1:9/search", "SECRET-KEY-123")
            .with_timeout(Duration::from_secs(5)),
        RunSettings::from_config(&PricerConfig::default(), input),
        no_wait(0),
    );

    let bom = pipeline.extract().await?;
    let priced = pipeline.transform(bom).await?;

    assert_eq!(priced.report.failed.len(), 1);
    assert!(priced.report.failed[0].reason.starts_with("API request failed"));
    assert!(!priced.report.failed[0].reason.contains("SECRET-KEY-123"));

    Ok(())
}
