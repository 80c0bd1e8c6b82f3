use crate::core::bom::{price_rows, read_bom, write_priced_tsv};
use crate::core::fetch::{fetch_all, FixedBackoff, RetryPolicy};
use crate::core::{BomTable, ConfigProvider, Pipeline, PricedBom, Storage};
use crate::domain::ports::{Backoff, PartSearch};
use crate::utils::error::Result;

pub const RESULTS_FILE: &str = "part_data.json";
pub const PRICED_BOM_FILE: &str = "updated_BOM.tsv";

/// Reads the BOM, searches every supplier part and writes the raw results
/// plus the priced BOM.
pub struct PricingPipeline<S, P, C, B = FixedBackoff>
where
    S: Storage,
    P: PartSearch,
    C: ConfigProvider,
    B: Backoff,
{
    storage: S,
    search: P,
    config: C,
    retry: RetryPolicy<B>,
}

impl<S, P, C, B> PricingPipeline<S, P, C, B>
where
    S: Storage,
    P: PartSearch,
    C: ConfigProvider,
    B: Backoff,
{
    pub fn new(storage: S, search: P, config: C, retry: RetryPolicy<B>) -> Self {
        Self {
            storage,
            search,
            config,
            retry,
        }
    }
}

#[async_trait::async_trait]
impl<S, P, C, B> Pipeline for PricingPipeline<S, P, C, B>
where
    S: Storage,
    P: PartSearch,
    C: ConfigProvider,
    B: Backoff,
{
    async fn extract(&self) -> Result<BomTable> {
        let input_path = self.config.input_path();
        tracing::info!("📂 Reading BOM from: {}", input_path);

        let data = std::fs::read(input_path)?;
        let bom = read_bom(&data, self.config.supplier_domain())?;

        let non_supplier = bom.non_supplier_urls();
        if !non_supplier.is_empty() {
            tracing::warn!(
                "The following URLs are not from {} and will not be processed:",
                self.config.supplier_domain()
            );
            for url in &non_supplier {
                tracing::warn!("  {}", url);
            }
        }

        let invalid = bom.invalid_urls();
        if !invalid.is_empty() {
            tracing::warn!("The following URLs caused errors during processing:");
            for url in &invalid {
                tracing::warn!("  {}", url);
            }
        }

        Ok(bom)
    }

    async fn transform(&self, bom: BomTable) -> Result<PricedBom> {
        let parts = bom.supplier_parts();
        if parts.is_empty() {
            tracing::warn!("⚠️ No supplier part numbers extracted from the BOM");
        } else {
            tracing::info!("🔧 Searching {} supplier part number(s)", parts.len());
        }

        let report = fetch_all(
            &self.search,
            &parts,
            &self.retry,
            self.config.skip_duplicates(),
        )
        .await;

        let rows = price_rows(
            &bom,
            &report.results,
            self.config.quantities(),
            self.config.price_format(),
            self.config.exclude_invalid_urls(),
        );

        Ok(PricedBom {
            headers: bom.headers,
            rows,
            report,
        })
    }

    async fn load(&self, priced: PricedBom) -> Result<String> {
        // 先寫原始結果，TSV 失敗時仍保有 API 回應
        let json = priced.report.results.to_json_pretty()?;
        self.storage.write_file(RESULTS_FILE, &json).await?;
        tracing::info!(
            "💾 Results successfully saved to {}",
            self.storage.location(RESULTS_FILE)
        );

        let tsv = write_priced_tsv(&priced.headers, &priced.rows, self.config.quantities())?;
        self.storage.write_file(PRICED_BOM_FILE, &tsv).await?;
        tracing::info!(
            "💾 Updated BOM with prices saved to {}",
            self.storage.location(PRICED_BOM_FILE)
        );

        Ok(self.storage.location(""))
    }
}
