use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct PricingEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> PricingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting BOM pricing run");

        let bom = self.pipeline.extract().await?;
        tracing::info!("📊 Extracted {} BOM rows", bom.rows.len());

        let priced = self.pipeline.transform(bom).await?;
        tracing::info!(
            "📊 Priced {} rows ({} parts found, {} failed)",
            priced.rows.len(),
            priced.report.results.len(),
            priced.report.failed.len()
        );

        let output_path = self.pipeline.load(priced).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
