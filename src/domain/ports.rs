use crate::domain::model::{
    BomTable, PartIdentifier, PriceFormat, PricedBom, SearchOutcome,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human readable location of `path`; the storage root when empty.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn supplier_domain(&self) -> &str;
    fn quantities(&self) -> &[u32];
    fn price_format(&self) -> &PriceFormat;
    fn exclude_invalid_urls(&self) -> bool;
    fn skip_duplicates(&self) -> bool;
}

/// One search request against the supplier. `Err` is a hard failure.
#[async_trait]
pub trait PartSearch: Send + Sync {
    async fn search(&self, part: &PartIdentifier) -> Result<SearchOutcome>;
}

/// Delay before retry number `retry` (1-based) of the same part.
pub trait Backoff: Send + Sync {
    fn delay(&self, retry: u32) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<BomTable>;
    async fn transform(&self, bom: BomTable) -> Result<PricedBom>;
    async fn load(&self, priced: PricedBom) -> Result<String>;
}
