//! Sequential, rate-limit aware fetch loop.
//!
//! Parts are searched one at a time. An empty answer is taken as the supplier
//! throttling us: the same part is retried after the backoff delay until it
//! succeeds, fails hard, or the retry budget runs out.

use crate::domain::model::{
    FailedPart, FetchReport, PartIdentifier, PartSearchResult, SearchOutcome,
};
use crate::domain::ports::{Backoff, PartSearch};
use crate::utils::error::{PricerError, Result};
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_RETRIES: u32 = 40;

/// Same delay before every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff(pub Duration);

impl Default for FixedBackoff {
    fn default() -> Self {
        Self(DEFAULT_RETRY_DELAY)
    }
}

impl Backoff for FixedBackoff {
    fn delay(&self, _retry: u32) -> Duration {
        self.0
    }
}

pub struct RetryPolicy<B: Backoff = FixedBackoff> {
    /// `None` retries rate-limited parts forever.
    pub max_retries: Option<u32>,
    pub backoff: B,
}

impl<B: Backoff> RetryPolicy<B> {
    pub fn new(max_retries: Option<u32>, backoff: B) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    fn allows_retry(&self, retries_so_far: u32) -> bool {
        self.max_retries.map_or(true, |max| retries_so_far < max)
    }
}

impl Default for RetryPolicy<FixedBackoff> {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_RETRIES), FixedBackoff::default())
    }
}

/// Search one part, retrying while the supplier answers empty.
pub async fn fetch_part<P, B>(
    client: &P,
    part: &PartIdentifier,
    policy: &RetryPolicy<B>,
) -> Result<PartSearchResult>
where
    P: PartSearch + ?Sized,
    B: Backoff,
{
    let mut retries = 0u32;
    loop {
        tracing::info!("🔍 Searching for part number: {}", part);
        match client.search(part).await? {
            SearchOutcome::Found(result) => return Ok(result),
            SearchOutcome::RateLimited => {
                if !policy.allows_retry(retries) {
                    return Err(PricerError::RetriesExhausted {
                        part: part.to_string(),
                        attempts: retries + 1,
                    });
                }
                retries += 1;
                let wait = policy.backoff.delay(retries);
                tracing::warn!(
                    "⏳ Rate limit reached. Waiting for {:?} before retrying '{}' (retry {})",
                    wait,
                    part,
                    retries
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Fetch every part in order. Hard failures and exhausted retries land in
/// `FetchReport::failed`; everything else in `FetchReport::results`.
pub async fn fetch_all<P, B>(
    client: &P,
    parts: &[PartIdentifier],
    policy: &RetryPolicy<B>,
    skip_duplicates: bool,
) -> FetchReport
where
    P: PartSearch + ?Sized,
    B: Backoff,
{
    let mut report = FetchReport::default();
    let mut seen: HashSet<&PartIdentifier> = HashSet::new();

    for (index, part) in parts.iter().enumerate() {
        if !seen.insert(part) && skip_duplicates {
            tracing::debug!("Skipping duplicate part number: {}", part);
            continue;
        }
        tracing::debug!("Part {}/{}: {}", index + 1, parts.len(), part);

        match fetch_part(client, part, policy).await {
            Ok(result) => {
                report.results.insert(part.clone(), result);
            }
            Err(e) => {
                tracing::error!("❌ Error searching for part number '{}': {}", part, e);
                report.failed.push(FailedPart {
                    part: part.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if !report.failed.is_empty() {
        tracing::warn!(
            "The following part numbers caused errors during API search: {}",
            report
                .failed
                .iter()
                .map(|f| f.part.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    tracing::info!(
        "📊 Fetched {} part(s), {} failed",
        report.results.len(),
        report.failed.len()
    );
    report
}
