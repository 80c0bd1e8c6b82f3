use crate::domain::model::{PartIdentifier, UrlClass};
use url::Url;

pub const DEFAULT_SUPPLIER_DOMAIN: &str = "mouser.com";

pub const PLACEHOLDER_URL: &str = "~";

/// KiCad writes `~` into empty Datasheet fields.
pub fn is_placeholder_url(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed == PLACEHOLDER_URL
}

/// Classify a Datasheet cell. The part number of a supplier URL is its final
/// path segment.
pub fn classify_url(cell: &str, supplier_domain: &str) -> UrlClass {
    let raw = cell.trim();
    if raw.is_empty() {
        return UrlClass::Missing;
    }
    if raw == PLACEHOLDER_URL {
        return UrlClass::Placeholder;
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("⚠️ Error processing URL '{}': {}", raw, e);
            return UrlClass::Invalid {
                url: raw.to_string(),
                reason: e.to_string(),
            };
        }
    };

    let host = url.host_str().unwrap_or_default().to_lowercase();
    if !host.contains(&supplier_domain.to_lowercase()) {
        return UrlClass::NonSupplier(raw.to_string());
    }

    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(str::trim)
        .unwrap_or_default();

    if last_segment.is_empty() {
        tracing::warn!("⚠️ Supplier URL '{}' has no part number", raw);
        return UrlClass::Invalid {
            url: raw.to_string(),
            reason: "no part number in URL path".to_string(),
        };
    }

    UrlClass::Supplier(PartIdentifier::new(last_segment))
}
