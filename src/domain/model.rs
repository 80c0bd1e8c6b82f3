use crate::utils::error::Result;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Supplier part number taken from the last path segment of a product URL.
/// Opaque and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartIdentifier(String);

impl PartIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A (minimum order quantity, unit price) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreak {
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl PriceBreak {
    pub fn new(quantity: u32, unit_price: Decimal) -> Self {
        Self {
            quantity,
            unit_price,
        }
    }
}

/// How the supplier formats price strings, e.g. `"kr 1,23"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFormat {
    pub currency_prefix: String,
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            currency_prefix: "kr ".to_string(),
            decimal_separator: ',',
            grouping_separator: None,
        }
    }
}

/// Raw search response for one part, kept verbatim for the JSON dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartSearchResult(serde_json::Value);

impl PartSearchResult {
    pub fn new(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }

    /// Matched parts under `SearchResults.Parts`; empty when nothing matched.
    pub fn parts(&self) -> &[serde_json::Value] {
        self.0
            .get("SearchResults")
            .and_then(|sr| sr.get("Parts"))
            .and_then(|p| p.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `PriceBreaks` entries of the first matched part.
    pub fn first_part_price_breaks(&self) -> Option<&[serde_json::Value]> {
        let part = self.parts().first()?;
        Some(
            part.get("PriceBreaks")
                .and_then(|pb| pb.as_array())
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        )
    }
}

/// Outcome of a single search attempt that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(PartSearchResult),
    /// Empty answer; presumed to be the supplier throttling us.
    RateLimited,
}

/// All successful search results of a run, keyed by part number.
///
/// Keys keep the order in which parts were first fetched; refetching a part
/// replaces its result in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    entries: Vec<(PartIdentifier, PartSearchResult)>,
    index: HashMap<PartIdentifier, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, part: PartIdentifier, result: PartSearchResult) {
        match self.index.get(&part) {
            Some(&i) => self.entries[i].1 = result,
            None => {
                self.index.insert(part.clone(), self.entries.len());
                self.entries.push((part, result));
            }
        }
    }

    pub fn get(&self, part: &PartIdentifier) -> Option<&PartSearchResult> {
        self.index.get(part).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, part: &PartIdentifier) -> bool {
        self.index.contains_key(part)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PartIdentifier> {
        self.entries.iter().map(|(part, _)| part)
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }

    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl FromIterator<(PartIdentifier, PartSearchResult)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (PartIdentifier, PartSearchResult)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (part, result) in iter {
            results.insert(part, result);
        }
        results
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (part, result) in &self.entries {
            map.serialize_entry(part, result)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResultSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // preserve_order 讓 Map 保留檔案中的順序
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(part, result)| (PartIdentifier::new(part), PartSearchResult::new(result)))
            .collect())
    }
}

/// Where a Datasheet cell points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlClass {
    Supplier(PartIdentifier),
    NonSupplier(String),
    Invalid { url: String, reason: String },
    /// Empty cell.
    Missing,
    /// The `~` placeholder KiCad writes for "no datasheet".
    Placeholder,
}

impl UrlClass {
    pub fn part(&self) -> Option<&PartIdentifier> {
        match self {
            UrlClass::Supplier(part) => Some(part),
            _ => None,
        }
    }

    /// Empty cell or `~`; these rows are dropped by `exclude_invalid_urls`.
    pub fn is_missing(&self) -> bool {
        matches!(self, UrlClass::Missing | UrlClass::Placeholder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BomRow {
    pub fields: Vec<String>,
    pub url_class: UrlClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BomTable {
    pub headers: Vec<String>,
    pub rows: Vec<BomRow>,
}

impl BomTable {
    /// Supplier part numbers in row order, duplicates included.
    pub fn supplier_parts(&self) -> Vec<PartIdentifier> {
        self.rows
            .iter()
            .filter_map(|row| row.url_class.part().cloned())
            .collect()
    }

    /// Non-supplier links in row order. `~` placeholders are listed as well.
    pub fn non_supplier_urls(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| match &row.url_class {
                UrlClass::NonSupplier(url) => Some(url.as_str()),
                UrlClass::Placeholder => Some("~"),
                _ => None,
            })
            .collect()
    }

    pub fn invalid_urls(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| match &row.url_class {
                UrlClass::Invalid { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedPart {
    pub part: PartIdentifier,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub results: ResultSet,
    pub failed: Vec<FailedPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedRow {
    pub fields: Vec<String>,
    /// One entry per configured quantity; `None` means no price available.
    pub prices: Vec<Option<Decimal>>,
}

#[derive(Debug, Clone)]
pub struct PricedBom {
    pub headers: Vec<String>,
    pub rows: Vec<PricedRow>,
    pub report: FetchReport,
}
