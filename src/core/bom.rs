use crate::core::parts::classify_url;
use crate::core::pricing::{format_price, resolve_prices};
use crate::domain::model::{BomRow, BomTable, PriceFormat, PricedRow, ResultSet};
use crate::utils::error::{PricerError, Result};
use std::borrow::Cow;

pub const DATASHEET_COLUMN: &str = "Datasheet";
pub const DEFAULT_QUANTITIES: [u32; 4] = [1, 10, 100, 1000];

pub fn price_column_name(quantity: u32) -> String {
    format!("Price for {}", quantity)
}

/// Cells that are not valid UTF-8 (e.g. a Latin-1 `µ`) are decoded lossily.
fn decode_record(record: &csv::ByteRecord) -> (Vec<String>, bool) {
    let mut lossy = false;
    let fields = record
        .iter()
        .map(|field| {
            let text = String::from_utf8_lossy(field);
            lossy |= matches!(text, Cow::Owned(_));
            text.into_owned()
        })
        .collect();
    (fields, lossy)
}

/// Read a comma separated BOM and classify every Datasheet cell.
///
/// A malformed row is logged and skipped; it never aborts the read.
pub fn read_bom(data: &[u8], supplier_domain: &str) -> Result<BomTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let (headers, lossy) = decode_record(reader.byte_headers()?);
    if lossy {
        tracing::warn!("⚠️ BOM header contains non UTF-8 bytes, decoded lossily");
    }
    let datasheet_index = headers.iter().position(|h| h.trim() == DATASHEET_COLUMN);
    if datasheet_index.is_none() {
        tracing::error!(
            "❌ The CSV file does not have a '{}' column, no parts will be priced",
            DATASHEET_COLUMN
        );
    }

    let mut rows = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("⚠️ Skipping unreadable BOM row {}: {}", index + 1, e);
                continue;
            }
        };
        let (mut fields, lossy) = decode_record(&record);
        if lossy {
            // 非 UTF-8 內容以替代字元保留
            tracing::warn!(
                "⚠️ BOM row {} contains non UTF-8 bytes, decoded lossily",
                index + 1
            );
        }
        if fields.len() < headers.len() {
            fields.resize(headers.len(), String::new());
        }

        let cell = datasheet_index
            .and_then(|i| fields.get(i))
            .map(String::as_str)
            .unwrap_or_default();
        let url_class = classify_url(cell, supplier_domain);

        rows.push(BomRow { fields, url_class });
    }

    tracing::debug!("Read {} BOM rows with {} columns", rows.len(), headers.len());
    Ok(BomTable { headers, rows })
}

/// Attach prices to every BOM row. Rows whose price table cannot be parsed
/// get empty prices instead of failing the run.
pub fn price_rows(
    bom: &BomTable,
    results: &ResultSet,
    quantities: &[u32],
    format: &PriceFormat,
    exclude_invalid_urls: bool,
) -> Vec<PricedRow> {
    bom.rows
        .iter()
        .filter(|row| !(exclude_invalid_urls && row.url_class.is_missing()))
        .map(|row| {
            let prices = match row.url_class.part().and_then(|part| results.get(part)) {
                Some(result) => resolve_prices(result, quantities, format).unwrap_or_else(|e| {
                    tracing::warn!(
                        "⚠️ No price for '{}': {}",
                        row.url_class.part().map(|p| p.as_str()).unwrap_or_default(),
                        e
                    );
                    vec![None; quantities.len()]
                }),
                None => vec![None; quantities.len()],
            };

            PricedRow {
                fields: row.fields.clone(),
                prices,
            }
        })
        .collect()
}

/// Serialize the priced BOM as tab separated values with one price column per
/// quantity appended.
pub fn write_priced_tsv(
    headers: &[String],
    rows: &[PricedRow],
    quantities: &[u32],
) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(Vec::new());

    let mut header_row: Vec<String> = headers.to_vec();
    header_row.extend(quantities.iter().map(|q| price_column_name(*q)));
    writer.write_record(&header_row)?;

    for row in rows {
        let mut record = row.fields.clone();
        record.extend(
            row.prices
                .iter()
                .map(|price| price.map(format_price).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| PricerError::IoError(e.into_error()))
}
