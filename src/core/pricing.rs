//! Tiered price lookup.
//!
//! Suppliers publish unit prices only at a handful of minimum order
//! quantities. [`price_for_quantity`] maps an arbitrary quantity onto that
//! sparse table by greedy decomposition, largest tier first.

use crate::domain::model::{PartSearchResult, PriceBreak, PriceFormat};
use crate::utils::error::{PricerError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Parse a supplier price string such as `"kr 1,23"` into a decimal.
pub fn parse_price(raw: &str, format: &PriceFormat) -> Result<Decimal> {
    let without_prefix = if format.currency_prefix.is_empty() {
        raw.to_string()
    } else {
        raw.replace(format.currency_prefix.as_str(), "")
    };

    let normalized: String = without_prefix
        .chars()
        .filter(|c| !c.is_whitespace() && Some(*c) != format.grouping_separator)
        .map(|c| if c == format.decimal_separator { '.' } else { c })
        .collect();

    let price = Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|e| PricerError::PriceParseError {
            raw: raw.to_string(),
            reason: e.to_string(),
        })?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(PricerError::PriceParseError {
            raw: raw.to_string(),
            reason: "negative price".to_string(),
        });
    }
    Ok(price)
}

/// Build a [`PriceBreak`] from one `{"Quantity": .., "Price": ..}` entry.
/// Both fields may be JSON strings or numbers.
pub fn price_break_from_json(
    entry: &serde_json::Value,
    format: &PriceFormat,
) -> Result<PriceBreak> {
    let quantity = match entry.get("Quantity") {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .and_then(|q| u32::try_from(q).ok())
    .filter(|q| *q > 0)
    .ok_or_else(|| PricerError::ProcessingError {
        message: format!("price break without a positive Quantity: {}", entry),
    })?;

    let unit_price = match entry.get("Price") {
        Some(serde_json::Value::String(s)) => parse_price(s, format)?,
        Some(serde_json::Value::Number(n)) => {
            let plain = PriceFormat {
                currency_prefix: String::new(),
                decimal_separator: '.',
                grouping_separator: None,
            };
            parse_price(&n.to_string(), &plain)?
        }
        _ => {
            return Err(PricerError::PriceParseError {
                raw: entry.to_string(),
                reason: "missing Price".to_string(),
            })
        }
    };

    Ok(PriceBreak::new(quantity, unit_price))
}

/// Price breaks of the first matched part, or `None` when nothing matched.
pub fn part_price_breaks(
    result: &PartSearchResult,
    format: &PriceFormat,
) -> Result<Option<Vec<PriceBreak>>> {
    let Some(entries) = result.first_part_price_breaks() else {
        return Ok(None);
    };

    let breaks = entries
        .iter()
        .map(|entry| price_break_from_json(entry, format))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(breaks))
}

/// Price for `target` units.
///
/// An exact tier match returns that tier's unit price as-is. Otherwise the
/// quantity is covered greedily with whole multiples of each tier, largest
/// first. When nothing fits, the smallest tier's price times
/// `target / smallest_quantity` is returned, which is zero for quantities
/// below the smallest tier. Returns `None` for an empty table or when the
/// total does not fit in a `Decimal`.
pub fn price_for_quantity(breaks: &[PriceBreak], target: u32) -> Option<Decimal> {
    // 同一數量重複出現時以最後一筆為準
    let table: BTreeMap<u32, Decimal> = breaks
        .iter()
        .filter(|b| b.quantity > 0)
        .map(|b| (b.quantity, b.unit_price))
        .collect();

    let (&smallest_quantity, &smallest_price) = table.iter().next()?;

    if let Some(price) = table.get(&target) {
        return Some(*price);
    }

    let mut total = Decimal::ZERO;
    let mut remaining = target;
    for (&quantity, &price) in table.iter().rev() {
        if quantity <= remaining {
            let units = remaining / quantity;
            total = total.checked_add(Decimal::from(units).checked_mul(price)?)?;
            remaining %= quantity;
        }
    }

    if total > Decimal::ZERO {
        Some(total)
    } else {
        smallest_price.checked_mul(Decimal::from(target / smallest_quantity))
    }
}

/// Prices of one search result at each of `quantities`.
pub fn resolve_prices(
    result: &PartSearchResult,
    quantities: &[u32],
    format: &PriceFormat,
) -> Result<Vec<Option<Decimal>>> {
    let Some(breaks) = part_price_breaks(result, format)? else {
        return Ok(vec![None; quantities.len()]);
    };

    Ok(quantities
        .iter()
        .map(|q| price_for_quantity(&breaks, *q))
        .collect())
}

/// Two decimals, the way prices appear in the output BOM.
pub fn format_price(price: Decimal) -> String {
    format!("{:.2}", price.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn tiers() -> Vec<PriceBreak> {
        vec![
            PriceBreak::new(1, dec!(10.0)),
            PriceBreak::new(10, dec!(8.0)),
            PriceBreak::new(100, dec!(6.0)),
        ]
    }

    #[test]
    fn test_exact_tier_returns_unit_price() {
        assert_eq!(price_for_quantity(&tiers(), 10), Some(dec!(8.0)));
        assert_eq!(price_for_quantity(&tiers(), 1), Some(dec!(10.0)));
    }

    #[test]
    fn test_greedy_decomposition() {
        // 2 x 10 @ 8.0 + 5 x 1 @ 10.0
        assert_eq!(price_for_quantity(&tiers(), 25), Some(dec!(66.0)));
        // 2 x 100 @ 6.0 + 5 x 10 @ 8.0
        assert_eq!(price_for_quantity(&tiers(), 250), Some(dec!(52.0)));
    }

    #[test]
    fn test_unsorted_breaks_are_handled() {
        let mut breaks = tiers();
        breaks.reverse();
        assert_eq!(price_for_quantity(&breaks, 25), Some(dec!(66.0)));
    }

    #[test]
    fn test_below_smallest_tier_is_zero() {
        let breaks = vec![PriceBreak::new(100, dec!(5.0))];
        assert_eq!(price_for_quantity(&breaks, 50), Some(Decimal::ZERO));
    }

    #[test]
    fn test_remainder_below_smallest_tier_is_dropped() {
        let breaks = vec![PriceBreak::new(10, dec!(2.0)), PriceBreak::new(100, dec!(1.5))];
        // 1 x 100 + 1 x 10, the remaining 5 cannot be bought
        assert_eq!(price_for_quantity(&breaks, 115), Some(dec!(3.5)));
    }

    #[test]
    fn test_overflowing_total_has_no_price() {
        let breaks = vec![PriceBreak::new(1, Decimal::MAX), PriceBreak::new(10, Decimal::MAX)];
        // 2 x 10 @ MAX
        assert_eq!(price_for_quantity(&breaks, 20), None);
        // 1 x 10 @ MAX + 1 x 1 @ MAX
        assert_eq!(price_for_quantity(&breaks, 11), None);
        assert_eq!(price_for_quantity(&breaks, 10), Some(Decimal::MAX));
    }

    #[test]
    fn test_empty_breaks_have_no_price() {
        assert_eq!(price_for_quantity(&[], 10), None);
    }

    #[test]
    fn test_parse_price_default_format() {
        let format = PriceFormat::default();
        assert_eq!(parse_price("kr 1,23", &format).unwrap(), dec!(1.23));
        assert_eq!(parse_price("kr 0,456", &format).unwrap(), dec!(0.456));
        assert_eq!(parse_price("12", &format).unwrap(), dec!(12));
    }

    #[test]
    fn test_parse_price_with_grouping_separator() {
        let format = PriceFormat {
            currency_prefix: "$".to_string(),
            decimal_separator: '.',
            grouping_separator: Some(','),
        };
        assert_eq!(parse_price("$1,234.50", &format).unwrap(), dec!(1234.50));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        let format = PriceFormat::default();
        assert!(matches!(
            parse_price("kr n/a", &format),
            Err(PricerError::PriceParseError { .. })
        ));
        assert!(parse_price("", &format).is_err());
        assert!(parse_price("kr -1,00", &format).is_err());
    }

    #[test]
    fn test_price_break_from_json_accepts_strings_and_numbers() {
        let format = PriceFormat::default();
        let a = price_break_from_json(&json!({"Quantity": 10, "Price": "kr 8,00"}), &format)
            .unwrap();
        assert_eq!(a, PriceBreak::new(10, dec!(8.00)));

        let b = price_break_from_json(&json!({"Quantity": "100", "Price": 6.5}), &format).unwrap();
        assert_eq!(b, PriceBreak::new(100, dec!(6.5)));

        let zero = json!({"Quantity": 0, "Price": "kr 1,00"});
        assert!(price_break_from_json(&zero, &format).is_err());
    }

    #[test]
    fn test_resolve_prices_for_first_part() {
        let result = PartSearchResult::new(json!({
            "SearchResults": {"Parts": [
                {"PriceBreaks": [
                    {"Quantity": 1, "Price": "kr 10,00"},
                    {"Quantity": 10, "Price": "kr 8,00"},
                    {"Quantity": 100, "Price": "kr 6,00"}
                ]},
                {"PriceBreaks": [{"Quantity": 1, "Price": "kr 99,00"}]}
            ]}
        }));

        let prices = resolve_prices(&result, &[1, 10, 25], &PriceFormat::default()).unwrap();
        assert_eq!(prices, vec![Some(dec!(10)), Some(dec!(8)), Some(dec!(66))]);
    }

    #[test]
    fn test_resolve_prices_without_match() {
        let result = PartSearchResult::new(json!({"SearchResults": {"Parts": []}}));
        let prices = resolve_prices(&result, &[1, 10], &PriceFormat::default()).unwrap();
        assert_eq!(prices, vec![None, None]);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(66)), "66.00");
        assert_eq!(format_price(dec!(0.456)), "0.46");
        assert_eq!(format_price(Decimal::ZERO), "0.00");
    }
}
