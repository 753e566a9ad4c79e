//! Normalization from sheet rows to [`minishop_core::Product`].
//!
//! Column names are whatever the sheet owner typed, so each canonical field is
//! resolved by probing a prioritized list of candidate names
//! ([`FieldCandidates`]). The first candidate holding a truthy value wins:
//! `null`, `false`, `0`, and `""` are skipped. A whitespace-only string is
//! truthy and resolves to an empty field after trimming.

use std::str::FromStr;
use std::sync::LazyLock;

use minishop_core::{CartEntry, Product, ProductId};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::types::RawRecord;

/// Leading decimal literal, matching what a spreadsheet formula engine would
/// accept as the start of a number: `"1500 руб"` → `1500`, `".5"` → `0.5`.
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").expect("leading-number pattern is valid")
});

/// Largest price, in whole currency units, a product can carry. Larger
/// values are clamped so `price * quantity` stays inside [`Decimal`] range.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Candidate column names for every canonical product field, highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct FieldCandidates {
    pub id: &'static [&'static str],
    pub name: &'static [&'static str],
    pub concentration: &'static [&'static str],
    pub volume: &'static [&'static str],
    pub price: &'static [&'static str],
    pub image: &'static [&'static str],
}

/// Column names seen across the storefront's sheets (English and Russian headers).
pub const DEFAULT_CANDIDATES: FieldCandidates = FieldCandidates {
    id: &["id", "ID", "Id"],
    name: &["name", "Название", "название", "Название товара", "title"],
    concentration: &["concentration", "Концентрация", "концентрация"],
    volume: &["volume", "Объем", "объем", "Объём"],
    price: &["price", "Цена", "цена"],
    image: &["image_url", "Картинка", "Изображение", "image"],
};

/// Normalizes rows with [`DEFAULT_CANDIDATES`].
///
/// Output has the same length and order as `records`; no row is dropped.
#[must_use]
pub fn normalize_products(records: &[RawRecord]) -> Vec<Product> {
    normalize_products_with(records, &DEFAULT_CANDIDATES)
}

/// Normalizes rows with a caller-supplied candidate table.
#[must_use]
pub fn normalize_products_with(records: &[RawRecord], candidates: &FieldCandidates) -> Vec<Product> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| normalize_record(record, idx, candidates))
        .collect()
}

/// Normalizes a single row. `position` is its 0-based index in the sheet and
/// is used to synthesize a 1-based id when the row has none.
#[must_use]
pub fn normalize_record(record: &RawRecord, position: usize, candidates: &FieldCandidates) -> Product {
    let id = probe(record, candidates.id)
        .and_then(product_id_of)
        .unwrap_or_else(|| {
            let synthesized = i64::try_from(position + 1).unwrap_or(i64::MAX);
            tracing::debug!(position, synthesized, "sheet row has no id, using position");
            ProductId::Int(synthesized)
        });

    Product {
        id,
        name: probe_text(record, candidates.name).unwrap_or_default(),
        concentration: probe_text(record, candidates.concentration).unwrap_or_default(),
        volume: probe_text(record, candidates.volume).unwrap_or_default(),
        price: coerce_price(probe(record, candidates.price)),
        image_url: probe_text(record, candidates.image).filter(|s| !s.trim().is_empty()),
    }
}

/// Coerces a raw price cell to a non-negative number.
///
/// Anything that does not start with a number, and any negative amount,
/// becomes `0`. Amounts above [`MAX_PRICE`] are clamped to it. This never
/// fails.
#[must_use]
pub fn coerce_price(value: Option<&Value>) -> Decimal {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Some(Value::String(s)) => parse_leading_number(s),
        _ => None,
    };
    parsed
        .filter(|p| p.is_sign_positive())
        .map_or(Decimal::ZERO, |p| p.min(Decimal::from(MAX_PRICE)))
}

/// Parses the leading decimal literal of `raw`, ignoring any trailing text.
#[must_use]
pub fn parse_leading_number(raw: &str) -> Option<Decimal> {
    let captures = LEADING_NUMBER.captures(raw)?;
    let literal = captures
        .get(1)?
        .as_str()
        .trim_start_matches('+')
        .trim_end_matches('.');
    Decimal::from_str(literal).ok()
}

/// Parses the rows of the `Carts` sheet, skipping rows without a usable id or
/// with a quantity below 1.
#[must_use]
pub fn cart_entries_from_records(records: &[RawRecord]) -> Vec<CartEntry> {
    records
        .iter()
        .filter_map(|record| {
            let id = record.get("id").filter(|v| is_truthy(v)).and_then(product_id_of);
            let quantity = record.get("quantity").and_then(quantity_of);
            match (id, quantity) {
                (Some(id), Some(quantity)) => Some(CartEntry { id, quantity }),
                _ => {
                    tracing::debug!(?record, "skipping unusable cart row");
                    None
                }
            }
        })
        .collect()
}

/// Returns the first candidate value that is truthy.
fn probe<'a>(record: &'a RawRecord, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|v| is_truthy(v))
}

fn probe_text(record: &RawRecord, names: &[&str]) -> Option<String> {
    probe(record, names).map(text_of)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    }
}

fn product_id_of(value: &Value) -> Option<ProductId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(ProductId::Int)
            .or_else(|| n.as_f64().map(ProductId::from_f64)),
        Value::String(s) if !s.trim().is_empty() => Some(ProductId::parse(s)),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => {
            Some(ProductId::Text(value.to_string()))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantity_of(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(raw).ok().filter(|q| *q >= 1)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
