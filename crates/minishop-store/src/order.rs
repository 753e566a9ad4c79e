//! Order composition and the plain-text summaries handed to the operator.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use minishop_core::{CartEntry, PriceFormat, Product, UserIdentity};
use rust_decimal::Decimal;

use crate::catalog::CatalogStore;
use crate::error::StoreError;

const LINE_SEPARATOR: &str = "-------------------------";

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// A cart snapshot ready for handoff.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Milliseconds since the Unix epoch at composition time.
    pub number: i64,
    pub lines: Vec<OrderLine>,
    pub grand_total: Decimal,
    pub customer: UserIdentity,
}

/// Resolves `entries` against `catalog` into an [`Order`].
///
/// Entries whose product is no longer in the catalog are skipped and do not
/// count toward the total.
///
/// # Errors
///
/// Returns [`StoreError::EmptyCart`] when no entry resolves, including when
/// the cart is empty.
pub fn compose_order(
    entries: &[CartEntry],
    catalog: &CatalogStore,
    customer: &UserIdentity,
    placed_at: DateTime<Utc>,
) -> Result<Order, StoreError> {
    let mut lines = Vec::with_capacity(entries.len());
    let mut grand_total = Decimal::ZERO;
    for entry in entries {
        let Some(product) = catalog.lookup(&entry.id) else {
            tracing::debug!(product_id = %entry.id, "skipping cart entry not in catalog");
            continue;
        };
        let Some((line_total, running)) = accumulate(grand_total, product, entry) else {
            continue;
        };
        grand_total = running;
        lines.push(OrderLine {
            product: product.clone(),
            quantity: entry.quantity,
            line_total,
        });
    }

    if lines.is_empty() {
        return Err(StoreError::EmptyCart);
    }

    Ok(Order {
        number: placed_at.timestamp_millis(),
        lines,
        grand_total,
        customer: customer.clone(),
    })
}

/// Returns the line total for `entry` and `total` with it added, or `None`
/// when either overflows. Overflowing lines are logged and left out.
pub(crate) fn accumulate(
    total: Decimal,
    product: &Product,
    entry: &CartEntry,
) -> Option<(Decimal, Decimal)> {
    let summed = product
        .price
        .checked_mul(Decimal::from(entry.quantity))
        .and_then(|line| total.checked_add(line).map(|running| (line, running)));
    if summed.is_none() {
        tracing::warn!(
            product_id = %entry.id,
            quantity = entry.quantity,
            "line total out of range, skipping cart entry"
        );
    }
    summed
}

impl Order {
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// The text summary sent to the operator.
    #[must_use]
    pub fn render_text(&self, price: &PriceFormat) -> String {
        let mut text = format!("ORDER #{}\n\n", self.number);
        for line in &self.lines {
            // Writing to a String cannot fail.
            let _ = writeln!(
                text,
                "{}\n{}\n{} × {} = {}\n{LINE_SEPARATOR}",
                line.product.name,
                line.product.details(),
                line.quantity,
                price.label(line.product.price),
                price.label(line.line_total),
            );
        }
        let _ = write!(text, "\nTOTAL: {}", price.label(self.grand_total));

        let first_name = self
            .customer
            .first_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown");
        let handle = self
            .customer
            .username
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("hidden");
        let _ = write!(text, "\n\nCustomer: {first_name}\nTelegram: @{handle}");
        text
    }
}

/// Clipboard text for a single product. The link line is included only when
/// `share_origin` is set.
#[must_use]
pub fn product_share_text(
    product: &Product,
    price: &PriceFormat,
    share_origin: Option<&str>,
) -> String {
    let mut text = format!(
        "{}\nConcentration: {}\nVolume: {}\nPrice: {}",
        product.name,
        product.concentration,
        product.volume,
        price.label(product.price)
    );
    if let Some(origin) = share_origin {
        let _ = write!(text, "\nLink: {origin}?product={}", product.id);
    }
    text
}
