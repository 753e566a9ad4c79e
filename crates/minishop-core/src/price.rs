//! Price display.
//!
//! Prices are shown as whole units: any fractional part is truncated, and
//! thousands are grouped with a no-break space (`1 500 ₽`).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const GROUP_SEPARATOR: char = '\u{a0}';

/// Formats `amount` as a grouped whole number, truncating toward zero.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let whole = amount.trunc().to_i128().unwrap_or(0);
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Currency suffix applied to every rendered amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormat {
    pub symbol: String,
}

impl PriceFormat {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    #[must_use]
    pub fn label(&self, amount: Decimal) -> String {
        let number = format_amount(amount);
        if self.symbol.is_empty() {
            number
        } else {
            format!("{number} {}", self.symbol)
        }
    }
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self::new("₽")
    }
}
