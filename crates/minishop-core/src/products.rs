use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Identity of a catalog item.
///
/// Sheets hand ids back as numbers in one place and as strings in another,
/// so any text id that parses as an integer is canonicalized to [`ProductId::Int`].
/// `ProductId::from("7")` and `ProductId::from(7)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ProductId {
    Int(i64),
    Text(String),
}

impl ProductId {
    /// Canonicalizes a text id. Surrounding whitespace is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(trimmed.to_owned()),
        }
    }

    /// Canonicalizes a floating-point id; integral values become [`ProductId::Int`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < 9.0e15 {
            Self::Int(value as i64)
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ProductId {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl FromStr for ProductId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self::Int(n),
            Raw::Float(f) => Self::from_f64(f),
            Raw::Text(s) => Self::parse(&s),
        })
    }
}

/// A catalog item after field-name normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Free-form classification, e.g. `"Eau de Parfum"`.
    pub concentration: String,
    /// Free-form, never parsed into units, e.g. `"50 ml"`.
    pub volume: String,
    /// Whole currency units; never negative.
    pub price: Decimal,
    pub image_url: Option<String>,
}

impl Product {
    /// The `"<concentration> • <volume>"` line shown under the name.
    #[must_use]
    pub fn details(&self) -> String {
        format!("{} • {}", self.concentration, self.volume)
    }

    /// Image reference, or `placeholder` when the product has none.
    #[must_use]
    pub fn image_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.image_url.as_deref().unwrap_or(placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_ids_canonicalize_to_int() {
        assert_eq!(ProductId::from("7"), ProductId::Int(7));
        assert_eq!(ProductId::from(" 7 "), ProductId::from(7));
        assert_eq!(ProductId::from("sku-7"), ProductId::Text("sku-7".into()));
    }

    #[test]
    fn deserializes_numbers_floats_and_strings() {
        let ids: Vec<ProductId> = serde_json::from_str(r#"[3, 4.0, "5", "rose-50"]"#).unwrap();
        assert_eq!(
            ids,
            vec![
                ProductId::Int(3),
                ProductId::Int(4),
                ProductId::Int(5),
                ProductId::Text("rose-50".into())
            ]
        );
    }

    #[test]
    fn serializes_int_as_number_and_text_as_string() {
        let json = serde_json::to_string(&vec![ProductId::Int(3), ProductId::Text("x".into())])
            .unwrap();
        assert_eq!(json, r#"[3,"x"]"#);
    }

    #[test]
    fn details_joins_concentration_and_volume() {
        let product = Product {
            id: ProductId::Int(1),
            name: "Rose".into(),
            concentration: "EDP".into(),
            volume: "50 ml".into(),
            price: Decimal::from(1500),
            image_url: None,
        };
        assert_eq!(product.details(), "EDP • 50 ml");
        assert_eq!(product.image_or("placeholder.png"), "placeholder.png");
    }
}
