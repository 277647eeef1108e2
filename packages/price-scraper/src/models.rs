use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque product key. Rows may use integer or text (uuid) ids; the incoming
/// JSON shape is preserved on the way back out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Int(id) => write!(f, "{}", id),
            ProductId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId::Int(id)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        ProductId::Int(i64::from(id))
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

/// A row of the `products` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link: Some(link.into()),
            price: None,
            updated_at: None,
        }
    }

    /// The source URL, if the row has a non-blank one.
    pub fn source_url(&self) -> Option<&str> {
        self.link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}

/// A price that passed a plausibility check.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Inclusive range a candidate must fall within to be accepted as a price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibilityBand {
    pub min: f64,
    pub max: f64,
}

impl PlausibilityBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value > 0.0 && (self.min..=self.max).contains(&value)
    }

    pub fn check(&self, value: f64) -> Option<Price> {
        self.contains(value).then_some(Price(value))
    }
}
