use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Where a commodity's symbol is rendered relative to its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPlacement {
    /// `$12.00`
    Prefix,
    /// `12.00 EUR`
    #[default]
    Suffix,
}

/// A unit of value (currency or security), identified by its symbol.
///
/// Commodities are owned by a registry and shared through [`CommodityRef`].
/// Equality and hashing only consider the symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commodity {
    symbol: String,
    #[serde(default)]
    precision: u32,
    #[serde(default)]
    placement: SymbolPlacement,
}

pub type CommodityRef = Arc<Commodity>;

impl Commodity {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            precision: 0,
            placement: SymbolPlacement::Suffix,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_placement(mut self, placement: SymbolPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of decimal places used when displaying quantities.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn placement(&self) -> SymbolPlacement {
        self.placement
    }

    pub fn into_ref(self) -> CommodityRef {
        Arc::new(self)
    }
}

impl PartialEq for Commodity {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Commodity {}

impl Hash for Commodity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbol.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_display_metadata() {
        let a = Commodity::new("USD").with_precision(2);
        let b = Commodity::new("USD").with_placement(SymbolPlacement::Prefix);
        assert_eq!(a, b);
        assert_ne!(a, Commodity::new("EUR"));
    }

    #[test]
    fn placement_deserializes_snake_case() {
        let c: Commodity =
            serde_json::from_str(r#"{"symbol":"$","precision":2,"placement":"prefix"}"#).unwrap();
        assert_eq!(c.placement(), SymbolPlacement::Prefix);
        assert_eq!(c.precision(), 2);
    }
}
