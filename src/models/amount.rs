use std::fmt;

use rust_decimal::Decimal;

use super::{Commodity, CommodityRef};
use crate::error::{Error, Result};

/// A quantity of exactly one commodity.
#[derive(Debug, Clone)]
pub struct Amount {
    quantity: Decimal,
    commodity: CommodityRef,
    /// Per-unit price annotation (`10 AAPL @ $150`), if the source recorded one.
    price: Option<Box<Amount>>,
}

impl Amount {
    pub fn new(quantity: Decimal, commodity: CommodityRef) -> Self {
        Self {
            quantity,
            commodity,
            price: None,
        }
    }

    pub fn zero(commodity: CommodityRef) -> Self {
        Self::new(Decimal::ZERO, commodity)
    }

    pub fn with_price(mut self, per_unit: Amount) -> Self {
        self.price = Some(Box::new(per_unit.without_price()));
        self
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn commodity(&self) -> &CommodityRef {
        &self.commodity
    }

    pub fn symbol(&self) -> &str {
        self.commodity.symbol()
    }

    pub fn price(&self) -> Option<&Amount> {
        self.price.as_deref()
    }

    pub fn is_zero(&self) -> bool {
        self.quantity.is_zero()
    }

    pub fn abs(&self) -> Amount {
        Amount::new(self.quantity.abs(), self.commodity.clone())
    }

    /// Same quantity in a (possibly) different commodity, without annotation.
    pub fn retyped(&self, commodity: CommodityRef) -> Amount {
        Amount::new(self.quantity, commodity)
    }

    fn without_price(mut self) -> Amount {
        self.price = None;
        self
    }

    pub fn is_in(&self, commodity: &Commodity) -> bool {
        self.commodity.as_ref() == commodity
    }

    /// Adds two amounts of the same commodity. Price annotations are dropped.
    pub fn checked_add(&self, other: &Amount) -> Result<Amount> {
        if self.commodity != other.commodity {
            return Err(Error::CommodityMismatch {
                left: self.symbol().to_string(),
                right: other.symbol().to_string(),
            });
        }
        Ok(Amount::new(
            self.quantity + other.quantity,
            self.commodity.clone(),
        ))
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.commodity == other.commodity && self.quantity == other.quantity
    }
}

impl Eq for Amount {}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity.normalize(), self.commodity.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn usd() -> CommodityRef {
        Commodity::new("USD").with_precision(2).into_ref()
    }

    #[test]
    fn add_same_commodity() {
        let a = Amount::new(Decimal::new(1050, 2), usd());
        let b = Amount::new(Decimal::new(-50, 2), usd());
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.quantity(), Decimal::from(10));
        assert_eq!(sum.symbol(), "USD");
    }

    #[test]
    fn add_mismatched_commodities_fails() {
        let a = Amount::new(Decimal::ONE, usd());
        let b = Amount::new(Decimal::ONE, Commodity::new("EUR").into_ref());
        let err = a.checked_add(&b).unwrap_err();
        assert!(matches!(err, Error::CommodityMismatch { .. }));
    }

    #[test]
    fn sums_drop_price_annotation() {
        let aapl = Commodity::new("AAPL").into_ref();
        let a = Amount::new(Decimal::from(10), aapl.clone())
            .with_price(Amount::new(Decimal::from(150), usd()));
        assert!(a.price().is_some());
        let sum = a.checked_add(&Amount::zero(aapl)).unwrap();
        assert!(sum.price().is_none());
    }
}
