use chrono::NaiveDate;
use tracing::debug;

use super::{CommodityRegistry, ValuationGap};
use crate::models::{Amount, Balance, CommodityRef};

/// Result of valuing a balance: the converted total plus any components that
/// could not be converted.
#[derive(Debug, Clone)]
pub struct Valuation {
    pub value: Amount,
    pub gaps: Vec<ValuationGap>,
}

/// Converts amounts and balances into a single display commodity.
#[derive(Clone, Copy)]
pub struct Valuator<'a> {
    registry: &'a dyn CommodityRegistry,
}

impl<'a> Valuator<'a> {
    pub fn new(registry: &'a dyn CommodityRegistry) -> Self {
        Self { registry }
    }

    /// Value of `amount` in `target` as of `date` (latest price when `None`).
    ///
    /// Returns `None` when no price connects the two commodities or the
    /// converted quantity overflows.
    pub fn value_in(
        &self,
        amount: &Amount,
        target: &CommodityRef,
        date: Option<NaiveDate>,
    ) -> Option<Amount> {
        if amount.is_in(target) {
            return Some(amount.retyped(target.clone()));
        }
        if amount.is_zero() {
            return Some(Amount::zero(target.clone()));
        }
        let price = self.registry.price(amount.commodity(), target, date)?;
        let quantity = amount.quantity().checked_mul(price.rate)?;
        Some(Amount::new(quantity, target.clone()))
    }

    /// Like [`Self::value_in`], but when no price is known and the amount
    /// carries a price annotation, registers that annotation and retries once.
    pub fn value_with_annotation(
        &self,
        amount: &Amount,
        target: &CommodityRef,
        date: NaiveDate,
    ) -> Option<Amount> {
        if let Some(value) = self.value_in(amount, target, Some(date)) {
            return Some(value);
        }
        let annotation = amount.price()?;
        debug!(
            commodity = %amount.symbol(),
            target = %target.symbol(),
            %date,
            "no price known, falling back to annotated price"
        );
        self.registry
            .register_price(amount.commodity(), annotation, date);
        self.value_in(amount, target, Some(date))
    }

    /// Sums every convertible component of `balance` in `target`.
    ///
    /// Components without a price, or whose value overflows the total,
    /// contribute nothing and are listed as gaps.
    /// An empty or unconvertible balance values to zero in `target`.
    pub fn valuation(
        &self,
        balance: &Balance,
        target: &CommodityRef,
        date: Option<NaiveDate>,
    ) -> Valuation {
        let mut total = Amount::zero(target.clone());
        let mut gaps = Vec::new();

        for component in balance.amounts() {
            let sum = self
                .value_in(component, target, date)
                .and_then(|value| total.quantity().checked_add(value.quantity()));
            match sum {
                Some(quantity) => total = Amount::new(quantity, target.clone()),
                None => gaps.push(ValuationGap {
                    date,
                    commodity: component.symbol().to_string(),
                    target: target.symbol().to_string(),
                }),
            }
        }

        Valuation { value: total, gaps }
    }

    /// Zero-fallback valuation of `balance`; gaps are dropped silently.
    pub fn value_of(
        &self,
        balance: &Balance,
        target: &CommodityRef,
        date: Option<NaiveDate>,
    ) -> Amount {
        self.valuation(balance, target, date).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{MemoryCommodityRegistry, PricePoint};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registry_with_eur_rate() -> MemoryCommodityRegistry {
        let registry = MemoryCommodityRegistry::new();
        registry.find_or_create("USD");
        registry.find_or_create("EUR");
        registry.find_or_create("XAU");
        registry.put_price(PricePoint {
            commodity: "EUR".to_string(),
            target: "USD".to_string(),
            date: date(2024, 1, 1),
            rate: Decimal::new(11, 1),
        });
        registry
    }

    #[test]
    fn value_in_same_commodity_is_identity() {
        let registry = registry_with_eur_rate();
        let usd = registry.find("USD").unwrap();
        let valuator = Valuator::new(&registry);
        let amount = Amount::new(Decimal::from(5), usd.clone());
        assert_eq!(valuator.value_in(&amount, &usd, None), Some(amount));
    }

    #[test]
    fn balance_with_unconvertible_component_values_convertible_part_only() {
        let registry = registry_with_eur_rate();
        let usd = registry.find("USD").unwrap();
        let eur = registry.find("EUR").unwrap();
        let gold = registry.find("XAU").unwrap();
        let valuator = Valuator::new(&registry);

        let mut balance = Balance::new();
        balance += &Amount::new(Decimal::from(10), eur);
        balance += &Amount::new(Decimal::from(3), gold);

        let valuation = valuator.valuation(&balance, &usd, Some(date(2024, 2, 1)));
        assert_eq!(valuation.value, Amount::new(Decimal::from(11), usd.clone()));
        assert_eq!(valuation.gaps.len(), 1);
        assert_eq!(valuation.gaps[0].commodity, "XAU");
        assert_eq!(
            valuator.value_of(&balance, &usd, Some(date(2024, 2, 1))),
            Amount::new(Decimal::from(11), usd)
        );
    }

    #[test]
    fn empty_balance_values_to_zero() {
        let registry = registry_with_eur_rate();
        let usd = registry.find("USD").unwrap();
        let value = Valuator::new(&registry).value_of(&Balance::new(), &usd, None);
        assert!(value.is_zero());
        assert_eq!(value.symbol(), "USD");
    }

    #[test]
    fn overflowing_conversion_is_a_gap() {
        let registry = registry_with_eur_rate();
        let usd = registry.find("USD").unwrap();
        let eur = registry.find("EUR").unwrap();
        let valuator = Valuator::new(&registry);

        let huge = Amount::new(Decimal::MAX, eur.clone());
        assert!(valuator.value_in(&huge, &usd, None).is_none());

        let mut balance = Balance::new();
        balance += &Amount::new(Decimal::MAX, usd.clone());
        balance += &Amount::new(Decimal::from(10), eur);
        // EUR is summed first; adding the USD component would overflow.
        let valuation = valuator.valuation(&balance, &usd, None);
        assert_eq!(valuation.value, Amount::new(Decimal::from(11), usd));
        assert_eq!(valuation.gaps.len(), 1);
        assert_eq!(valuation.gaps[0].commodity, "USD");
    }

    #[test]
    fn annotation_fallback_registers_price_then_converts() {
        let registry = registry_with_eur_rate();
        let usd = registry.find("USD").unwrap();
        let aapl = registry.find_or_create("AAPL");
        let valuator = Valuator::new(&registry);

        let plain = Amount::new(Decimal::from(2), aapl.clone());
        assert!(valuator
            .value_with_annotation(&plain, &usd, date(2024, 5, 1))
            .is_none());

        let annotated = plain.clone().with_price(Amount::new(Decimal::from(150), usd.clone()));
        let value = valuator
            .value_with_annotation(&annotated, &usd, date(2024, 5, 1))
            .unwrap();
        assert_eq!(value.quantity(), Decimal::from(300));

        // The registered price is now available to plain lookups too.
        assert!(valuator.value_in(&plain, &usd, Some(date(2024, 6, 1))).is_some());
    }
}
