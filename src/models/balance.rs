use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use rust_decimal::Decimal;

use super::Amount;

/// A multi-commodity sum, one slot per commodity symbol present.
///
/// Slots are never removed when they reach zero; a balance whose slots are all
/// zero compares equal to the empty balance.
#[derive(Debug, Clone, Default)]
pub struct Balance {
    slots: BTreeMap<String, Amount>,
}

impl Balance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_amount(amount: &Amount) -> Self {
        let mut balance = Self::new();
        balance.add_amount(amount);
        balance
    }

    /// Adds `amount` into the slot for its commodity, creating the slot on first use.
    pub fn add_amount(&mut self, amount: &Amount) {
        match self.slots.get_mut(amount.symbol()) {
            Some(slot) => {
                *slot = Amount::new(slot.quantity() + amount.quantity(), slot.commodity().clone());
            }
            None => {
                self.slots.insert(
                    amount.symbol().to_string(),
                    Amount::new(amount.quantity(), amount.commodity().clone()),
                );
            }
        }
    }

    pub fn add_balance(&mut self, other: &Balance) {
        for amount in other.amounts() {
            self.add_amount(amount);
        }
    }

    /// Quantity held in `symbol`, if a slot exists.
    pub fn get(&self, symbol: &str) -> Option<&Amount> {
        self.slots.get(symbol)
    }

    /// Component amounts ordered by commodity symbol.
    pub fn amounts(&self) -> impl Iterator<Item = &Amount> {
        self.slots.values()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.slots.values().all(Amount::is_zero)
    }

    /// The single non-zero component, when the balance holds exactly one.
    pub fn single_amount(&self) -> Option<&Amount> {
        let mut non_zero = self.slots.values().filter(|a| !a.is_zero());
        match (non_zero.next(), non_zero.next()) {
            (Some(amount), None) => Some(amount),
            _ => None,
        }
    }
}

impl PartialEq for Balance {
    fn eq(&self, other: &Self) -> bool {
        let non_zero = |b: &Balance| -> Vec<(String, Decimal)> {
            b.slots
                .iter()
                .filter(|(_, a)| !a.is_zero())
                .map(|(s, a)| (s.clone(), a.quantity()))
                .collect()
        };
        non_zero(self) == non_zero(other)
    }
}

impl Eq for Balance {}

impl AddAssign<&Amount> for Balance {
    fn add_assign(&mut self, rhs: &Amount) {
        self.add_amount(rhs);
    }
}

impl AddAssign<&Balance> for Balance {
    fn add_assign(&mut self, rhs: &Balance) {
        self.add_balance(rhs);
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut first = true;
        for amount in self.amounts().filter(|a| !a.is_zero()) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{amount}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Commodity, CommodityRef};

    fn commodity(symbol: &str) -> CommodityRef {
        Commodity::new(symbol).into_ref()
    }

    fn amount(q: i64, c: &CommodityRef) -> Amount {
        Amount::new(Decimal::from(q), c.clone())
    }

    #[test]
    fn adding_creates_then_updates_slot() {
        let usd = commodity("USD");
        let mut balance = Balance::new();
        balance += &amount(10, &usd);
        assert_eq!(balance.len(), 1);
        balance += &amount(5, &usd);
        assert_eq!(balance.len(), 1);
        assert_eq!(balance.get("USD").unwrap().quantity(), Decimal::from(15));
    }

    #[test]
    fn distinct_commodities_get_distinct_slots() {
        let usd = commodity("USD");
        let eur = commodity("EUR");
        let mut balance = Balance::from_amount(&amount(10, &usd));
        balance += &amount(3, &eur);
        assert_eq!(balance.symbols().collect::<Vec<_>>(), vec!["EUR", "USD"]);
        assert!(balance.single_amount().is_none());
    }

    #[test]
    fn all_zero_slots_equal_empty_balance() {
        let usd = commodity("USD");
        let mut balance = Balance::from_amount(&amount(10, &usd));
        balance += &amount(-10, &usd);
        assert!(balance.is_zero());
        assert_eq!(balance, Balance::new());
        assert_eq!(balance.to_string(), "0");
    }

    #[test]
    fn add_balance_merges_slots() {
        let usd = commodity("USD");
        let eur = commodity("EUR");
        let mut a = Balance::from_amount(&amount(1, &usd));
        let mut b = Balance::from_amount(&amount(2, &usd));
        b += &amount(7, &eur);
        a += &b;
        assert_eq!(a.get("USD").unwrap().quantity(), Decimal::from(3));
        assert_eq!(a.get("EUR").unwrap().quantity(), Decimal::from(7));
    }
}
