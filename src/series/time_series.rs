use std::borrow::Borrow;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::SparseSeries;
use crate::models::{Amount, CommodityRef, Posting};
use crate::pricing::{ValuationGap, Valuator};

/// Running totals per commodity key, as produced by [`time_series`].
#[derive(Debug, Clone, Default)]
pub struct CommoditySeries {
    series: BTreeMap<String, SparseSeries<Amount>>,
    gaps: Vec<ValuationGap>,
}

impl CommoditySeries {
    pub fn get(&self, key: &str) -> Option<&SparseSeries<Amount>> {
        self.series.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SparseSeries<Amount>)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Final running total for each key.
    pub fn totals(&self) -> impl Iterator<Item = (&str, &Amount)> {
        self.series
            .iter()
            .filter_map(|(k, v)| v.last_value().map(|total| (k.as_str(), total)))
    }

    /// Postings whose value could not be determined and were left out.
    pub fn gaps(&self) -> &[ValuationGap] {
        &self.gaps
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Accumulates postings into running totals keyed by commodity symbol.
///
/// With a `display` commodity every contribution is converted into it first
/// (falling back to the posting's own price annotation), and `merge` collapses
/// all keys into the display commodity's symbol. `merge` without a display
/// commodity has no effect. Contributions that cannot be valued are skipped
/// and reported through [`CommoditySeries::gaps`].
pub fn time_series<I>(
    postings: I,
    display: Option<&CommodityRef>,
    merge: bool,
    valuator: &Valuator<'_>,
) -> CommoditySeries
where
    I: IntoIterator,
    I::Item: Borrow<Posting>,
{
    let mut result = CommoditySeries::default();

    for posting in postings {
        let posting = posting.borrow();
        let amount = &posting.amount;

        let key = match display {
            Some(target) if merge => target.symbol().to_string(),
            _ => amount.symbol().to_string(),
        };

        let value = match display {
            Some(target) => {
                match valuator.value_with_annotation(amount, target, posting.date) {
                    Some(value) => value,
                    None => {
                        warn!(
                            commodity = %amount.symbol(),
                            target = %target.symbol(),
                            date = %posting.date,
                            "no price available, skipping posting"
                        );
                        result.gaps.push(ValuationGap {
                            date: Some(posting.date),
                            commodity: amount.symbol().to_string(),
                            target: target.symbol().to_string(),
                        });
                        continue;
                    }
                }
            }
            None => amount.retyped(amount.commodity().clone()),
        };

        let unit = value.commodity().clone();
        result.series.entry(key).or_default().record_running(
            posting.date,
            || Amount::zero(unit.clone()),
            |total| *total = Amount::new(total.quantity() + value.quantity(), unit.clone()),
        );
    }

    debug!(
        keys = result.series.len(),
        gaps = result.gaps.len(),
        "commodity time series built"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{CommodityRegistry, MemoryCommodityRegistry, PricePoint};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn registry() -> MemoryCommodityRegistry {
        let registry = MemoryCommodityRegistry::new();
        registry.find_or_create("USD");
        registry.find_or_create("EUR");
        registry.put_price(PricePoint {
            commodity: "EUR".to_string(),
            target: "USD".to_string(),
            date: date(1),
            rate: Decimal::from(2),
        });
        registry
    }

    fn posting(registry: &MemoryCommodityRegistry, day: u32, quantity: i64, symbol: &str) -> Posting {
        Posting::new(
            date(day),
            "Assets:Cash",
            Amount::new(Decimal::from(quantity), registry.find_or_create(symbol)),
        )
    }

    #[test]
    fn native_keys_without_display_commodity() {
        let registry = registry();
        let valuator = Valuator::new(&registry);
        let postings = vec![
            posting(&registry, 1, 10, "USD"),
            posting(&registry, 2, 5, "EUR"),
            posting(&registry, 3, 1, "USD"),
        ];

        let result = time_series(&postings, None, true, &valuator);
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["EUR", "USD"]);
        let usd = result.get("USD").unwrap();
        assert_eq!(usd.get(date(1)).unwrap().quantity(), Decimal::from(10));
        assert_eq!(usd.get(date(3)).unwrap().quantity(), Decimal::from(11));
        assert_eq!(result.get("EUR").unwrap().last_value().unwrap().symbol(), "EUR");
    }

    #[test]
    fn merge_collapses_into_display_commodity() {
        let registry = registry();
        let valuator = Valuator::new(&registry);
        let usd = registry.find("USD").unwrap();
        let postings = vec![
            posting(&registry, 1, 10, "USD"),
            posting(&registry, 2, 5, "EUR"),
            posting(&registry, 2, 1, "USD"),
        ];

        let result = time_series(&postings, Some(&usd), true, &valuator);
        assert_eq!(result.len(), 1);
        let merged = result.get("USD").unwrap();
        assert_eq!(merged.get(date(1)).unwrap().quantity(), Decimal::from(10));
        assert_eq!(merged.get(date(2)).unwrap().quantity(), Decimal::from(21));
    }

    #[test]
    fn display_without_merge_keeps_native_keys_in_display_units() {
        let registry = registry();
        let valuator = Valuator::new(&registry);
        let usd = registry.find("USD").unwrap();
        let postings = vec![posting(&registry, 2, 5, "EUR")];

        let result = time_series(&postings, Some(&usd), false, &valuator);
        let eur = result.get("EUR").unwrap().last_value().unwrap();
        assert_eq!(eur.symbol(), "USD");
        assert_eq!(eur.quantity(), Decimal::from(10));
    }

    #[test]
    fn unpriced_postings_are_reported_not_zeroed() {
        let registry = registry();
        let valuator = Valuator::new(&registry);
        let usd = registry.find("USD").unwrap();
        let postings = vec![
            posting(&registry, 1, 10, "USD"),
            posting(&registry, 2, 3, "XAU"),
        ];

        let result = time_series(&postings, Some(&usd), true, &valuator);
        let merged = result.get("USD").unwrap();
        assert_eq!(merged.len(), 1);
        assert!(merged.get(date(2)).is_none());
        assert_eq!(result.gaps().len(), 1);
        assert_eq!(result.gaps()[0].commodity, "XAU");
        assert_eq!(result.gaps()[0].target, "USD");
        assert_eq!(result.gaps()[0].date, Some(date(2)));
    }
}
