use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::debug;

use super::PricePoint;
use crate::models::{Amount, Commodity, CommodityRef};

/// Identifies commodities by symbol and answers price lookups.
///
/// Implementations are shared between the build pass and read-only reducers,
/// so price registration goes through `&self`.
pub trait CommodityRegistry: Send + Sync {
    fn find(&self, symbol: &str) -> Option<CommodityRef>;

    /// Known commodities ordered by symbol.
    fn commodities(&self) -> Vec<CommodityRef>;

    /// Rate converting `commodity` into `target` as of `date`, or the latest
    /// known rate when `date` is `None`.
    fn price(
        &self,
        commodity: &Commodity,
        target: &Commodity,
        date: Option<NaiveDate>,
    ) -> Option<PricePoint>;

    /// Records that one unit of `commodity` was worth `price` on `date`.
    fn register_price(&self, commodity: &Commodity, price: &Amount, date: NaiveDate);
}

type PairKey = (String, String);

/// In-memory registry with a dated price history per commodity pair.
#[derive(Default)]
pub struct MemoryCommodityRegistry {
    commodities: RwLock<BTreeMap<String, CommodityRef>>,
    prices: RwLock<HashMap<PairKey, BTreeMap<NaiveDate, Decimal>>>,
    /// How far back a price may be before it is ignored. None means no limit.
    lookback_days: Option<u32>,
}

impl MemoryCommodityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookback_days(mut self, days: Option<u32>) -> Self {
        self.lookback_days = days;
        self
    }

    /// Registers `commodity` unless its symbol is already known, returning the
    /// shared handle either way.
    pub fn define(&self, commodity: Commodity) -> CommodityRef {
        let mut commodities = self.commodities.write();
        commodities
            .entry(commodity.symbol().to_string())
            .or_insert_with(|| {
                debug!(symbol = %commodity.symbol(), precision = commodity.precision(), "commodity defined");
                commodity.into_ref()
            })
            .clone()
    }

    pub fn find_or_create(&self, symbol: &str) -> CommodityRef {
        if let Some(existing) = self.find(symbol) {
            return existing;
        }
        self.define(Commodity::new(symbol))
    }

    /// Stores a rate directly, overwriting any rate for the same pair and date.
    pub fn put_price(&self, point: PricePoint) {
        let mut prices = self.prices.write();
        prices
            .entry((point.commodity, point.target))
            .or_default()
            .insert(point.date, point.rate);
    }

    fn lookup(
        &self,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> Option<PricePoint> {
        let prices = self.prices.read();
        let history = prices.get(&(from.to_string(), to.to_string()))?;
        let (found_date, rate) = match date {
            Some(date) => history.range(..=date).next_back()?,
            None => history.iter().next_back()?,
        };

        if let (Some(date), Some(days)) = (date, self.lookback_days) {
            if date - *found_date > Duration::days(i64::from(days)) {
                debug!(from, to, %found_date, %date, "price older than lookback window");
                return None;
            }
        }

        Some(PricePoint {
            commodity: from.to_string(),
            target: to.to_string(),
            date: *found_date,
            rate: *rate,
        })
    }
}

impl CommodityRegistry for MemoryCommodityRegistry {
    fn find(&self, symbol: &str) -> Option<CommodityRef> {
        self.commodities.read().get(symbol).cloned()
    }

    fn commodities(&self) -> Vec<CommodityRef> {
        self.commodities.read().values().cloned().collect()
    }

    fn price(
        &self,
        commodity: &Commodity,
        target: &Commodity,
        date: Option<NaiveDate>,
    ) -> Option<PricePoint> {
        let direct = self.lookup(commodity.symbol(), target.symbol(), date);
        let inverse = self
            .lookup(target.symbol(), commodity.symbol(), date)
            .and_then(|p| p.inverted());

        // Prefer whichever observation is more recent; direct wins ties.
        match (direct, inverse) {
            (Some(d), Some(i)) if i.date > d.date => Some(i),
            (Some(d), _) => Some(d),
            (None, i) => i,
        }
    }

    fn register_price(&self, commodity: &Commodity, price: &Amount, date: NaiveDate) {
        debug!(
            commodity = %commodity.symbol(),
            price = %price,
            %date,
            "registering annotated price"
        );
        self.find_or_create(commodity.symbol());
        self.find_or_create(price.symbol());
        self.put_price(PricePoint {
            commodity: commodity.symbol().to_string(),
            target: price.symbol().to_string(),
            date,
            rate: price.quantity(),
        });
    }
}
