use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Conversion rate from one commodity into another, effective from `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub commodity: String,
    pub target: String,
    pub date: NaiveDate,
    /// Units of `target` per unit of `commodity`.
    pub rate: Decimal,
}

impl PricePoint {
    /// The same observation read in the opposite direction, if the rate is non-zero.
    pub fn inverted(&self) -> Option<PricePoint> {
        if self.rate.is_zero() {
            return None;
        }
        Some(PricePoint {
            commodity: self.target.clone(),
            target: self.commodity.clone(),
            date: self.date,
            rate: Decimal::ONE / self.rate,
        })
    }
}

/// A commodity that could not be converted into the display commodity.
///
/// Gaps are reported alongside results instead of being raised as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationGap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub commodity: String,
    pub target: String,
}
