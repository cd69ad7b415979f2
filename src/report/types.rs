use serde::Serialize;

use crate::pricing::ValuationGap;
use crate::series::Granularity;

/// JSON output for one point of a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointOutput {
    pub date: String,
    pub value: String,
}

/// JSON output for one plotted series (a commodity or an account)
#[derive(Debug, Clone, Serialize)]
pub struct SeriesOutput {
    pub name: String,
    pub label: String,
    pub commodity: String,
    pub total: String,
    pub points: Vec<PointOutput>,
}

/// JSON output for the commodity time series view
#[derive(Debug, Clone, Serialize)]
pub struct CommodityReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_commodity: Option<String>,
    pub merged: bool,
    pub series: Vec<SeriesOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<ValuationGap>,
}

/// JSON output for the per-account running balance view
#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub commodity: String,
    pub depth_limit: usize,
    pub accounts: Vec<SeriesOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<ValuationGap>,
}

/// One stacked bar segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentOutput {
    pub account: String,
    pub value: String,
    pub bottom: String,
    pub height: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodOutput {
    pub period: String,
    pub segments: Vec<SegmentOutput>,
}

/// JSON output for the periodic (stacked bar) breakdown
#[derive(Debug, Clone, Serialize)]
pub struct PeriodicReport {
    pub commodity: String,
    pub granularity: Granularity,
    pub depth_limit: usize,
    /// Legend labels in stacking order.
    pub accounts: Vec<String>,
    pub periods: Vec<PeriodOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<ValuationGap>,
}

/// JSON output for the pie breakdown
#[derive(Debug, Clone, Serialize)]
pub struct PieReport {
    pub commodity: String,
    pub threshold: String,
    pub sizes: Vec<String>,
    pub labels: Vec<String>,
}

/// JSON output for a registered commodity
#[derive(Debug, Clone, Serialize)]
pub struct CommodityOutput {
    pub symbol: String,
    pub precision: u32,
    pub placement: String,
}
