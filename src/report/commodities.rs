use std::cmp::Reverse;

use super::{CommodityOutput, CommodityReport, PointOutput, SeriesOutput};
use crate::config::DisplayConfig;
use crate::format::{format_amount, format_decimal};
use crate::models::{CommodityRef, SymbolPlacement};
use crate::pricing::CommodityRegistry;
use crate::series::CommoditySeries;

/// One line per commodity key, largest final total first.
pub fn commodity_report(
    source: &CommoditySeries,
    display_commodity: Option<&CommodityRef>,
    merge: bool,
    display: &DisplayConfig,
) -> CommodityReport {
    let mut keyed: Vec<_> = source
        .iter()
        .filter_map(|(key, points)| points.last_value().map(|total| (key, points, total)))
        .collect();
    keyed.sort_by_key(|(_, _, total)| Reverse(total.quantity()));

    let series = keyed
        .into_iter()
        .map(|(key, points, total)| SeriesOutput {
            name: key.to_string(),
            label: format!("{key} ({})", format_amount(total, display)),
            commodity: total.symbol().to_string(),
            total: format_decimal(total.quantity()),
            points: points
                .iter()
                .map(|(date, amount)| PointOutput {
                    date: date.to_string(),
                    value: format_decimal(amount.quantity()),
                })
                .collect(),
        })
        .collect();

    CommodityReport {
        display_commodity: display_commodity.map(|c| c.symbol().to_string()),
        merged: merge && display_commodity.is_some(),
        series,
        gaps: source.gaps().to_vec(),
    }
}

/// Every commodity the registry knows, by symbol.
pub fn commodity_list(registry: &dyn CommodityRegistry) -> Vec<CommodityOutput> {
    registry
        .commodities()
        .into_iter()
        .map(|c| CommodityOutput {
            symbol: c.symbol().to_string(),
            precision: c.precision(),
            placement: match c.placement() {
                SymbolPlacement::Prefix => "prefix".to_string(),
                SymbolPlacement::Suffix => "suffix".to_string(),
            },
        })
        .collect()
}
