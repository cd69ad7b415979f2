use std::cmp::Reverse;

use rust_decimal::Decimal;

use super::{PieReport, ReportContext};
use crate::format::format_decimal;
use crate::models::ACCOUNT_SEPARATOR;
use crate::series::{wedges, AccountSeries};

/// True when `name` is `prefix` itself or one of its descendants.
pub fn under_prefix(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(ACCOUNT_SEPARATOR),
        None => false,
    }
}

/// Final totals of the resolved accounts, bucketed into pie wedges.
///
/// Accounts are ranked by absolute value. `prefix`, when set, keeps only that
/// account and its descendants.
pub fn pie_report(
    series: &AccountSeries,
    ctx: &ReportContext<'_>,
    prefix: Option<&str>,
    threshold: Decimal,
) -> PieReport {
    let mut ranked = series
        .rollup(ctx.depth_limit)
        .into_iter()
        .filter(|rolled| prefix.map_or(true, |p| under_prefix(rolled.name, p)))
        .map(|rolled| {
            let value = ctx.valuator.value_of(&rolled.total(), ctx.target, None);
            (value.quantity(), rolled.name.to_string())
        })
        .collect::<Vec<_>>();
    ranked.sort_by_key(|(value, _)| Reverse(value.abs()));

    let result = wedges(ranked, threshold);
    PieReport {
        commodity: ctx.target.symbol().to_string(),
        threshold: format_decimal(threshold),
        sizes: result.sizes.into_iter().map(format_decimal).collect(),
        labels: result.labels,
    }
}
