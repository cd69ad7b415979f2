use std::cmp::Reverse;

use super::{AccountReport, PointOutput, ReportContext, SeriesOutput};
use crate::format::{format_amount, format_decimal};
use crate::models::Amount;
use crate::pricing::ValuationGap;
use crate::series::{AccountSeries, RolledAccount};

/// A resolved account together with its final value in the report commodity.
#[derive(Debug, Clone)]
pub struct ValuedAccount<'a> {
    pub rolled: RolledAccount<'a>,
    pub total: Amount,
    pub label: String,
}

/// Resolves every posted account under the depth limit and values its final
/// total (at the latest price), largest first.
///
/// Components without a price are left out of the total and returned as gaps.
pub fn valued_accounts<'a>(
    series: &'a AccountSeries,
    ctx: &ReportContext<'_>,
) -> (Vec<ValuedAccount<'a>>, Vec<ValuationGap>) {
    let mut gaps = Vec::new();
    let mut valued: Vec<ValuedAccount<'a>> = series
        .rollup(ctx.depth_limit)
        .into_iter()
        .map(|rolled| {
            let valuation = ctx.valuator.valuation(&rolled.total(), ctx.target, None);
            gaps.extend(valuation.gaps);
            let label = format!(
                "{} ({})",
                rolled.name,
                format_amount(&valuation.value, ctx.display)
            );
            ValuedAccount {
                rolled,
                total: valuation.value,
                label,
            }
        })
        .collect();

    valued.sort_by_key(|v| Reverse(v.total.quantity()));
    gaps.dedup();
    (valued, gaps)
}

/// Running balance of each resolved account, valued per point as of that date.
pub fn account_report(series: &AccountSeries, ctx: &ReportContext<'_>) -> AccountReport {
    let (valued, gaps) = valued_accounts(series, ctx);

    let accounts = valued
        .into_iter()
        .map(|account| {
            let points = account
                .rolled
                .series
                .running
                .iter()
                .map(|(date, balance)| PointOutput {
                    date: date.to_string(),
                    value: format_decimal(
                        ctx.valuator
                            .value_of(balance, ctx.target, Some(date))
                            .quantity(),
                    ),
                })
                .collect();
            SeriesOutput {
                name: account.rolled.name.to_string(),
                label: account.label,
                commodity: ctx.target.symbol().to_string(),
                total: format_decimal(account.total.quantity()),
                points,
            }
        })
        .collect();

    AccountReport {
        commodity: ctx.target.symbol().to_string(),
        depth_limit: ctx.depth_limit,
        accounts,
        gaps,
    }
}
