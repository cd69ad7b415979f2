use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{valued_accounts, PeriodOutput, PeriodicReport, ReportContext, SegmentOutput};
use crate::format::format_decimal;
use crate::series::{AccountSeries, Granularity};

/// Per-period stacked breakdown of account activity.
///
/// Each resolved account's delta series is valued as of each posting date and
/// summed into calendar periods. Within a period, segments are stacked in
/// account order: non-negative values upward from zero, negative values
/// downward from zero. `bottom` is the lower edge and `height` is always
/// non-negative. Delta components without a price count as zero and are
/// listed in `gaps`.
pub fn periodic_report(
    series: &AccountSeries,
    ctx: &ReportContext<'_>,
    granularity: Granularity,
) -> PeriodicReport {
    let (valued, mut gaps) = valued_accounts(series, ctx);

    let mut periods: BTreeMap<NaiveDate, BTreeMap<usize, Decimal>> = BTreeMap::new();
    for (index, account) in valued.iter().enumerate() {
        for (date, delta) in account.rolled.series.postings.iter() {
            let valuation = ctx.valuator.valuation(delta, ctx.target, Some(date));
            gaps.extend(valuation.gaps);
            *periods
                .entry(granularity.period_start(date))
                .or_default()
                .entry(index)
                .or_default() += valuation.value.quantity();
        }
    }

    let periods = periods
        .into_iter()
        .map(|(start, buckets)| {
            let mut up = Decimal::ZERO;
            let mut down = Decimal::ZERO;
            let segments = buckets
                .into_iter()
                .map(|(index, value)| {
                    let bottom = if value.is_sign_negative() && !value.is_zero() {
                        down += value;
                        down
                    } else {
                        let bottom = up;
                        up += value;
                        bottom
                    };
                    SegmentOutput {
                        account: valued[index].rolled.name.to_string(),
                        value: format_decimal(value),
                        bottom: format_decimal(bottom),
                        height: format_decimal(value.abs()),
                    }
                })
                .collect();
            PeriodOutput {
                period: start.to_string(),
                segments,
            }
        })
        .collect();

    PeriodicReport {
        commodity: ctx.target.symbol().to_string(),
        granularity,
        depth_limit: ctx.depth_limit,
        accounts: valued.into_iter().map(|v| v.label).collect(),
        periods,
        gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::models::{Amount, Posting};
    use crate::pricing::{MemoryCommodityRegistry, Valuator};
    use crate::series::build;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn stacks_positive_up_and_negative_down_per_month() {
        let registry = MemoryCommodityRegistry::new();
        let usd = registry.find_or_create("USD");
        let post = |m, d, account: &str, q: i64| {
            Posting::new(date(m, d), account, Amount::new(Decimal::from(q), usd.clone()))
        };
        let series = build(vec![
            post(1, 5, "Expenses:Rent", 100),
            post(1, 9, "Expenses:Food", 30),
            post(1, 20, "Expenses:Food", 20),
            post(1, 31, "Income:Salary", -200),
            post(1, 31, "Assets:Cash", 50),
            post(2, 3, "Expenses:Food", 10),
        ])
        .unwrap();

        let display = DisplayConfig::default();
        let ctx = ReportContext {
            valuator: Valuator::new(&registry),
            target: &usd,
            depth_limit: 0,
            display: &display,
        };
        let report = periodic_report(&series, &ctx, Granularity::Monthly);

        // Account order follows final totals, largest first.
        assert_eq!(
            report.accounts,
            vec![
                "Expenses:Rent (100 USD)",
                "Expenses:Food (60 USD)",
                "Assets:Cash (50 USD)",
                "Income:Salary (-200 USD)"
            ]
        );

        assert_eq!(report.periods.len(), 2);
        let january = &report.periods[0];
        assert_eq!(january.period, "2024-01-01");
        let stack: Vec<_> = january
            .segments
            .iter()
            .map(|s| (s.account.as_str(), s.bottom.as_str(), s.height.as_str()))
            .collect();
        assert_eq!(
            stack,
            vec![
                ("Expenses:Rent", "0", "100"),
                ("Expenses:Food", "100", "50"),
                ("Assets:Cash", "150", "50"),
                ("Income:Salary", "-200", "200"),
            ]
        );

        let february = &report.periods[1];
        assert_eq!(february.period, "2024-02-01");
        assert_eq!(february.segments.len(), 1);
        assert_eq!(february.segments[0].value, "10");
        assert_eq!(february.segments[0].bottom, "0");
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn unpriced_deltas_are_listed_as_gaps() {
        let registry = MemoryCommodityRegistry::new();
        let usd = registry.find_or_create("USD");
        let gold = registry.find_or_create("XAU");
        let series = build(vec![
            Posting::new(date(1, 5), "Assets:Cash", Amount::new(Decimal::from(10), usd.clone())),
            Posting::new(date(1, 6), "Assets:Vault", Amount::new(Decimal::from(2), gold)),
        ])
        .unwrap();

        let display = DisplayConfig::default();
        let ctx = ReportContext {
            valuator: Valuator::new(&registry),
            target: &usd,
            depth_limit: 0,
            display: &display,
        };
        let report = periodic_report(&series, &ctx, Granularity::Monthly);

        let values: Vec<_> = report.periods[0]
            .segments
            .iter()
            .map(|s| (s.account.as_str(), s.value.as_str()))
            .collect();
        assert_eq!(values, vec![("Assets:Cash", "10"), ("Assets:Vault", "0")]);
        assert!(!report.gaps.is_empty());
        assert!(report.gaps.iter().all(|g| g.commodity == "XAU" && g.target == "USD"));
        assert!(report
            .gaps
            .iter()
            .any(|g| g.date == Some(date(1, 6))));
    }
}
