//! Single-pass aggregation of postings into per-account balance series.

use std::borrow::Borrow;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::SparseSeries;
use crate::error::{Error, Result};
use crate::models::{AccountId, AccountTree, Amount, Balance, Posting};

/// The running and per-date series kept for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSeries {
    /// Cumulative balance as of each date with activity.
    pub running: SparseSeries<Balance>,
    /// Balance change that happened exactly on each date.
    pub postings: SparseSeries<Balance>,
}

impl BalanceSeries {
    fn record(&mut self, date: NaiveDate, amount: &Amount) {
        self.postings
            .record_delta(date, Balance::new, |delta| delta.add_amount(amount));
        self.running
            .record_running(date, Balance::new, |running| running.add_amount(amount));
    }

    /// Final cumulative balance; zero when the account saw no activity.
    pub fn total(&self) -> Balance {
        self.running.last_value().cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

/// The four indices produced by one build pass, keyed by account.
///
/// `own` series only see postings made to the exact account; `aggregated`
/// series see postings to the account and every descendant.
#[derive(Debug, Clone)]
pub struct AccountSeries {
    tree: AccountTree,
    own: Vec<BalanceSeries>,
    aggregated: Vec<BalanceSeries>,
    posting_count: usize,
}

impl AccountSeries {
    pub fn tree(&self) -> &AccountTree {
        &self.tree
    }

    pub fn posting_count(&self) -> usize {
        self.posting_count
    }

    pub fn find(&self, fullname: &str) -> Option<AccountId> {
        self.tree.find(fullname)
    }

    pub fn own(&self, id: AccountId) -> &BalanceSeries {
        &self.own[id.index()]
    }

    pub fn aggregated(&self, id: AccountId) -> &BalanceSeries {
        &self.aggregated[id.index()]
    }

    pub fn own_running(&self, fullname: &str) -> Option<&SparseSeries<Balance>> {
        self.find(fullname).map(|id| &self.own(id).running)
    }

    pub fn own_postings(&self, fullname: &str) -> Option<&SparseSeries<Balance>> {
        self.find(fullname).map(|id| &self.own(id).postings)
    }

    pub fn aggregated_running(&self, fullname: &str) -> Option<&SparseSeries<Balance>> {
        self.find(fullname).map(|id| &self.aggregated(id).running)
    }

    pub fn aggregated_postings(&self, fullname: &str) -> Option<&SparseSeries<Balance>> {
        self.find(fullname).map(|id| &self.aggregated(id).postings)
    }

    /// Final balance of postings made directly to `fullname`.
    pub fn total(&self, fullname: &str) -> Option<Balance> {
        self.find(fullname).map(|id| self.own(id).total())
    }

    /// Final balance of `fullname` and all of its descendants.
    pub fn aggregated_total(&self, fullname: &str) -> Option<Balance> {
        self.find(fullname).map(|id| self.aggregated(id).total())
    }

    /// Accounts that received at least one posting directly, in tree order.
    pub fn posted_accounts(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.tree
            .iter()
            .map(|(id, _)| id)
            .filter(move |id| !self.own(*id).is_empty())
    }
}

/// Builds [`AccountSeries`] from a date-ordered posting sequence.
#[derive(Debug, Clone, Default)]
pub struct SeriesBuilder {
    tree: AccountTree,
    strict: bool,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a tree of declared accounts.
    pub fn with_accounts(mut self, tree: AccountTree) -> Self {
        self.tree = tree;
        self
    }

    /// When strict, postings to accounts missing from the starting tree fail
    /// with [`Error::UnknownAccount`] instead of creating them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Consumes `postings` once. Any structural error aborts the whole build.
    pub fn build<I>(self, postings: I) -> Result<AccountSeries>
    where
        I: IntoIterator,
        I::Item: Borrow<Posting>,
    {
        let SeriesBuilder { mut tree, strict } = self;
        let mut own: Vec<BalanceSeries> = Vec::new();
        let mut aggregated: Vec<BalanceSeries> = Vec::new();
        let mut posting_count = 0usize;
        let mut out_of_order = 0usize;
        let mut last_date: Option<NaiveDate> = None;

        for posting in postings {
            let posting = posting.borrow();
            let account = if strict {
                tree.find(&posting.account)
                    .ok_or_else(|| Error::UnknownAccount {
                        name: posting.account.clone(),
                    })?
            } else {
                tree.insert(&posting.account)?
            };

            if own.len() < tree.len() {
                own.resize_with(tree.len(), BalanceSeries::default);
                aggregated.resize_with(tree.len(), BalanceSeries::default);
            }

            let date = posting.date;
            if last_date.is_some_and(|last| date < last) {
                out_of_order += 1;
            }
            last_date = Some(last_date.map_or(date, |last| last.max(date)));

            own[account.index()].record(date, &posting.amount);
            for ancestor in tree.path_to_root(account)? {
                aggregated[ancestor.index()].record(date, &posting.amount);
            }
            posting_count += 1;
        }

        own.resize_with(tree.len(), BalanceSeries::default);
        aggregated.resize_with(tree.len(), BalanceSeries::default);

        if out_of_order > 0 {
            warn!(
                out_of_order,
                "postings were not in date order; later snapshots were adjusted"
            );
        }
        debug!(
            postings = posting_count,
            accounts = tree.len(),
            "account series built"
        );

        Ok(AccountSeries {
            tree,
            own,
            aggregated,
            posting_count,
        })
    }
}

/// Builds account series with default options.
pub fn build<I>(postings: I) -> Result<AccountSeries>
where
    I: IntoIterator,
    I::Item: Borrow<Posting>,
{
    SeriesBuilder::new().build(postings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Commodity, CommodityRef};
    use rust_decimal::Decimal;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn usd() -> CommodityRef {
        Commodity::new("USD").with_precision(2).into_ref()
    }

    fn posting(day: u32, account: &str, quantity: i64, commodity: &CommodityRef) -> Posting {
        Posting::new(
            date(day),
            account,
            Amount::new(Decimal::from(quantity), commodity.clone()),
        )
    }

    fn quantity(balance: &Balance, symbol: &str) -> Decimal {
        balance.get(symbol).map(Amount::quantity).unwrap_or_default()
    }

    #[test]
    fn same_date_keeps_final_running_value_and_summed_delta() {
        let usd = usd();
        let series = build(vec![
            posting(1, "Assets:Cash", 10, &usd),
            posting(1, "Assets:Cash", 5, &usd),
            posting(2, "Assets:Cash", -3, &usd),
        ])
        .unwrap();

        let running = series.own_running("Assets:Cash").unwrap();
        assert_eq!(running.len(), 2);
        assert_eq!(quantity(running.get(date(1)).unwrap(), "USD"), Decimal::from(15));
        assert_eq!(quantity(running.get(date(2)).unwrap(), "USD"), Decimal::from(12));

        let postings = series.own_postings("Assets:Cash").unwrap();
        assert_eq!(quantity(postings.get(date(1)).unwrap(), "USD"), Decimal::from(15));
        assert_eq!(quantity(postings.get(date(2)).unwrap(), "USD"), Decimal::from(-3));
    }

    #[test]
    fn postings_propagate_to_every_ancestor() {
        let usd = usd();
        let series = build(vec![
            posting(1, "Assets:Bank:Checking", 100, &usd),
            posting(2, "Assets:Bank:Savings", 50, &usd),
            posting(3, "Assets:Cash", 7, &usd),
        ])
        .unwrap();

        let bank = series.aggregated_total("Assets:Bank").unwrap();
        assert_eq!(quantity(&bank, "USD"), Decimal::from(150));
        let assets = series.aggregated_total("Assets").unwrap();
        assert_eq!(quantity(&assets, "USD"), Decimal::from(157));
        let root = series.aggregated(AccountTree::ROOT).total();
        assert_eq!(quantity(&root, "USD"), Decimal::from(157));

        // Parents never receive postings directly.
        assert!(series.own_running("Assets:Bank").unwrap().is_empty());
        assert!(series.total("Assets").unwrap().is_zero());

        let bank_running = series.aggregated_running("Assets:Bank").unwrap();
        assert_eq!(bank_running.dates().collect::<Vec<_>>(), vec![date(1), date(2)]);
    }

    #[test]
    fn aggregated_series_includes_the_account_itself() {
        let usd = usd();
        let series = build(vec![
            posting(1, "Expenses", 4, &usd),
            posting(2, "Expenses:Food", 6, &usd),
        ])
        .unwrap();

        let total = series.aggregated_total("Expenses").unwrap();
        assert_eq!(quantity(&total, "USD"), Decimal::from(10));
        assert_eq!(
            quantity(&series.total("Expenses").unwrap(), "USD"),
            Decimal::from(4)
        );
    }

    #[test]
    fn balances_keep_native_commodities() {
        let usd = usd();
        let eur = Commodity::new("EUR").into_ref();
        let series = build(vec![
            posting(1, "Assets:Wallet", 10, &usd),
            posting(1, "Assets:Wallet", 20, &eur),
        ])
        .unwrap();

        let total = series.total("Assets:Wallet").unwrap();
        assert_eq!(total.len(), 2);
        assert_eq!(quantity(&total, "EUR"), Decimal::from(20));
    }

    #[test]
    fn strict_builder_rejects_undeclared_accounts() {
        let usd = usd();
        let mut tree = AccountTree::new();
        tree.insert("Assets:Cash").unwrap();

        let err = SeriesBuilder::new()
            .with_accounts(tree)
            .strict(true)
            .build(vec![
                posting(1, "Assets:Cash", 1, &usd),
                posting(2, "Income:Salary", 1, &usd),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAccount { name } if name == "Income:Salary"));
    }

    #[test]
    fn invalid_account_name_aborts_build() {
        let usd = usd();
        let err = build(vec![posting(1, "Assets::Cash", 1, &usd)]).unwrap_err();
        assert!(matches!(err, Error::InvalidAccountName { .. }));
    }

    #[test]
    fn out_of_order_postings_still_yield_cumulative_snapshots() {
        let usd = usd();
        let series = build(vec![
            posting(5, "Assets:Cash", 10, &usd),
            posting(2, "Assets:Cash", 1, &usd),
        ])
        .unwrap();

        let running = series.own_running("Assets:Cash").unwrap();
        assert_eq!(quantity(running.get(date(2)).unwrap(), "USD"), Decimal::from(1));
        assert_eq!(quantity(running.get(date(5)).unwrap(), "USD"), Decimal::from(11));
    }
}
