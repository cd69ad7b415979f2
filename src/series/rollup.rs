//! Depth-limited selection of which account series to present.

use std::collections::HashSet;

use super::{AccountSeries, BalanceSeries};
use crate::models::{AccountId, AccountTree, Balance};

/// Which of an account's two series a resolution points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Own,
    Aggregated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub account: AccountId,
    pub kind: SeriesKind,
}

/// Resolves `id` under a depth limit (0 = unlimited).
///
/// Accounts shallower than the limit present their own series; deeper ones
/// collapse onto their ancestor at the limit depth and present its aggregated
/// series. An account exactly at the limit presents its own aggregated series.
pub fn resolve(tree: &AccountTree, id: AccountId, limit: usize) -> Resolution {
    if limit == 0 || tree.account(id).depth() < limit {
        return Resolution {
            account: id,
            kind: SeriesKind::Own,
        };
    }
    Resolution {
        account: tree.ancestor_at_depth(id, limit),
        kind: SeriesKind::Aggregated,
    }
}

/// An account chosen for presentation, borrowing from the build indices.
#[derive(Debug, Clone, Copy)]
pub struct RolledAccount<'a> {
    pub name: &'a str,
    pub account: AccountId,
    pub kind: SeriesKind,
    pub series: &'a BalanceSeries,
}

impl RolledAccount<'_> {
    pub fn total(&self) -> Balance {
        self.series.total()
    }
}

/// One report pass: each resolved account name is presented at most once.
#[derive(Debug)]
pub struct RollupPass<'a> {
    series: &'a AccountSeries,
    limit: usize,
    used: HashSet<AccountId>,
}

impl<'a> RollupPass<'a> {
    pub fn new(series: &'a AccountSeries, limit: usize) -> Self {
        Self {
            series,
            limit,
            used: HashSet::new(),
        }
    }

    /// Resolves `id`, or returns `None` if its target was already used in this pass.
    pub fn select(&mut self, id: AccountId) -> Option<RolledAccount<'a>> {
        let indices: &'a AccountSeries = self.series;
        let tree = indices.tree();
        let resolution = resolve(tree, id, self.limit);
        if !self.used.insert(resolution.account) {
            return None;
        }
        let series = match resolution.kind {
            SeriesKind::Own => indices.own(resolution.account),
            SeriesKind::Aggregated => indices.aggregated(resolution.account),
        };
        Some(RolledAccount {
            name: tree.account(resolution.account).fullname(),
            account: resolution.account,
            kind: resolution.kind,
            series,
        })
    }
}

impl AccountSeries {
    /// Every account with direct postings, resolved under `limit` and deduplicated,
    /// in tree order.
    pub fn rollup(&self, limit: usize) -> Vec<RolledAccount<'_>> {
        let mut pass = RollupPass::new(self, limit);
        self.posted_accounts()
            .filter_map(|id| pass.select(id))
            .collect()
    }
}
