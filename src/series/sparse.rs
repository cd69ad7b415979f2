use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use chrono::NaiveDate;

/// Date-indexed values, holding a point only for dates that saw activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseSeries<T> {
    points: BTreeMap<NaiveDate, T>,
}

impl<T> Default for SparseSeries<T> {
    fn default() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }
}

impl<T> SparseSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&T> {
        self.points.get(&date)
    }

    /// The last value recorded at or before `date`.
    pub fn at_or_before(&self, date: NaiveDate) -> Option<&T> {
        self.points.range(..=date).next_back().map(|(_, v)| v)
    }

    pub fn last(&self) -> Option<(NaiveDate, &T)> {
        self.points.iter().next_back().map(|(d, v)| (*d, v))
    }

    pub fn last_value(&self) -> Option<&T> {
        self.points.values().next_back()
    }

    /// Points in ascending date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, &T)> {
        self.points.iter().map(|(d, v)| (*d, v))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<T: Clone> SparseSeries<T> {
    /// Folds a change into a cumulative series.
    ///
    /// The point at `date` becomes the previous cumulative value (or `start`)
    /// with `apply` run on it, and every later point also gets `apply`, so
    /// reading the last point at or before any date yields the true running
    /// total even when changes arrive out of date order.
    ///
    /// Returns true when later points had to be adjusted.
    pub fn record_running(
        &mut self,
        date: NaiveDate,
        start: impl FnOnce() -> T,
        mut apply: impl FnMut(&mut T),
    ) -> bool {
        match self.points.get_mut(&date) {
            Some(existing) => apply(existing),
            None => {
                let mut value = self.at_or_before(date).cloned().unwrap_or_else(start);
                apply(&mut value);
                self.points.insert(date, value);
            }
        }

        let mut adjusted = false;
        for (_, later) in self.points.range_mut((Excluded(date), Unbounded)) {
            apply(later);
            adjusted = true;
        }
        adjusted
    }

    /// Folds a change into a per-date (non-cumulative) series.
    pub fn record_delta(
        &mut self,
        date: NaiveDate,
        start: impl FnOnce() -> T,
        apply: impl FnOnce(&mut T),
    ) {
        apply(self.points.entry(date).or_insert_with(start));
    }
}

impl<T> FromIterator<(NaiveDate, T)> for SparseSeries<T> {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, T)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
