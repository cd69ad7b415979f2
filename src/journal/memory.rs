use super::{AccountFilter, Journal, PostingIter, Query};
use crate::error::Result;
use crate::models::{AccountTree, Posting};

/// Postings held in memory, in source order.
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    postings: Vec<Posting>,
    accounts: Option<AccountTree>,
}

impl MemoryJournal {
    pub fn new(postings: Vec<Posting>) -> Self {
        Self {
            postings,
            accounts: None,
        }
    }

    pub fn with_accounts(mut self, accounts: AccountTree) -> Self {
        self.accounts = Some(accounts);
        self
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

impl Journal for MemoryJournal {
    fn query(&self, query: &Query) -> Result<PostingIter<'_>> {
        let filter = AccountFilter::compile(&query.filter)?;
        let mut matched: Vec<Posting> = self
            .postings
            .iter()
            .filter(|p| filter.matches(&p.account))
            .map(|p| p.dated(query.effective_dates))
            .collect();
        if query.sort_by_date {
            // Stable: same-day postings keep source order.
            matched.sort_by_key(|p| p.date);
        }
        Ok(Box::new(matched.into_iter()))
    }

    fn declared_accounts(&self) -> Option<&AccountTree> {
        self.accounts.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, Commodity};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn journal() -> MemoryJournal {
        let usd = Commodity::new("USD").into_ref();
        let amount = |q: i64| Amount::new(Decimal::from(q), usd.clone());
        MemoryJournal::new(vec![
            Posting::new(date(5), "Expenses:Food", amount(1)),
            Posting::new(date(2), "Assets:Cash", amount(2)).with_effective_date(date(9)),
            Posting::new(date(2), "Expenses:Rent", amount(3)),
        ])
    }

    #[test]
    fn query_sorts_stably_by_date() {
        let journal = journal();
        let accounts: Vec<_> = journal
            .query(&Query::default())
            .unwrap()
            .map(|p| p.account)
            .collect();
        assert_eq!(accounts, vec!["Assets:Cash", "Expenses:Rent", "Expenses:Food"]);
    }

    #[test]
    fn effective_dates_redate_postings() {
        let journal = journal();
        let postings: Vec<_> = journal
            .query(&Query::default().with_effective_dates(true))
            .unwrap()
            .collect();
        assert_eq!(postings.last().unwrap().account, "Assets:Cash");
        assert_eq!(postings.last().unwrap().date, date(9));
    }

    #[test]
    fn filter_restricts_accounts() {
        let journal = journal();
        let count = journal.query(&Query::new("^expenses")).unwrap().count();
        assert_eq!(count, 2);
    }
}
