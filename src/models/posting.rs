use chrono::NaiveDate;

use super::Amount;

/// One dated movement of an amount into or out of an account.
#[derive(Debug, Clone)]
pub struct Posting {
    pub date: NaiveDate,
    /// Auxiliary (effective) date, when the source recorded one.
    pub effective_date: Option<NaiveDate>,
    /// Full name of the account, e.g. `Assets:Bank:Checking`.
    pub account: String,
    pub amount: Amount,
}

impl Posting {
    pub fn new(date: NaiveDate, account: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            effective_date: None,
            account: account.into(),
            amount,
        }
    }

    pub fn with_effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = Some(date);
        self
    }

    /// The date to index this posting under.
    pub fn date_for(&self, effective: bool) -> NaiveDate {
        match (effective, self.effective_date) {
            (true, Some(date)) => date,
            _ => self.date,
        }
    }

    /// Copy of this posting re-dated to the effective date when requested.
    pub fn dated(&self, effective: bool) -> Posting {
        let mut posting = self.clone();
        posting.date = self.date_for(effective);
        posting
    }
}
