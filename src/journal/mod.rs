//! Posting sources: anything that can answer a filtered, date-ordered query.

mod filter;
mod jsonl;
mod memory;

pub use filter::AccountFilter;
pub use jsonl::JsonlJournal;
pub use memory::MemoryJournal;

use crate::error::Result;
use crate::models::{AccountTree, Posting};

/// Parameters of one posting query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Case-insensitive regular expression matched against account full names.
    /// Empty matches everything.
    pub filter: String,
    pub sort_by_date: bool,
    /// Index postings by their effective date where one is recorded.
    pub effective_dates: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort_by_date: true,
            effective_dates: false,
        }
    }
}

impl Query {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    pub fn with_effective_dates(mut self, effective: bool) -> Self {
        self.effective_dates = effective;
        self
    }
}

pub type PostingIter<'a> = Box<dyn Iterator<Item = Posting> + 'a>;

pub trait Journal: Send + Sync {
    /// Postings matching `query`, each re-dated per `query.effective_dates`.
    fn query(&self, query: &Query) -> Result<PostingIter<'_>>;

    /// Accounts declared up front by the source, if it declares any.
    fn declared_accounts(&self) -> Option<&AccountTree> {
        None
    }
}
