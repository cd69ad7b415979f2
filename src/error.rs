use std::path::PathBuf;

/// Errors raised while loading postings or building account indices.
///
/// Missing prices are not errors; see [`crate::pricing::ValuationGap`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid filter expression {filter:?}: {message}")]
    Filter { filter: String, message: String },

    #[error("Invalid account name {name:?}: account names are ':'-separated non-empty segments")]
    InvalidAccountName { name: String },

    #[error("Posting references unknown account {name:?}")]
    UnknownAccount { name: String },

    #[error("Account {name:?} has a cyclic parent chain")]
    ParentCycle { name: String },

    #[error("Cannot combine amounts in {left} and {right}")]
    CommodityMismatch { left: String, right: String },

    #[error("Unknown commodity {symbol:?}")]
    UnknownCommodity { symbol: String },

    #[error("This view needs a display commodity")]
    NoDisplayCommodity,

    #[error("No journal data loaded")]
    NotLoaded,

    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
