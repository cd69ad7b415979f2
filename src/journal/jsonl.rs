use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::{Journal, MemoryJournal, PostingIter, Query};
use crate::error::{Error, Result};
use crate::models::{AccountTree, Amount, Commodity, CommodityRef, Posting, SymbolPlacement};
use crate::pricing::{CommodityRegistry, MemoryCommodityRegistry, PricePoint};

/// One line of a journal export. Amounts are strings to keep them exact.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record {
    Commodity {
        symbol: String,
        #[serde(default)]
        precision: Option<u32>,
        #[serde(default)]
        placement: SymbolPlacement,
    },
    Account {
        name: String,
    },
    Price {
        date: NaiveDate,
        commodity: String,
        price: AmountRecord,
    },
    Posting {
        date: NaiveDate,
        #[serde(default)]
        effective_date: Option<NaiveDate>,
        account: String,
        amount: String,
        commodity: String,
        #[serde(default)]
        price: Option<AmountRecord>,
    },
}

#[derive(Debug, Deserialize)]
struct AmountRecord {
    amount: String,
    commodity: String,
}

/// A journal loaded from a JSON-lines export of commodities, accounts,
/// prices and postings.
///
/// Commodity and price records are registered into the registry passed to
/// [`JsonlJournal::open`]. Commodities first seen on a posting take their
/// display precision from that amount.
#[derive(Debug, Clone)]
pub struct JsonlJournal {
    inner: MemoryJournal,
}

impl JsonlJournal {
    pub fn open(path: impl AsRef<Path>, registry: &MemoryCommodityRegistry) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let journal = Self::from_reader(BufReader::new(file), registry).map_err(|e| match e {
            Error::Io { source, .. } => Error::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(
            path = %path.display(),
            postings = journal.inner.len(),
            "journal loaded"
        );
        Ok(journal)
    }

    pub fn from_reader(reader: impl BufRead, registry: &MemoryCommodityRegistry) -> Result<Self> {
        let mut postings = Vec::new();
        let mut accounts: Option<AccountTree> = None;

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|source| Error::Io {
                path: Default::default(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: Record = serde_json::from_str(trimmed).map_err(|e| Error::Parse {
                line: line_no,
                message: e.to_string(),
            })?;

            match record {
                Record::Commodity {
                    symbol,
                    precision,
                    placement,
                } => {
                    registry.define(
                        Commodity::new(symbol)
                            .with_precision(precision.unwrap_or(0))
                            .with_placement(placement),
                    );
                }
                Record::Account { name } => {
                    accounts
                        .get_or_insert_with(AccountTree::new)
                        .insert(&name)
                        .map_err(|e| Error::Parse {
                            line: line_no,
                            message: e.to_string(),
                        })?;
                }
                Record::Price {
                    date,
                    commodity,
                    price,
                } => {
                    let price = parse_amount(&price, registry, line_no)?;
                    registry.put_price(PricePoint {
                        commodity,
                        target: price.symbol().to_string(),
                        date,
                        rate: price.quantity(),
                    });
                }
                Record::Posting {
                    date,
                    effective_date,
                    account,
                    amount,
                    commodity,
                    price,
                } => {
                    let mut amount =
                        parse_amount(&AmountRecord { amount, commodity }, registry, line_no)?;
                    if let Some(price) = price {
                        amount = amount.with_price(parse_amount(&price, registry, line_no)?);
                    }
                    let mut posting = Posting::new(date, account, amount);
                    posting.effective_date = effective_date;
                    postings.push(posting);
                }
            }
        }

        debug!(postings = postings.len(), "parsed journal records");
        let mut inner = MemoryJournal::new(postings);
        if let Some(accounts) = accounts {
            inner = inner.with_accounts(accounts);
        }
        Ok(Self { inner })
    }

    pub fn postings(&self) -> &[Posting] {
        self.inner.postings()
    }
}

impl Journal for JsonlJournal {
    fn query(&self, query: &Query) -> Result<PostingIter<'_>> {
        self.inner.query(query)
    }

    fn declared_accounts(&self) -> Option<&AccountTree> {
        self.inner.declared_accounts()
    }
}

fn parse_amount(
    record: &AmountRecord,
    registry: &MemoryCommodityRegistry,
    line: usize,
) -> Result<Amount> {
    let quantity = Decimal::from_str(record.amount.trim()).map_err(|e| Error::Parse {
        line,
        message: format!("invalid amount {:?}: {e}", record.amount),
    })?;
    let symbol = record.commodity.trim();
    if symbol.is_empty() {
        return Err(Error::Parse {
            line,
            message: "amount is missing a commodity".to_string(),
        });
    }
    let commodity: CommodityRef = match registry.find(symbol) {
        Some(existing) => existing,
        None => registry.define(Commodity::new(symbol).with_precision(quantity.scale())),
    };
    Ok(Amount::new(quantity, commodity))
}
