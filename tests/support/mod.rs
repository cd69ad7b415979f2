#![allow(dead_code)]

use std::str::FromStr;

use chrono::NaiveDate;
use ledgerview::models::{Amount, Posting};
use ledgerview::pricing::{MemoryCommodityRegistry, PricePoint};
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn posting(
    registry: &MemoryCommodityRegistry,
    on: NaiveDate,
    account: &str,
    quantity: &str,
    symbol: &str,
) -> Posting {
    Posting::new(
        on,
        account,
        Amount::new(dec(quantity), registry.find_or_create(symbol)),
    )
}

pub fn price(registry: &MemoryCommodityRegistry, on: NaiveDate, from: &str, to: &str, rate: &str) {
    registry.put_price(PricePoint {
        commodity: from.to_string(),
        target: to.to_string(),
        date: on,
        rate: dec(rate),
    });
}

/// A small household journal in USD and EUR, already in date order.
pub fn household(registry: &MemoryCommodityRegistry) -> Vec<Posting> {
    price(registry, date(2024, 1, 1), "EUR", "USD", "1.10");
    price(registry, date(2024, 2, 1), "EUR", "USD", "1.20");
    vec![
        posting(registry, date(2024, 1, 1), "Assets:Bank:Checking", "2000", "USD"),
        posting(registry, date(2024, 1, 1), "Income:Salary", "-2000", "USD"),
        posting(registry, date(2024, 1, 5), "Expenses:Food:Groceries", "120", "USD"),
        posting(registry, date(2024, 1, 5), "Assets:Bank:Checking", "-120", "USD"),
        posting(registry, date(2024, 1, 20), "Expenses:Travel", "300", "EUR"),
        posting(registry, date(2024, 1, 20), "Assets:Bank:Savings", "-300", "EUR"),
        posting(registry, date(2024, 2, 3), "Expenses:Food:Dining", "45", "USD"),
        posting(registry, date(2024, 2, 3), "Assets:Bank:Checking", "-45", "USD"),
        posting(registry, date(2024, 2, 10), "Assets:Bank:Savings", "500", "EUR"),
        posting(registry, date(2024, 2, 10), "Income:Gifts", "-500", "EUR"),
    ]
}
