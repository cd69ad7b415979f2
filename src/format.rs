use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DisplayConfig;
use crate::models::{Amount, SymbolPlacement};

/// Canonical string form of a quantity for machine-readable output.
///
/// Trailing zeros are stripped so `10.50` and `10.5` serialize the same way.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

fn group_int_digits(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn pad_fraction_to_dp(s: &str, dp: u32) -> String {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if dp == 0 {
        return int_part.to_string();
    }

    let mut out = String::with_capacity(int_part.len() + 1 + dp as usize);
    out.push_str(int_part);
    out.push('.');
    out.extend(frac_part.chars().take(dp as usize));
    for _ in frac_part.len().min(dp as usize)..dp as usize {
        out.push('0');
    }
    out
}

fn group_number_string(s: &str) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let grouped = group_int_digits(int_part);
    match frac_part {
        Some(f) if !f.is_empty() => format!("{grouped}.{f}"),
        _ => grouped,
    }
}

/// Render an amount for human display.
///
/// The quantity is rounded (half away from zero) to the commodity's display
/// precision. The sign goes before a prefix symbol (`-$1,234.50`) and a suffix
/// symbol is separated by a space (`12.5 EUR`).
pub fn format_amount(amount: &Amount, display: &DisplayConfig) -> String {
    let commodity = amount.commodity();
    let dp = commodity.precision();
    let rounded = amount
        .quantity()
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let mut s = rounded.abs().normalize().to_string();
    if display.fixed_decimals {
        s = pad_fraction_to_dp(&s, dp);
    }
    if display.grouping {
        s = group_number_string(&s);
    }

    let sign = if negative { "-" } else { "" };
    match commodity.placement() {
        SymbolPlacement::Prefix => format!("{sign}{}{s}", commodity.symbol()),
        SymbolPlacement::Suffix => format!("{sign}{s} {}", commodity.symbol()),
    }
}
