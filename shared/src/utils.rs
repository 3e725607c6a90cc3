// Input coercion and amount display shared by the engine and the CLI.
use chrono::Utc;
use rust_decimal::prelude::*;

pub const CURRENCY_SYMBOL: &str = "৳";

/// Monetary values are kept to two decimal places.
pub const DECIMAL_PLACES: u32 = 2;

/// Largest amount a single field accepts, in whole currency units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Forgiving amount parsing for form fields: blank, non-numeric, non-finite,
/// negative or out-of-range input becomes zero.
pub fn coerce_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    let parsed = Decimal::from_str(trimmed).ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .and_then(Decimal::from_f64)
    });
    match parsed {
        Some(value) if value > Decimal::ZERO && value <= Decimal::from(MAX_AMOUNT) => value,
        _ => Decimal::ZERO,
    }
}

/// Member counts below one are treated as a single member.
pub fn coerce_members(raw: i64) -> u32 {
    if raw <= 0 {
        1
    } else {
        u32::try_from(raw).unwrap_or(u32::MAX)
    }
}

/// Meter counts below one clamp to one meter.
pub fn coerce_count(raw: i64) -> usize {
    if raw <= 0 {
        1
    } else {
        usize::try_from(raw).unwrap_or(usize::MAX)
    }
}

/// Parses a members field typed as text, the way the form does: anything
/// that is not a number counts as zero.
pub fn parse_members(raw: &str) -> i64 {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        })
        .unwrap_or(0)
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `৳` followed by the amount with exactly two decimals.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_money(value);
    rounded.rescale(DECIMAL_PLACES);
    format!("{}{}", CURRENCY_SYMBOL, rounded)
}

/// The current month as `YYYY-MM`.
pub fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}
