//! Price parsing and display.
//!
//! Prices arrive as free text in product markup ("S/ 5.00", "12,50 soles")
//! and leave as a fixed-prefix string with two decimals. Amounts use decimal
//! arithmetic so cart totals never accumulate binary rounding error.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency prefix used by [`format_price`].
pub const CURRENCY_PREFIX: &str = "S/ ";

/// Everything that is not part of a number.
#[allow(clippy::unwrap_used)]
static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.,]").unwrap());

/// Longest leading `digits[.digits]` run.
#[allow(clippy::unwrap_used)]
static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*\.?[0-9]*").unwrap());

/// Parse a free-text price label into an amount.
///
/// Strips every character except digits, `.` and `,`, treats the first `,`
/// as the decimal point, then reads the longest numeric prefix. Anything that
/// yields no digits parses as zero; this function never fails.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use vitrina_core::parse_price;
///
/// assert_eq!(parse_price("S/ 5.00"), Decimal::new(500, 2));
/// assert_eq!(parse_price("12,50 soles"), Decimal::new(1250, 2));
/// assert_eq!(parse_price("consultar"), Decimal::ZERO);
/// ```
#[must_use]
pub fn parse_price(text: &str) -> Decimal {
    let stripped = NON_NUMERIC.replace_all(text, "");
    let normalized = stripped.replacen(',', ".", 1);

    let candidate = NUMERIC_PREFIX
        .find(&normalized)
        .map_or("", |m| m.as_str())
        .trim_end_matches('.');

    if !candidate.bytes().any(|b| b.is_ascii_digit()) {
        return Decimal::ZERO;
    }

    if candidate.starts_with('.') {
        return Decimal::from_str(&format!("0{candidate}")).unwrap_or(Decimal::ZERO);
    }

    Decimal::from_str(candidate).unwrap_or(Decimal::ZERO)
}

/// Parse an optional price label; a missing label is zero.
#[must_use]
pub fn parse_price_opt(text: Option<&str>) -> Decimal {
    text.map_or(Decimal::ZERO, parse_price)
}

/// Format an amount for display with [`CURRENCY_PREFIX`] and two decimals.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{CURRENCY_PREFIX}{rounded:.2}")
}
