//! Money helpers built on `rust_decimal`.
//!
//! Prices and totals are carried as [`Decimal`] end to end so that summing many
//! cart entries never drifts. Rounding only happens when an amount is turned
//! into display text or a checkout parameter.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Display precision for prices and totals.
pub const DECIMAL_PLACES: u32 = 2;

/// Largest price a feed row may carry.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Why a raw price field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// Empty after trimming
    Empty,
    /// Not a decimal number
    NotANumber,
    /// Parsed, but below zero
    Negative,
    /// Parsed, but above [`MAX_PRICE`]
    OutOfRange,
}

/// Parses a raw feed price field into an exact, non-negative amount.
///
/// Surrounding whitespace is ignored. Unlike a lenient float parse, trailing
/// garbage such as `"12abc"` is rejected rather than read as `12`. Amounts
/// above [`MAX_PRICE`] are rejected so cart totals stay far from overflow.
pub fn parse_price(raw: &str) -> Result<Decimal, PriceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PriceError::Empty);
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| PriceError::NotANumber)?;

    if value.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if value.is_sign_negative() {
        return Err(PriceError::Negative);
    }
    if value > MAX_PRICE {
        return Err(PriceError::OutOfRange);
    }

    Ok(value)
}

/// Rounds an amount to display precision (half away from zero).
#[must_use]
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount with a currency symbol, e.g. `₹2499.00`.
#[must_use]
pub fn format_price(amount: Decimal, currency_symbol: &str) -> String {
    format!("{currency_symbol}{:.2}", round_for_display(amount))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_price_accepts_plain_decimals() {
        assert_eq!(parse_price("2499.00").unwrap(), Decimal::new(2499, 0));
        assert_eq!(parse_price(" 799.50 ").unwrap(), Decimal::new(7995, 1));
        assert_eq!(parse_price("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_price_rejects_invalid_input() {
        assert_eq!(parse_price(""), Err(PriceError::Empty));
        assert_eq!(parse_price("   "), Err(PriceError::Empty));
        assert_eq!(parse_price("abc"), Err(PriceError::NotANumber));
        assert_eq!(parse_price("12abc"), Err(PriceError::NotANumber));
        assert_eq!(parse_price("NaN"), Err(PriceError::NotANumber));
        assert_eq!(parse_price("-5.00"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_price_negative_zero_is_zero() {
        assert_eq!(parse_price("-0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_price_caps_at_max_price() {
        assert_eq!(parse_price("1000000000").unwrap(), MAX_PRICE);
        assert_eq!(parse_price("1000000000.01"), Err(PriceError::OutOfRange));
        assert_eq!(
            parse_price("79228162514264337593543950335"),
            Err(PriceError::OutOfRange)
        );
        assert_eq!(parse_price("1e12"), Err(PriceError::OutOfRange));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(329_850, 2), "₹"), "₹3298.50");
        assert_eq!(format_price(Decimal::ZERO, "$"), "$0.00");
        assert_eq!(format_price(Decimal::new(1005, 3), "$"), "$1.01");
    }
}
