//! Money rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Money is held to the paisa (two decimal places).
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds a money amount to the smallest currency unit, half away from zero.
///
/// Every stage of the computation rounds its output with this function, so the
/// persisted totals add up exactly.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("9015.0666").unwrap()), Decimal::from_str("9015.07").unwrap());
/// assert_eq!(round_money(Decimal::from_str("0.125").unwrap()), Decimal::from_str("0.13").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
