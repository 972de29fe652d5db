//! Pricing
//!
//! Minor-unit money arithmetic shared by the discount strategies: percent-of-amount with
//! midpoint-away-from-zero rounding, and the proportional split used to allocate a fixed
//! discount across lines without over- or under-discounting.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::MoneyError;
use thiserror::Error;

/// Errors specific to minor-unit pricing arithmetic.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor-unit arithmetic overflowed.
    #[error("amount arithmetic overflowed")]
    AmountOverflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate a percentage of a minor-unit amount, rounded to whole minor units.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the multiplication overflows the decimal
/// range or the rounded result does not fit an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let Some(minor) = Decimal::from_i64(minor) else {
        unreachable!("always returns `Some` for every `i64`")
    };

    let applied = *percent * minor;
    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(PricingError::PercentConversion)
}

/// Express a percentage in whole-number points (`0.10` becomes `10`), trailing zeros trimmed.
pub fn percent_points(percent: &Percentage) -> Decimal {
    (*percent * Decimal::ONE_HUNDRED).normalize()
}

/// Split `value` minor units across `weights` proportionally.
///
/// The value is first clamped to the weight total, then allocated by cumulative rounding:
/// share *i* is the difference between the rounded cumulative allocation up to and including
/// *i* and the one up to *i - 1*. The shares are non-negative and sum exactly to the clamped
/// value; an individual share can exceed its weight by at most one minor unit.
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] if the weight total overflows, or
/// [`PricingError::PercentConversion`] if a rounded share does not fit an `i64`.
pub fn proportional_split(value: i64, weights: &[i64]) -> Result<Vec<i64>, PricingError> {
    let total = weights
        .iter()
        .try_fold(0i64, |acc, weight| acc.checked_add(*weight))
        .ok_or(PricingError::AmountOverflow)?;

    if value <= 0 || total <= 0 {
        return Ok(vec![0; weights.len()]);
    }

    let value = value.min(total);
    let Some(value_dec) = Decimal::from_i64(value) else {
        unreachable!("always returns `Some` for every `i64`")
    };
    let Some(total_dec) = Decimal::from_i64(total) else {
        unreachable!("always returns `Some` for every `i64`")
    };

    let mut shares = Vec::with_capacity(weights.len());
    let mut cumulative_weight = 0i64;
    let mut allocated = 0i64;

    for weight in weights {
        cumulative_weight = cumulative_weight.saturating_add(*weight);

        let Some(cumulative_dec) = Decimal::from_i64(cumulative_weight) else {
            unreachable!("always returns `Some` for every `i64`")
        };

        let cumulative_value = (value_dec * cumulative_dec / total_dec)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(PricingError::PercentConversion)?;

        shares.push(cumulative_value - allocated);
        allocated = cumulative_value;
    }

    Ok(shares)
}
