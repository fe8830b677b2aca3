use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ApvError;
use crate::types::{Money, Rate, Ratio};
use crate::ApvResult;

/// Decimal places of every reported component total.
pub const CENTS: u32 = 2;

/// Round a money amount to cents (banker's rounding).
pub fn round_cents(amount: Money) -> Money {
    amount.round_dp(CENTS)
}

/// (1 + rate)^periods, with overflow surfaced instead of panicking.
pub fn compound_factor(rate: Rate, periods: u32) -> ApvResult<Ratio> {
    let base = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| ApvError::overflow(format!("1 + {rate}")))?;
    base.checked_powi(i64::from(periods))
        .ok_or_else(|| ApvError::overflow(format!("(1 + {rate})^{periods}")))
}

/// base × (1 + rate)^periods
pub fn grow(base: Money, rate: Rate, periods: u32) -> ApvResult<Money> {
    let factor = compound_factor(rate, periods)?;
    base.checked_mul(factor)
        .ok_or_else(|| ApvError::overflow(format!("{base} grown at {rate} over {periods} periods")))
}

/// 1 / (1 + rate)^t
pub fn discount_factor(rate: Rate, t: u32) -> ApvResult<Ratio> {
    let factor = compound_factor(rate, t)?;
    if factor.is_zero() {
        return Err(ApvError::DivisionByZero {
            context: format!("discount factor at {rate} for period {t}"),
        });
    }
    Decimal::ONE
        .checked_div(factor)
        .ok_or_else(|| ApvError::overflow(format!("discount factor at {rate} for period {t}")))
}

/// Multiply a chain of factors, failing on the first overflow.
pub fn product(factors: &[Decimal], context: &str) -> ApvResult<Decimal> {
    factors.iter().try_fold(Decimal::ONE, |acc, f| {
        acc.checked_mul(*f)
            .ok_or_else(|| ApvError::overflow(context.to_string()))
    })
}

/// Divide, mapping a zero divisor and an overflow to their own errors.
pub fn divide(numerator: Decimal, denominator: Decimal, context: &str) -> ApvResult<Decimal> {
    if denominator.is_zero() {
        return Err(ApvError::DivisionByZero {
            context: context.to_string(),
        });
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| ApvError::overflow(context.to_string()))
}

/// Subtract, mapping an overflow to `NumericOverflow`.
pub fn subtract(minuend: Decimal, subtrahend: Decimal, context: &str) -> ApvResult<Decimal> {
    minuend
        .checked_sub(subtrahend)
        .ok_or_else(|| ApvError::overflow(context.to_string()))
}

/// One period of a discounted home-currency stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountedFlow {
    pub amount: Money,
    pub discount_factor: Ratio,
    pub present_value: Money,
}

/// Per-period detail paired with its discounted flow, plus the unrounded PV total.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedSeries<D> {
    pub periods: Vec<(D, DiscountedFlow)>,
    pub total_present_value: Money,
}

/// Walk periods 1..=life in order, discount the amount produced for each period
/// at `rate`, and keep a running sum of present values.
///
/// `period_fn` is `FnMut` so it can carry state from one period to the next
/// (a declining loan balance). Nothing is rounded here.
pub fn discounted_series<D, F>(
    life: u32,
    rate: Rate,
    label: &str,
    mut period_fn: F,
) -> ApvResult<DiscountedSeries<D>>
where
    F: FnMut(u32) -> ApvResult<(D, Money)>,
{
    let mut periods = Vec::with_capacity(life as usize);
    let mut total = Decimal::ZERO;

    for t in 1..=life {
        let (detail, amount) = period_fn(t)?;
        let discount_factor = discount_factor(rate, t)?;
        let present_value = amount
            .checked_mul(discount_factor)
            .ok_or_else(|| ApvError::overflow(format!("{label} present value, period {t}")))?;
        total = total
            .checked_add(present_value)
            .ok_or_else(|| ApvError::overflow(format!("{label} cumulative present value")))?;

        trace!(series = label, period = t, %amount, %present_value, "discounted period");

        periods.push((
            detail,
            DiscountedFlow {
                amount,
                discount_factor,
                present_value,
            },
        ));
    }

    Ok(DiscountedSeries {
        periods,
        total_present_value: total,
    })
}
