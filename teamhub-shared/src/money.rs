/// Currency arithmetic in integer cents
///
/// Amounts arrive as decimal currency units (`25.50`) and are stored as
/// integer minor units (`2550`). Conversion goes through `rust_decimal`, never
/// through `f64`, and rounds half-to-even at the cents boundary. The same rule
/// applies to campaign goals and donation amounts.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
/// use teamhub_shared::money::{format_cents, to_cents};
///
/// let cents = to_cents(Decimal::from_str("19.99").unwrap()).unwrap();
/// assert_eq!(cents, 1999);
/// assert_eq!(format_cents(cents), "$19.99");
/// ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Integer count of minor currency units
pub type Cents = i64;

/// Largest single amount accepted: $1,000,000,000.00
///
/// Keeps a running campaign total far below the `BIGINT` limit.
pub const MAX_AMOUNT_CENTS: Cents = 100_000_000_000;

/// Conversion failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// Amount rounds to zero cents or below
    #[error("Amount must be greater than zero")]
    NotPositive,

    /// Amount exceeds `MAX_AMOUNT_CENTS`
    #[error("Amount is too large")]
    Overflow,
}

/// Converts a positive decimal amount to cents
///
/// # Errors
///
/// - `MoneyError::NotPositive` if the rounded amount is ≤ 0
/// - `MoneyError::Overflow` if the amount exceeds `MAX_AMOUNT_CENTS`
pub fn to_cents(amount: Decimal) -> Result<Cents, MoneyError> {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let cents = rounded
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|c| c.to_i64())
        .ok_or(MoneyError::Overflow)?;

    if cents <= 0 {
        return Err(MoneyError::NotPositive);
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(MoneyError::Overflow);
    }

    Ok(cents)
}

/// Formats cents for humans: `$1,234.56`
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let digits = (abs / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, abs % 100)
}

/// Share of the goal reached, rounded to the nearest percent and capped at 100
pub fn progress_percent(current: Cents, goal: Cents) -> u8 {
    if goal <= 0 || current <= 0 {
        return 0;
    }

    let current = current as i128;
    let goal = goal as i128;
    let percent = (current * 100 + goal / 2) / goal;

    percent.min(100) as u8
}
