use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PathwayError;
use crate::types::Rate;
use crate::PathwayResult;

/// Reject discount rates at or below -100%, where discount factors vanish.
pub fn validate_discount_rate(rate: Rate) -> PathwayResult<()> {
    if rate <= dec!(-1) {
        return Err(PathwayError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

/// `1 / (1 + rate)^periods`, by exact multiplication (square and multiply).
/// Returns zero for rates at or below -100% and once the growth term
/// overflows; a growth term that underflows to zero saturates the factor.
pub fn discount_factor(rate: Rate, periods: u32) -> Decimal {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let Some(growth) = checked_pow(one_plus_r, periods) else {
        return Decimal::ZERO;
    };
    Decimal::ONE.checked_div(growth).unwrap_or(Decimal::MAX)
}

fn checked_pow(base: Decimal, mut exp: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        exp >>= 1;
        if exp > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}
