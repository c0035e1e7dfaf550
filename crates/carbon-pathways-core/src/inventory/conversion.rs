use rust_decimal::{Decimal, RoundingStrategy};

use super::activity::RawQuantity;
use super::reference::{Indicator, ReferenceTables};
use crate::types::Kilograms;

/// Convert one raw activity measurement into kgCO2e.
///
/// `raw * conversion * emission_factor`, rounded to two decimals. The
/// conversion factor only applies when `raw_unit` is exactly the factor's
/// source unit; otherwise the quantity is taken as already in kWh. A missing
/// emission factor means the activity carries no emissions. Unparseable
/// quantities count as zero and negative products clamp to zero.
pub fn convert_to_co2e(
    indicator: &Indicator,
    raw: &RawQuantity,
    raw_unit: &str,
    tables: &ReferenceTables,
) -> Kilograms {
    let quantity = raw.as_decimal();
    if quantity.is_zero() {
        return Decimal::ZERO;
    }

    let conversion = indicator
        .conversion_factor_id
        .as_deref()
        .and_then(|id| tables.conversion_factor(id))
        .filter(|cf| cf.source_unit == raw_unit)
        .map(|cf| cf.factor)
        .unwrap_or(Decimal::ONE);

    let emission_factor = indicator
        .emission_factor_id
        .as_deref()
        .and_then(|id| tables.emission_factor(id))
        .map(|ef| ef.value)
        .unwrap_or(Decimal::ZERO);

    let kg = quantity
        .saturating_mul(conversion)
        .saturating_mul(emission_factor)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    kg.max(Decimal::ZERO)
}
