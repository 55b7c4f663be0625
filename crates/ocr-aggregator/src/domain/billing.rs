//! # Fee Arithmetic
//!
//! Payment owed for one accepted transmission. All intermediate products are
//! computed in `u128` so the formula cannot overflow, then floored back into
//! the ledger's `u64` unit, saturating at the maximum.

use super::entities::BillingParams;

/// Compute the fee-token units owed for one accepted report.
///
/// The base charge is one transmission unit plus one observation unit per
/// reporter (at least one, so an empty observer order still pays the
/// transmitter). The charge is converted to fee-token units at the micro
/// rate and scaled by the ratio of the capped observed gas price to the
/// reasonable gas price, rounding down.
///
/// A zero `reasonable_gas_price` disables gas scaling entirely rather than
/// dividing by zero.
pub fn compute_payment(observer_count: u8, params: &BillingParams, observed_gas_price: u64) -> u64 {
    let reporters = u128::from(observer_count.max(1));
    let units = u128::from(params.fee_units_per_transmission)
        + u128::from(params.fee_units_per_observation) * reporters;
    let micro = units * u128::from(params.micro_fee_token_per_native_unit);

    let amount = if params.reasonable_gas_price == 0 {
        micro
    } else {
        let gas = u128::from(observed_gas_price.min(params.maximum_gas_price));
        micro * gas / u128::from(params.reasonable_gas_price)
    };

    u64::try_from(amount).unwrap_or(u64::MAX)
}
