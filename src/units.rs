//! Exact conversions between wei and gwei quantities.
//!
//! Fee values cross three representations: hex wei on transaction parameters,
//! decimal gwei strings on estimate feeds and user input, and [`U256`] wei
//! inside the engine. Conversions here are integer-exact in both directions;
//! nothing in this module goes through floating point.

use crate::error::EngineError;
use alloy::primitives::{
    utils::{parse_units, ParseUnits},
    U256,
};

/// Number of wei in one gwei.
const WEI_IN_GWEI: u64 = 1_000_000_000;

/// Parses a decimal gwei string (e.g. `"1.5"`) into wei.
///
/// Fractional digits beyond wei precision are rejected by the underlying
/// parser; negative amounts are rejected here.
pub fn parse_gwei(amount: &str) -> Result<U256, EngineError> {
    match parse_units(amount, "gwei")? {
        ParseUnits::U256(wei) => Ok(wei),
        ParseUnits::I256(_) => Err(EngineError::NegativeQuantity(amount.to_string())),
    }
}

/// Formats a wei amount as a decimal gwei string with trailing zeros trimmed,
/// e.g. `1_500_000_000` wei becomes `"1.5"`.
pub fn format_gwei(wei: U256) -> String {
    let divisor = U256::from(WEI_IN_GWEI);
    let whole = wei / divisor;
    let frac = (wei % divisor).to::<u64>();
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:09}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Increases `value` by `percent`, rounding half-up to integer wei.
///
/// Used for the replacement-transaction bump: the result of a +10% bump is the
/// smallest integer wei amount the pool will accept over the original.
pub fn increase_by_percent(value: U256, percent: u64) -> U256 {
    let hundred = U256::from(100u64);
    (value.saturating_mul(U256::from(100 + percent)).saturating_add(U256::from(50u64))) / hundred
}
