//! Gas form validation.
//!
//! Rules run independently per field and the first match wins the field's
//! slot. Blocking codes gate submission; warnings are advisory. Estimate
//! comparisons are strict, so a value sitting exactly on a suggested bound is
//! clean.

use crate::{
    types::{GasErrors, GasFeeEstimates},
    units,
};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A per-field validation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GasFormError {
    /// The gas limit is below the chain's minimum.
    GasLimitOutOfBounds,
    /// The priority fee is below the low estimate.
    MaxPriorityFeeTooLow,
    /// The priority fee is above the high estimate.
    MaxPriorityFeeHighWarning,
    /// The fee cap is below the priority fee.
    MaxFeeImbalance,
    /// The fee cap is below the medium estimate.
    MaxFeeTooLow,
    /// The fee cap is far above the high estimate.
    MaxFeeHighWarning,
    /// The legacy gas price is zero.
    GasPriceTooLow,
}

impl GasFormError {
    /// Returns the code as a string.
    pub const fn as_str(&self) -> &str {
        match self {
            Self::GasLimitOutOfBounds => "gasLimitOutOfBounds",
            Self::MaxPriorityFeeTooLow => "maxPriorityFeeTooLow",
            Self::MaxPriorityFeeHighWarning => "maxPriorityFeeHighWarning",
            Self::MaxFeeImbalance => "maxFeeImbalance",
            Self::MaxFeeTooLow => "maxFeeTooLow",
            Self::MaxFeeHighWarning => "maxFeeHighWarning",
            Self::GasPriceTooLow => "gasPriceTooLow",
        }
    }

    /// Whether the code blocks submission. Everything else is a warning.
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::GasLimitOutOfBounds | Self::MaxFeeImbalance)
    }
}

impl fmt::Display for GasFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved form values to validate.
#[derive(Debug, Clone, Copy)]
pub struct GasFormInputs<'a> {
    /// Gas limit under edit.
    pub gas_limit: u64,
    /// The floor the gas limit is validated against.
    pub minimum_gas_limit: u64,
    /// Resolved legacy gas price, in wei.
    pub gas_price: U256,
    /// Resolved fee cap, in wei.
    pub max_fee_per_gas: U256,
    /// Resolved priority fee, in wei.
    pub max_priority_fee_per_gas: U256,
    /// Latest estimates from the feed.
    pub estimates: &'a GasFeeEstimates,
    /// Which fee model the fields were resolved under.
    pub supports_eip1559: bool,
    /// Percentage over the high estimate at which the fee cap draws a warning.
    pub high_fee_warning_percent: u64,
}

impl GasFormInputs<'_> {
    /// Runs the rule table over every field.
    pub fn validate(&self) -> GasErrors {
        GasErrors {
            gas_limit: self.gas_limit_error(),
            gas_price: self.gas_price_error(),
            max_fee: self.max_fee_error(),
            max_priority_fee: self.max_priority_fee_error(),
        }
    }

    fn gas_limit_error(&self) -> Option<GasFormError> {
        (self.gas_limit < self.minimum_gas_limit).then_some(GasFormError::GasLimitOutOfBounds)
    }

    fn max_priority_fee_error(&self) -> Option<GasFormError> {
        if !self.supports_eip1559 {
            return None;
        }
        let market = self.estimates.fee_market()?;
        let value = self.max_priority_fee_per_gas;
        if value < market.low.suggested_max_priority_fee_per_gas {
            return Some(GasFormError::MaxPriorityFeeTooLow);
        }
        if value > market.high.suggested_max_priority_fee_per_gas {
            return Some(GasFormError::MaxPriorityFeeHighWarning);
        }
        None
    }

    fn max_fee_error(&self) -> Option<GasFormError> {
        if !self.supports_eip1559 {
            return None;
        }
        // Imbalance is pure field arithmetic and applies even without estimates.
        if self.max_fee_per_gas < self.max_priority_fee_per_gas
            && !self.max_priority_fee_per_gas.is_zero()
        {
            return Some(GasFormError::MaxFeeImbalance);
        }
        let market = self.estimates.fee_market()?;
        let value = self.max_fee_per_gas;
        if value < market.medium.suggested_max_fee_per_gas {
            return Some(GasFormError::MaxFeeTooLow);
        }
        let high_cutoff = units::increase_by_percent(
            market.high.suggested_max_fee_per_gas,
            self.high_fee_warning_percent,
        );
        if value > high_cutoff {
            return Some(GasFormError::MaxFeeHighWarning);
        }
        None
    }

    fn gas_price_error(&self) -> Option<GasFormError> {
        if self.supports_eip1559 || self.estimates.is_none() {
            return None;
        }
        self.gas_price.is_zero().then_some(GasFormError::GasPriceTooLow)
    }
}

/// Whether the sender cannot cover value plus worst-case gas.
pub fn balance_error(balance: U256, tx_value: U256, maximum_cost: U256) -> bool {
    balance < tx_value.saturating_add(maximum_cost)
}
