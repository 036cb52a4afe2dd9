//! Derived fee state.

use crate::{types::UserFeeLevel, validation::GasFormError};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Per-field validation results.
///
/// Each slot holds at most one code: the first matching rule for that field,
/// blocking or advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasErrors {
    /// Gas limit error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<GasFormError>,
    /// Legacy gas price error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<GasFormError>,
    /// Fee cap error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee: Option<GasFormError>,
    /// Priority fee error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee: Option<GasFormError>,
}

impl GasErrors {
    /// Whether any slot carries a blocking code. Warnings do not count.
    pub fn has_blocking(&self) -> bool {
        [self.gas_limit, self.gas_price, self.max_fee, self.max_priority_fee]
            .into_iter()
            .flatten()
            .any(|code| code.is_blocking())
    }

    /// Whether every slot is clear.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The reconciled fee state of the transaction under edit.
///
/// Recomputed from scratch on every [`recompute`](crate::engine::FeeEngine::recompute);
/// nothing here is persisted. Fee fields are resolved wei values and serialize
/// as decimal gwei strings; the cost bounds serialize as hex wei. Fields of
/// the inactive fee model are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeInputState {
    /// Gas limit under edit.
    pub gas_limit: u64,
    /// Resolved legacy gas price, in wei.
    #[serde(with = "crate::serde::gwei")]
    pub gas_price: U256,
    /// Resolved fee cap, in wei.
    #[serde(with = "crate::serde::gwei")]
    pub max_fee_per_gas: U256,
    /// Resolved priority fee, in wei.
    #[serde(with = "crate::serde::gwei")]
    pub max_priority_fee_per_gas: U256,
    /// The estimate selection in effect, `custom` once the user overrode it.
    pub estimate_to_use: Option<UserFeeLevel>,
    /// The tier the resolved values were actually taken from.
    pub estimate_used: UserFeeLevel,
    /// Lowest total cost the transaction can incur, in wei.
    #[serde(rename = "minimumCostInHexWei")]
    pub minimum_cost: U256,
    /// Highest total cost the transaction can incur, in wei.
    #[serde(rename = "maximumCostInHexWei")]
    pub maximum_cost: U256,
    /// Whether the sender's balance cannot cover value plus maximum cost.
    pub balance_error: bool,
    /// Per-field validation results.
    pub gas_errors: GasErrors,
    /// Whether any blocking error is present.
    pub has_gas_errors: bool,
    /// Whether simulating the transaction failed.
    pub has_simulation_error: bool,
    /// Whether the EIP-1559 fee model is in effect for this transaction.
    #[serde(rename = "supportsEIP1559")]
    pub supports_eip1559: bool,
    /// Whether the feed is still waiting for usable estimates.
    pub is_gas_estimates_loading: bool,
    /// Whether the network is congested.
    pub is_network_busy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_are_not_blocking() {
        let errors = GasErrors {
            max_fee: Some(GasFormError::MaxFeeTooLow),
            max_priority_fee: Some(GasFormError::MaxPriorityFeeHighWarning),
            ..Default::default()
        };
        assert!(!errors.has_blocking());
        assert!(!errors.is_empty());

        let errors = GasErrors {
            gas_limit: Some(GasFormError::GasLimitOutOfBounds),
            ..Default::default()
        };
        assert!(errors.has_blocking());
    }

    #[test]
    fn state_wire_vocabulary() {
        let state = FeeInputState {
            gas_limit: 21_000,
            gas_price: U256::ZERO,
            max_fee_per_gas: U256::from(1_500_000_000u64),
            max_priority_fee_per_gas: U256::from(1_000_000_000u64),
            estimate_to_use: Some(UserFeeLevel::Medium),
            estimate_used: UserFeeLevel::Medium,
            minimum_cost: U256::from(0x5208u64),
            maximum_cost: U256::from(0x5208u64),
            balance_error: false,
            gas_errors: GasErrors::default(),
            has_gas_errors: false,
            has_simulation_error: false,
            supports_eip1559: true,
            is_gas_estimates_loading: false,
            is_network_busy: false,
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["maxFeePerGas"], "1.5");
        assert_eq!(json["minimumCostInHexWei"], "0x5208");
        assert_eq!(json["supportsEIP1559"], true);
        assert_eq!(json["estimateUsed"], "medium");
    }
}
