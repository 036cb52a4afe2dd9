//! Fee mutation payloads.

use crate::{
    constants::RETRY_FEE_BUMP_PERCENT,
    fields::FeeField,
    types::{
        EditGasMode, EstimateLevel, GasFeeEstimates, PreviousGasParams, TransactionMeta,
        UserFeeLevel,
    },
    units,
};
use alloy::primitives::U256;

/// A requested fee change.
///
/// Absent fields fall back to the engine's currently resolved values when the
/// update is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeUpdate {
    /// Estimate tier the new values were taken from.
    pub estimate_used: UserFeeLevel,
    /// New gas limit.
    pub gas_limit: Option<u64>,
    /// New legacy gas price, in wei.
    pub gas_price: Option<U256>,
    /// New fee cap, in wei.
    pub max_fee_per_gas: Option<U256>,
    /// New priority fee, in wei.
    pub max_priority_fee_per_gas: Option<U256>,
    /// Tier that was suggested at the time of the edit, for later analysis.
    pub estimate_suggested: Option<UserFeeLevel>,
}

impl FeeUpdate {
    /// Creates an update that re-resolves every fee field under the given tier.
    pub fn new(estimate_used: UserFeeLevel) -> Self {
        Self {
            estimate_used,
            gas_limit: None,
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            estimate_suggested: None,
        }
    }

    /// Sets the gas limit.
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Sets the legacy gas price, in wei.
    pub fn with_gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Sets the fee cap, in wei.
    pub fn with_max_fee_per_gas(mut self, max_fee_per_gas: U256) -> Self {
        self.max_fee_per_gas = Some(max_fee_per_gas);
        self
    }

    /// Sets the priority fee, in wei.
    pub fn with_max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: U256) -> Self {
        self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        self
    }

    /// Sets the suggested tier.
    pub fn with_estimate_suggested(mut self, estimate_suggested: UserFeeLevel) -> Self {
        self.estimate_suggested = Some(estimate_suggested);
        self
    }
}

/// The draft replacement transaction a speed-up or cancel edits.
///
/// Holds a copy of the live record so retry edits never touch it; the caller
/// submits the draft as the replacement. The fee snapshot of the original is
/// captured once, on construction.
#[derive(Debug, Clone)]
pub struct RetryContext {
    mode: EditGasMode,
    tx_meta: TransactionMeta,
}

impl RetryContext {
    /// Starts a retry of the given transaction.
    pub fn new(mode: EditGasMode, live: &TransactionMeta) -> Self {
        let mut tx_meta = live.clone();
        if tx_meta.previous_gas.is_none() {
            tx_meta.previous_gas = Some(PreviousGasParams::from(&tx_meta.tx_params));
        }
        Self { mode, tx_meta }
    }

    /// The retry flavor.
    pub const fn mode(&self) -> EditGasMode {
        self.mode
    }

    /// The draft under edit.
    pub const fn tx_meta(&self) -> &TransactionMeta {
        &self.tx_meta
    }

    pub(crate) fn tx_meta_mut(&mut self) -> &mut TransactionMeta {
        &mut self.tx_meta
    }
}

/// Fee values bumped for a replacement transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpedFees {
    /// Gas limit carried over from the source.
    pub gas_limit: Option<u64>,
    /// Bumped legacy gas price, in wei.
    pub gas_price: Option<U256>,
    /// Bumped fee cap, in wei.
    pub max_fee_per_gas: Option<U256>,
    /// Bumped priority fee, in wei.
    pub max_priority_fee_per_gas: Option<U256>,
    /// Tier to record on the update.
    pub estimate_used: UserFeeLevel,
}

/// Raises the source fees by ten percent, rounding half up.
///
/// A zero or absent priority fee on a fee-market source cannot simply be
/// bumped: nodes require a replacement's priority fee to strictly exceed the
/// original's, and ten percent of zero is zero. The medium suggested priority
/// fee stands in as the increment base and the result is recorded as a custom
/// edit. Without estimates to substitute from, the zero rides through.
pub fn ten_percent_increased_fees(
    source: &PreviousGasParams,
    estimates: &GasFeeEstimates,
) -> BumpedFees {
    let bump = |value: U256| units::increase_by_percent(value, RETRY_FEE_BUMP_PERCENT);

    let mut estimate_used = UserFeeLevel::TenPercentIncreased;
    let priority = source.max_priority_fee_per_gas.filter(|value| !value.is_zero());
    let max_priority_fee_per_gas = match priority {
        Some(value) => Some(bump(value)),
        None if source.max_fee_per_gas.is_some() => {
            match FeeField::MaxPriorityFee.suggestion(estimates, EstimateLevel::Medium) {
                Some(suggested) => {
                    estimate_used = UserFeeLevel::Custom;
                    Some(bump(suggested))
                }
                None => source.max_priority_fee_per_gas.map(bump),
            }
        }
        None => source.max_priority_fee_per_gas.map(bump),
    };

    BumpedFees {
        gas_limit: source.gas_limit,
        gas_price: source.gas_price.map(bump),
        max_fee_per_gas: source.max_fee_per_gas.map(bump),
        max_priority_fee_per_gas,
        estimate_used,
    }
}
