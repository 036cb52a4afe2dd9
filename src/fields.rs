//! Per-field fee resolution.
//!
//! The three user-facing fee fields (`gasPrice`, `maxFeePerGas`,
//! `maxPriorityFeePerGas`) resolve through the same precedence: an inactive
//! field is pinned to zero, a manual override wins outright, and an automatic
//! field tracks the selected estimate tier, falling back to the transaction's
//! own params when no suggestion applies. Fallback chains skip zero values so
//! a zeroed param never shadows a later one.

use crate::types::{EstimateLevel, GasFeeEstimates, TransactionMeta, TxParams, UserFeeLevel};
use alloy::primitives::U256;

/// Where a fee field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeSource {
    /// Track the live estimates.
    #[default]
    Auto,
    /// Pinned to a user-entered value, in wei.
    Manual(U256),
}

impl FeeSource {
    /// Returns true if the field is pinned to a user-entered value.
    pub const fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }
}

/// One of the three user-facing fee fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeField {
    /// The legacy `gasPrice` field.
    GasPrice,
    /// The EIP-1559 `maxFeePerGas` field.
    MaxFee,
    /// The EIP-1559 `maxPriorityFeePerGas` field.
    MaxPriorityFee,
}

impl FeeField {
    /// Whether the field participates in the given fee model.
    pub const fn active_for(&self, supports_eip1559: bool) -> bool {
        match self {
            Self::GasPrice => !supports_eip1559,
            Self::MaxFee | Self::MaxPriorityFee => supports_eip1559,
        }
    }

    /// The field's fallback from transaction params, skipping zero values.
    pub fn tx_fallback(&self, params: &TxParams) -> Option<U256> {
        let nonzero = |value: Option<U256>| value.filter(|v| !v.is_zero());
        match self {
            Self::GasPrice => nonzero(params.gas_price),
            Self::MaxFee => nonzero(params.max_fee_per_gas).or_else(|| nonzero(params.gas_price)),
            Self::MaxPriorityFee => nonzero(params.max_priority_fee_per_gas)
                .or_else(|| nonzero(params.max_fee_per_gas))
                .or_else(|| nonzero(params.gas_price)),
        }
    }

    /// The field's suggested value at an estimate tier, if the feed carries one.
    pub fn suggestion(&self, estimates: &GasFeeEstimates, level: EstimateLevel) -> Option<U256> {
        match self {
            Self::GasPrice => estimates.legacy_suggestion(level),
            Self::MaxFee => {
                estimates.fee_market().map(|market| market.level(level).suggested_max_fee_per_gas)
            }
            Self::MaxPriorityFee => estimates
                .fee_market()
                .map(|market| market.level(level).suggested_max_priority_fee_per_gas),
        }
    }

    /// The field's source when an engine first attaches to a transaction.
    ///
    /// A transaction carrying custom fees pins the field to its own params so
    /// a reopened edit form shows what was saved, not a fresh estimate.
    pub fn seed(&self, meta: &TransactionMeta, supports_eip1559: bool) -> FeeSource {
        if !self.active_for(supports_eip1559) || !meta.has_custom_fees() {
            return FeeSource::Auto;
        }
        match self.tx_fallback(&meta.tx_params) {
            Some(value) => FeeSource::Manual(value),
            None => FeeSource::Auto,
        }
    }

    /// Resolves the field's effective value in wei.
    pub fn resolve(
        &self,
        source: FeeSource,
        estimate_to_use: Option<UserFeeLevel>,
        params: &TxParams,
        estimates: &GasFeeEstimates,
        supports_eip1559: bool,
    ) -> U256 {
        if !self.active_for(supports_eip1559) {
            return U256::ZERO;
        }
        match source {
            FeeSource::Manual(value) => value,
            FeeSource::Auto => estimate_to_use
                .and_then(|level| level.estimate_level())
                .and_then(|level| self.suggestion(estimates, level))
                .or_else(|| self.tx_fallback(params))
                .unwrap_or(U256::ZERO),
        }
    }
}
