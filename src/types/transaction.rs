//! Transaction types.
//!
//! These mirror the wallet's transaction records on the wire: camelCase keys
//! and hex-quantity values. The engine reads them and produces patches; it
//! never owns or persists the record itself.

use alloy::primitives::{Address, ChainId, U256};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// A unique ID for a transaction record.
#[derive(Debug, Display, Clone, Eq, PartialEq, FromStr, Hash, Serialize, Deserialize)]
pub struct TxId(String);

impl TxId {
    /// Create a new unique ID from a string.
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Borrow the internal identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The named estimate tier a transaction's fee choice is associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserFeeLevel {
    /// The low estimate tier.
    Low,
    /// The medium estimate tier.
    Medium,
    /// The high estimate tier.
    High,
    /// Fees were set by hand.
    Custom,
    /// Fees were copied from the requesting dapp's suggestion.
    DappSuggested,
    /// The dapp's suggestion exceeded the high estimate tier.
    DappSuggestedHigh,
    /// Fees were bumped from a prior transaction by the minimum increment.
    TenPercentIncreased,
}

impl UserFeeLevel {
    /// Returns the matching estimate map level, if this is a named tier.
    pub const fn estimate_level(&self) -> Option<crate::types::EstimateLevel> {
        use crate::types::EstimateLevel;
        match self {
            Self::Low => Some(EstimateLevel::Low),
            Self::Medium => Some(EstimateLevel::Medium),
            Self::High => Some(EstimateLevel::High),
            _ => None,
        }
    }

    /// Returns the str identifier.
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Custom => "custom",
            Self::DappSuggested => "dappSuggested",
            Self::DappSuggestedHigh => "dappSuggestedHigh",
            Self::TenPercentIncreased => "tenPercentIncreased",
        }
    }
}

impl std::fmt::Display for UserFeeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How fee edits are routed for the transaction under edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditGasMode {
    /// Edits patch the transaction record in place.
    #[default]
    ModifyInPlace,
    /// Edits are dispatched to the swaps flow instead of the record.
    Swaps,
    /// Edits build a replacement transaction to accelerate the original.
    SpeedUp,
    /// Edits build a replacement transaction to abort the original.
    Cancel,
}

impl EditGasMode {
    /// Whether edits in this mode target a transient retry clone rather than
    /// the live transaction.
    pub const fn is_retry(&self) -> bool {
        matches!(self, Self::SpeedUp | Self::Cancel)
    }
}

/// Execution parameters of a transaction, as carried by the record.
///
/// Exactly one fee model is populated at a time: legacy transactions carry
/// `gasPrice`, fee-market transactions carry `maxFeePerGas` and
/// `maxPriorityFeePerGas`. All quantities are hex wei on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxParams {
    /// Sender address.
    #[serde(default)]
    pub from: Address,
    /// Value transferred by the transaction, in wei.
    #[serde(default)]
    pub value: U256,
    /// Gas limit.
    #[serde(default, with = "alloy::serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    /// Legacy gas price, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// EIP-1559 fee cap, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// EIP-1559 priority fee, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
}

impl TxParams {
    /// Whether these parameters follow the legacy fee model: a gas price and
    /// neither EIP-1559 field.
    pub fn is_legacy(&self) -> bool {
        self.gas_price.is_some()
            && self.max_fee_per_gas.is_none()
            && self.max_priority_fee_per_gas.is_none()
    }
}

/// Fee parameters of a transaction before it was replaced, snapshotted so a
/// speed-up or cancel bump always increments from the original values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousGasParams {
    /// Gas limit of the original transaction.
    #[serde(default, with = "alloy::serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Legacy gas price of the original transaction, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// Fee cap of the original transaction, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// Priority fee of the original transaction, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
}

impl From<&TxParams> for PreviousGasParams {
    fn from(params: &TxParams) -> Self {
        Self {
            gas_limit: params.gas,
            gas_price: params.gas_price,
            max_fee_per_gas: params.max_fee_per_gas,
            max_priority_fee_per_gas: params.max_priority_fee_per_gas,
        }
    }
}

/// Gas values the requesting dapp attached to the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappSuggestedGasFees {
    /// Suggested gas limit.
    #[serde(default, with = "alloy::serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    /// Suggested legacy gas price, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// Suggested fee cap, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// Suggested priority fee, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
}

/// A pending transaction record, as owned by the wallet's transaction store.
///
/// The engine treats this as read-only input; all mutation goes through
/// [`TransactionStore`](crate::store::TransactionStore) patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    /// Unique ID of the record.
    pub id: TxId,
    /// Chain the transaction targets.
    #[serde(with = "alloy::serde::quantity")]
    pub chain_id: ChainId,
    /// Execution parameters.
    pub tx_params: TxParams,
    /// Estimate tier the current fee values were taken from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fee_level: Option<UserFeeLevel>,
    /// Gas values suggested by the requesting dapp, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dapp_suggested_gas_fees: Option<DappSuggestedGasFees>,
    /// Gas limit originally estimated for the transaction.
    #[serde(default, with = "alloy::serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub original_gas_estimate: Option<u64>,
    /// Whether the user replaced the estimated gas limit by hand.
    #[serde(default)]
    pub user_edited_gas_limit: bool,
    /// Gas limit estimate without the safety buffer, when the estimation
    /// pipeline recorded one. Preferred for cost bounds.
    #[serde(default, with = "alloy::serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub gas_limit_no_buffer: Option<u64>,
    /// Fee snapshot of the transaction this record replaces, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_gas: Option<PreviousGasParams>,
    /// Estimate tier that was suggested when fees were last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_suggested: Option<UserFeeLevel>,
    /// Whether simulating the transaction failed.
    #[serde(default)]
    pub simulation_fails: bool,
}

impl TransactionMeta {
    /// Creates a record with the given id, chain and parameters; remaining
    /// fields empty.
    pub fn new(id: TxId, chain_id: ChainId, tx_params: TxParams) -> Self {
        Self {
            id,
            chain_id,
            tx_params,
            user_fee_level: None,
            dapp_suggested_gas_fees: None,
            original_gas_estimate: None,
            user_edited_gas_limit: false,
            gas_limit_no_buffer: None,
            previous_gas: None,
            estimate_suggested: None,
            simulation_fails: false,
        }
    }

    /// Whether the fee parameters were set by hand: no named estimate tier is
    /// recorded, or the tier is explicitly custom.
    pub fn has_custom_fees(&self) -> bool {
        self.user_fee_level.is_none() || self.user_fee_level == Some(UserFeeLevel::Custom)
    }
}
