//! Host traits for persistence and balance lookup.
//!
//! The transaction record is owned by the wallet's transaction store; the
//! engine mutates it exclusively through [`TransactionStore`] patches and
//! never assigns fields on a record it reads. Hosts with async storage adapt
//! behind these synchronous seams.

use crate::types::{TransactionMeta, TxId, UserFeeLevel};
use alloy::primitives::{Address, ChainId, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A gas-fee patch for a transaction record.
///
/// Fee fields merge: an absent field leaves the record's value in place. The
/// gas limit is always written. A patch never touches the record's
/// [`previous_gas`](TransactionMeta::previous_gas) snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxGasPatch {
    /// Estimate tier the new fee values were taken from.
    pub user_fee_level: UserFeeLevel,
    /// Gas limit to record.
    #[serde(with = "alloy::serde::quantity")]
    pub gas: u64,
    /// New legacy gas price, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// New fee cap, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// New priority fee, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    /// Estimate tier that was suggested at the time of the edit.
    pub estimate_suggested: UserFeeLevel,
    /// Whether this edit replaced the estimated gas limit by hand.
    #[serde(default)]
    pub user_edited_gas_limit: bool,
}

impl TxGasPatch {
    /// Applies the patch to a record, the way the store would.
    pub fn apply_to(&self, meta: &mut TransactionMeta) {
        meta.user_fee_level = Some(self.user_fee_level);
        meta.estimate_suggested = Some(self.estimate_suggested);
        meta.tx_params.gas = Some(self.gas);
        if let Some(gas_price) = self.gas_price {
            meta.tx_params.gas_price = Some(gas_price);
        }
        if let Some(max_fee_per_gas) = self.max_fee_per_gas {
            meta.tx_params.max_fee_per_gas = Some(max_fee_per_gas);
        }
        if let Some(max_priority_fee_per_gas) = self.max_priority_fee_per_gas {
            meta.tx_params.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        }
        if self.user_edited_gas_limit {
            meta.user_edited_gas_limit = true;
        }
    }
}

/// A fee update routed to the swaps flow instead of the transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapFeeUpdate {
    /// The transaction the swap belongs to.
    pub id: TxId,
    /// Estimate tier the new fee values were taken from.
    pub estimate_used: UserFeeLevel,
    /// Gas limit for the swap transaction.
    #[serde(with = "alloy::serde::quantity")]
    pub gas: u64,
    /// New legacy gas price, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// New fee cap, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// New priority fee, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Persistence seam to the wallet's transaction store.
pub trait TransactionStore {
    /// Patches the gas fees of a transaction record.
    fn patch_gas(&self, id: &TxId, patch: &TxGasPatch) -> eyre::Result<()>;

    /// Dispatches a swap-specific fee update.
    fn update_swap_fees(&self, update: &SwapFeeUpdate) -> eyre::Result<()>;
}

impl<T: TransactionStore + ?Sized> TransactionStore for Arc<T> {
    fn patch_gas(&self, id: &TxId, patch: &TxGasPatch) -> eyre::Result<()> {
        (**self).patch_gas(id, patch)
    }

    fn update_swap_fees(&self, update: &SwapFeeUpdate) -> eyre::Result<()> {
        (**self).update_swap_fees(update)
    }
}

/// Balance seam to the wallet's account tracker.
pub trait BalanceLookup {
    /// Returns the sender's balance in wei, zero when unknown.
    fn balance_of(&self, address: Address, chain_id: ChainId) -> U256;
}

impl<T: BalanceLookup + ?Sized> BalanceLookup for Arc<T> {
    fn balance_of(&self, address: Address, chain_id: ChainId) -> U256 {
        (**self).balance_of(address, chain_id)
    }
}
