//! The gas fee input engine.
//!
//! [`FeeEngine`] reconciles four inputs into one coherent fee state: the
//! transaction under edit, the latest estimate snapshot, the user's per-field
//! overrides, and the selected estimate tier. Every [`recompute`] is a pure
//! function of those inputs; the engine holds no derived state between calls.
//!
//! Override rule: a field set through the manual path dominates every future
//! feed update until the user selects a tier again. When the fee model flips
//! (the network or the transaction changes), the EIP-1559 fields are reseeded
//! from the transaction exactly once per flip.
//!
//! [`recompute`]: FeeEngine::recompute

use crate::{
    config::EngineConfig,
    cost::CostContext,
    error::EngineError,
    feed::{EstimateFeed, FeedSnapshot},
    fields::{FeeField, FeeSource},
    mutation::{FeeUpdate, RetryContext, ten_percent_increased_fees},
    store::{BalanceLookup, SwapFeeUpdate, TransactionStore, TxGasPatch},
    types::{
        EditGasMode, EstimateLevel, FeeInputState, PreviousGasParams, TransactionMeta,
        UserFeeLevel,
    },
    validation::{self, GasFormInputs},
};
use alloy::primitives::U256;
use tracing::{debug, instrument, trace};

/// Effective field values under the current snapshot and fee model.
struct Resolution {
    snapshot: FeedSnapshot,
    transaction: TransactionMeta,
    supports_eip1559: bool,
    gas_price: U256,
    max_fee_per_gas: U256,
    max_priority_fee_per_gas: U256,
}

/// Gas fee input engine for a single transaction.
///
/// One engine instance edits one transaction; two instances on the same
/// record are not supported. The engine never writes the record directly:
/// commits go through the [`TransactionStore`] seam, and speed-up or cancel
/// edits land on a [`RetryContext`] draft instead of the live record.
#[derive(Debug)]
pub struct FeeEngine<S, B> {
    /// The live transaction record, mirrored locally after each commit.
    transaction: TransactionMeta,
    edit_gas_mode: EditGasMode,
    feed: EstimateFeed,
    store: S,
    balances: B,
    config: EngineConfig,
    /// Whether the network and account support the EIP-1559 fee model.
    network_supports_1559: bool,
    gas_price: FeeSource,
    max_fee_per_gas: FeeSource,
    max_priority_fee_per_gas: FeeSource,
    gas_limit: u64,
    /// Selected tier, `custom` once the user took over, `None` only before
    /// the first selection on a transaction without one.
    estimate_to_use: Option<UserFeeLevel>,
    /// Fee model the field sources were last seeded under.
    last_synced_support: bool,
    retry: Option<RetryContext>,
}

impl<S: TransactionStore, B: BalanceLookup> FeeEngine<S, B> {
    /// Creates an engine with the default configuration.
    pub fn new(
        transaction: TransactionMeta,
        edit_gas_mode: EditGasMode,
        feed: EstimateFeed,
        store: S,
        balances: B,
        network_supports_1559: bool,
    ) -> Self {
        Self::with_config(
            transaction,
            edit_gas_mode,
            feed,
            store,
            balances,
            network_supports_1559,
            EngineConfig::default(),
        )
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(
        transaction: TransactionMeta,
        edit_gas_mode: EditGasMode,
        feed: EstimateFeed,
        store: S,
        balances: B,
        network_supports_1559: bool,
        config: EngineConfig,
    ) -> Self {
        let supports_eip1559 = network_supports_1559 && !transaction.tx_params.is_legacy();
        let gas_price = FeeField::GasPrice.seed(&transaction, supports_eip1559);
        let max_fee_per_gas = FeeField::MaxFee.seed(&transaction, supports_eip1559);
        let max_priority_fee_per_gas =
            FeeField::MaxPriorityFee.seed(&transaction, supports_eip1559);
        let gas_limit = transaction.tx_params.gas.unwrap_or(config.minimum_gas_limit());
        let estimate_to_use =
            transaction.user_fee_level.or(Some(config.default_estimate().into()));
        Self {
            transaction,
            edit_gas_mode,
            feed,
            store,
            balances,
            config,
            network_supports_1559,
            gas_price,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            gas_limit,
            estimate_to_use,
            last_synced_support: supports_eip1559,
            retry: None,
        }
    }

    /// The live transaction record as last committed.
    pub fn transaction(&self) -> &TransactionMeta {
        &self.transaction
    }

    /// The replacement draft, once a speed-up or cancel has started.
    pub fn retry_tx_meta(&self) -> Option<&TransactionMeta> {
        self.retry.as_ref().map(RetryContext::tx_meta)
    }

    /// The transaction the form is editing: the retry draft when present,
    /// otherwise the live record.
    pub fn active_transaction(&self) -> &TransactionMeta {
        self.retry.as_ref().map(RetryContext::tx_meta).unwrap_or(&self.transaction)
    }

    /// The edit flow the engine routes commits through.
    pub const fn edit_gas_mode(&self) -> EditGasMode {
        self.edit_gas_mode
    }

    /// The engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pins the legacy gas price to a user-entered value, in wei.
    pub fn set_gas_price(&mut self, gas_price: U256) {
        self.gas_price = FeeSource::Manual(gas_price);
    }

    /// Pins the fee cap to a user-entered value, in wei.
    pub fn set_max_fee_per_gas(&mut self, max_fee_per_gas: U256) {
        self.max_fee_per_gas = FeeSource::Manual(max_fee_per_gas);
    }

    /// Pins the priority fee to a user-entered value, in wei.
    pub fn set_max_priority_fee_per_gas(&mut self, max_priority_fee_per_gas: U256) {
        self.max_priority_fee_per_gas = FeeSource::Manual(max_priority_fee_per_gas);
    }

    /// Sets the gas limit under edit.
    pub fn set_gas_limit(&mut self, gas_limit: u64) {
        self.gas_limit = gas_limit;
    }

    /// Updates whether the network and account support EIP-1559.
    ///
    /// The fee model is re-derived on the next recomputation and the fields
    /// reseed from the transaction once per flip.
    pub fn set_network_support(&mut self, network_supports_1559: bool) {
        self.network_supports_1559 = network_supports_1559;
    }

    /// Selects an estimate tier, releasing every manual override.
    pub fn set_estimate_to_use(&mut self, level: EstimateLevel) {
        self.estimate_to_use = Some(level.into());
        self.gas_price = FeeSource::Auto;
        self.max_fee_per_gas = FeeSource::Auto;
        self.max_priority_fee_per_gas = FeeSource::Auto;
    }

    /// Marks the form as manually edited.
    ///
    /// The current effective values freeze in place as explicit overrides so
    /// later feed updates cannot move them, the tier switches to `custom`,
    /// and an out-of-bounds gas limit snaps back to
    /// `max(transaction gas, minimum)`.
    pub fn on_manual_change(&mut self) {
        let resolution = self.resolve();
        if resolution.supports_eip1559 {
            self.max_fee_per_gas = FeeSource::Manual(resolution.max_fee_per_gas);
            self.max_priority_fee_per_gas =
                FeeSource::Manual(resolution.max_priority_fee_per_gas);
        } else {
            self.gas_price = FeeSource::Manual(resolution.gas_price);
        }
        self.estimate_to_use = Some(UserFeeLevel::Custom);
        let minimum = self.config.minimum_gas_limit();
        if self.gas_limit < minimum {
            let transaction_gas = resolution.transaction.tx_params.gas.unwrap_or(minimum);
            self.gas_limit = transaction_gas.max(minimum);
        }
    }

    /// Derives the full fee state from the latest estimate snapshot.
    pub fn recompute(&mut self) -> FeeInputState {
        let resolution = self.resolve();
        let params = &resolution.transaction.tx_params;

        let cost_gas_limit = resolution.transaction.gas_limit_no_buffer.unwrap_or(self.gas_limit);
        let bounds = CostContext {
            gas_limit: cost_gas_limit,
            gas_price: resolution.gas_price,
            max_fee_per_gas: resolution.max_fee_per_gas,
            max_priority_fee_per_gas: resolution.max_priority_fee_per_gas,
            estimated_base_fee: resolution.snapshot.estimates.estimated_base_fee(),
            supports_eip1559: resolution.supports_eip1559,
        }
        .bounds();

        let gas_errors = GasFormInputs {
            gas_limit: self.gas_limit,
            minimum_gas_limit: self.config.minimum_gas_limit(),
            gas_price: resolution.gas_price,
            max_fee_per_gas: resolution.max_fee_per_gas,
            max_priority_fee_per_gas: resolution.max_priority_fee_per_gas,
            estimates: &resolution.snapshot.estimates,
            supports_eip1559: resolution.supports_eip1559,
            high_fee_warning_percent: self.config.high_fee_warning_percent(),
        }
        .validate();

        let balance = self.balances.balance_of(params.from, resolution.transaction.chain_id);
        let balance_error = validation::balance_error(balance, params.value, bounds.maximum);

        // The snapshot's own flag covers feed startup; the type check covers a
        // feed still serving the other fee model after a network switch.
        let is_gas_estimates_loading = resolution.snapshot.is_gas_estimates_loading
            || FeedSnapshot::estimates_loading(
                resolution.snapshot.estimates.estimate_type(),
                self.network_supports_1559,
            );

        FeeInputState {
            gas_limit: self.gas_limit,
            gas_price: resolution.gas_price,
            max_fee_per_gas: resolution.max_fee_per_gas,
            max_priority_fee_per_gas: resolution.max_priority_fee_per_gas,
            estimate_to_use: self.estimate_to_use,
            estimate_used: self.estimate_used(resolution.supports_eip1559),
            minimum_cost: bounds.minimum,
            maximum_cost: bounds.maximum,
            balance_error,
            has_gas_errors: gas_errors.has_blocking(),
            gas_errors,
            has_simulation_error: resolution.transaction.simulation_fails,
            supports_eip1559: resolution.supports_eip1559,
            is_gas_estimates_loading,
            is_network_busy: resolution.snapshot.is_network_busy,
        }
    }

    /// Commits a fee change through the route the edit mode selects.
    ///
    /// Absent fee fields are filled from the currently resolved values, so a
    /// commit always writes a complete set for the active fee model. After a
    /// successful commit the overrides release and the engine tracks the
    /// committed tier.
    #[instrument(skip_all, fields(tx = %self.transaction.id, mode = ?self.edit_gas_mode))]
    pub fn update_transaction(&mut self, update: FeeUpdate) -> Result<(), EngineError> {
        self.ensure_retry_context();
        let resolution = self.resolve();

        let gas = update.gas_limit.unwrap_or(self.gas_limit);
        let user_edited_gas_limit = update
            .gas_limit
            .is_some_and(|limit| resolution.transaction.original_gas_estimate != Some(limit));

        let mut patch = TxGasPatch {
            user_fee_level: update.estimate_used,
            gas,
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            estimate_suggested: update
                .estimate_suggested
                .unwrap_or_else(|| self.config.default_estimate().into()),
            user_edited_gas_limit,
        };
        if resolution.supports_eip1559 {
            patch.max_fee_per_gas =
                Some(update.max_fee_per_gas.unwrap_or(resolution.max_fee_per_gas));
            patch.max_priority_fee_per_gas = Some(
                update.max_priority_fee_per_gas.unwrap_or(resolution.max_priority_fee_per_gas),
            );
        } else {
            patch.gas_price = Some(update.gas_price.unwrap_or(resolution.gas_price));
        }

        match self.edit_gas_mode {
            EditGasMode::Swaps => {
                let swap = SwapFeeUpdate {
                    id: resolution.transaction.id.clone(),
                    estimate_used: update.estimate_used,
                    gas,
                    gas_price: patch.gas_price,
                    max_fee_per_gas: patch.max_fee_per_gas,
                    max_priority_fee_per_gas: patch.max_priority_fee_per_gas,
                };
                self.store.update_swap_fees(&swap).map_err(EngineError::Store)?;
            }
            EditGasMode::SpeedUp | EditGasMode::Cancel => {
                if let Some(retry) = &mut self.retry {
                    patch.apply_to(retry.tx_meta_mut());
                }
                self.track_committed(update.estimate_used, gas);
            }
            EditGasMode::ModifyInPlace => {
                self.store.patch_gas(&self.transaction.id, &patch).map_err(EngineError::Store)?;
                patch.apply_to(&mut self.transaction);
                self.track_committed(update.estimate_used, gas);
            }
        }
        Ok(())
    }

    /// Raises the fees ten percent over the original transaction's.
    ///
    /// The increment base is the captured fee snapshot when one exists, else
    /// the transaction's own params. `init_transaction` marks the automatic
    /// bump a retry flow opens with, which records the default tier as the
    /// suggestion instead of `tenPercentIncreased`.
    pub fn update_transaction_to_ten_percent_increased_gas_fee(
        &mut self,
        init_transaction: bool,
    ) -> Result<(), EngineError> {
        self.ensure_retry_context();
        let active = self.active_transaction();
        let source = active
            .previous_gas
            .clone()
            .unwrap_or_else(|| PreviousGasParams::from(&active.tx_params));
        let estimates = self.feed.latest().estimates;
        let bumped = ten_percent_increased_fees(&source, &estimates);

        let mut update = FeeUpdate::new(bumped.estimate_used).with_estimate_suggested(
            if init_transaction {
                self.config.default_estimate().into()
            } else {
                UserFeeLevel::TenPercentIncreased
            },
        );
        update.gas_limit = bumped.gas_limit;
        update.gas_price = bumped.gas_price;
        update.max_fee_per_gas = bumped.max_fee_per_gas;
        update.max_priority_fee_per_gas = bumped.max_priority_fee_per_gas;
        self.update_transaction(update)
    }

    /// Applies an estimate tier's suggested values verbatim.
    ///
    /// Does nothing unless the feed carries fee market estimates.
    pub fn update_transaction_using_estimate(
        &mut self,
        level: EstimateLevel,
    ) -> Result<(), EngineError> {
        let snapshot = self.feed.latest();
        let Some(market) = snapshot.estimates.fee_market() else {
            debug!(%level, "no fee market estimates, skipping estimate update");
            return Ok(());
        };
        let tier = market.level(level);
        let update = FeeUpdate::new(level.into())
            .with_max_fee_per_gas(tier.suggested_max_fee_per_gas)
            .with_max_priority_fee_per_gas(tier.suggested_max_priority_fee_per_gas);
        self.update_transaction(update)
    }

    /// Applies the dapp's suggested gas values verbatim.
    ///
    /// Does nothing when the transaction carries no dapp suggestion.
    pub fn update_transaction_using_dapp_suggested_values(
        &mut self,
    ) -> Result<(), EngineError> {
        let Some(dapp) = self.active_transaction().dapp_suggested_gas_fees.clone() else {
            debug!("transaction carries no dapp suggested fees, skipping");
            return Ok(());
        };
        let mut update = FeeUpdate::new(UserFeeLevel::DappSuggested);
        update.gas_limit = dapp.gas;
        update.gas_price = dapp.gas_price;
        update.max_fee_per_gas = dapp.max_fee_per_gas;
        update.max_priority_fee_per_gas = dapp.max_priority_fee_per_gas;
        self.update_transaction(update)
    }

    /// Opens a speed-up: a replacement draft with fees bumped ten percent.
    pub fn speed_up_transaction(&mut self) -> Result<(), EngineError> {
        self.begin_retry(EditGasMode::SpeedUp)
    }

    /// Opens a cancel: a replacement draft with fees bumped ten percent.
    pub fn cancel_transaction(&mut self) -> Result<(), EngineError> {
        self.begin_retry(EditGasMode::Cancel)
    }

    fn begin_retry(&mut self, mode: EditGasMode) -> Result<(), EngineError> {
        self.edit_gas_mode = mode;
        self.retry = Some(RetryContext::new(mode, &self.transaction));
        self.update_transaction_to_ten_percent_increased_gas_fee(true)
    }

    fn ensure_retry_context(&mut self) {
        if self.edit_gas_mode.is_retry() && self.retry.is_none() {
            self.retry = Some(RetryContext::new(self.edit_gas_mode, &self.transaction));
        }
    }

    /// Resolves all three fields under the latest snapshot, reseeding the
    /// EIP-1559 fields first if the fee model flipped since the last call.
    fn resolve(&mut self) -> Resolution {
        let snapshot = self.feed.latest();
        let transaction = self.active_transaction().clone();
        let supports_eip1559 = self.network_supports_1559 && !transaction.tx_params.is_legacy();
        if supports_eip1559 != self.last_synced_support {
            trace!(supports_eip1559, "fee model flipped, reseeding fields");
            self.max_fee_per_gas = FeeField::MaxFee.seed(&transaction, supports_eip1559);
            self.max_priority_fee_per_gas =
                FeeField::MaxPriorityFee.seed(&transaction, supports_eip1559);
            self.last_synced_support = supports_eip1559;
        }

        let params = &transaction.tx_params;
        let gas_price = FeeField::GasPrice.resolve(
            self.gas_price,
            self.estimate_to_use,
            params,
            &snapshot.estimates,
            supports_eip1559,
        );
        let max_fee_per_gas = FeeField::MaxFee.resolve(
            self.max_fee_per_gas,
            self.estimate_to_use,
            params,
            &snapshot.estimates,
            supports_eip1559,
        );
        let max_priority_fee_per_gas = FeeField::MaxPriorityFee.resolve(
            self.max_priority_fee_per_gas,
            self.estimate_to_use,
            params,
            &snapshot.estimates,
            supports_eip1559,
        );
        Resolution {
            snapshot,
            transaction,
            supports_eip1559,
            gas_price,
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }
    }

    /// The tier the resolved values are effectively taken from.
    fn estimate_used(&self, supports_eip1559: bool) -> UserFeeLevel {
        let manual = if supports_eip1559 {
            self.max_fee_per_gas.is_manual() || self.max_priority_fee_per_gas.is_manual()
        } else {
            self.gas_price.is_manual()
        };
        if manual {
            UserFeeLevel::Custom
        } else {
            self.estimate_to_use.unwrap_or(UserFeeLevel::Custom)
        }
    }

    fn track_committed(&mut self, estimate_used: UserFeeLevel, gas: u64) {
        self.estimate_to_use = Some(estimate_used);
        self.gas_price = FeeSource::Auto;
        self.max_fee_per_gas = FeeSource::Auto;
        self.max_priority_fee_per_gas = FeeSource::Auto;
        self.gas_limit = gas;
    }
}
