//! End-to-end tests for the fee engine against recorded stores and fixed
//! balance lookups.

use alloy::primitives::{Address, ChainId, U256};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};
use txgas::{
    engine::FeeEngine,
    feed::{EstimateFeed, FeedSnapshot},
    mutation::FeeUpdate,
    store::{BalanceLookup, SwapFeeUpdate, TransactionStore, TxGasPatch},
    types::{
        DappSuggestedGasFees, EditGasMode, EstimateLevel, FeeMarketEstimate, FeeMarketEstimates,
        GasFeeEstimates, LegacyEstimates, PreviousGasParams, TransactionMeta, TxId, TxParams,
        UserFeeLevel,
    },
    validation::GasFormError,
};

/// Store that records every call for later assertions.
#[derive(Default)]
struct RecordingStore {
    patches: Mutex<Vec<(TxId, TxGasPatch)>>,
    swap_updates: Mutex<Vec<SwapFeeUpdate>>,
}

impl RecordingStore {
    fn patches(&self) -> Vec<(TxId, TxGasPatch)> {
        self.patches.lock().unwrap().clone()
    }

    fn swap_updates(&self) -> Vec<SwapFeeUpdate> {
        self.swap_updates.lock().unwrap().clone()
    }
}

impl TransactionStore for RecordingStore {
    fn patch_gas(&self, id: &TxId, patch: &TxGasPatch) -> eyre::Result<()> {
        self.patches.lock().unwrap().push((id.clone(), patch.clone()));
        Ok(())
    }

    fn update_swap_fees(&self, update: &SwapFeeUpdate) -> eyre::Result<()> {
        self.swap_updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}

struct FixedBalance(U256);

impl BalanceLookup for FixedBalance {
    fn balance_of(&self, _address: Address, _chain_id: ChainId) -> U256 {
        self.0
    }
}

fn gwei(value: u64) -> U256 {
    U256::from(value) * U256::from(1_000_000_000u64)
}

fn fee_market_estimates() -> GasFeeEstimates {
    let tier = |priority: u64, max: u64| FeeMarketEstimate {
        suggested_max_priority_fee_per_gas: gwei(priority),
        suggested_max_fee_per_gas: gwei(max),
        min_wait_time_estimate: 15_000,
        max_wait_time_estimate: 60_000,
    };
    GasFeeEstimates::FeeMarket(FeeMarketEstimates {
        low: tier(1, 20),
        medium: tier(2, 30),
        high: tier(3, 40),
        estimated_base_fee: gwei(18),
        network_congestion: Some(0.2),
    })
}

fn legacy_estimates() -> GasFeeEstimates {
    GasFeeEstimates::Legacy(LegacyEstimates { low: gwei(25), medium: gwei(32), high: gwei(41) })
}

fn meta(params: TxParams) -> TransactionMeta {
    TransactionMeta::new(TxId::new("tx-1".into()), 1, params)
}

fn fee_engine(
    transaction: TransactionMeta,
    mode: EditGasMode,
    feed: EstimateFeed,
    store: Arc<RecordingStore>,
) -> FeeEngine<Arc<RecordingStore>, FixedBalance> {
    FeeEngine::new(transaction, mode, feed, store, FixedBalance(U256::MAX), true)
}

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn legacy_transaction_with_sane_fields_is_clean() {
    let transaction = meta(TxParams {
        gas: Some(21_000),
        gas_price: Some(gwei(10)),
        ..Default::default()
    });
    let feed = EstimateFeed::fixed(FeedSnapshot::new(legacy_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, Arc::default());

    let state = engine.recompute();
    assert!(!state.supports_eip1559);
    assert_eq!(state.gas_price, gwei(10));
    assert_eq!(state.max_fee_per_gas, U256::ZERO);
    assert_eq!(state.max_priority_fee_per_gas, U256::ZERO);
    assert!(state.gas_errors.is_empty());
    assert!(!state.has_gas_errors);
}

#[test]
fn gas_limit_below_minimum_blocks_submission() {
    let transaction = meta(TxParams { gas_price: Some(gwei(10)), ..Default::default() });
    let feed = EstimateFeed::fixed(FeedSnapshot::new(legacy_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, Arc::default());

    engine.set_gas_limit(100);
    let state = engine.recompute();
    assert_eq!(state.gas_errors.gas_limit, Some(GasFormError::GasLimitOutOfBounds));
    assert!(state.has_gas_errors);
}

#[test]
fn fee_cap_below_priority_fee_blocks_submission() {
    let transaction = meta(TxParams::default());
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, Arc::default());

    engine.set_max_fee_per_gas(gwei(1));
    engine.set_max_priority_fee_per_gas(gwei(10));
    let state = engine.recompute();
    assert_eq!(state.gas_errors.max_fee, Some(GasFormError::MaxFeeImbalance));
    assert!(state.has_gas_errors);
    assert_eq!(state.estimate_used, UserFeeLevel::Custom);
}

#[test]
fn balance_check_uses_value_plus_maximum_cost() {
    let transaction = meta(TxParams { value: U256::from(2), ..Default::default() });
    let feed = EstimateFeed::fixed(FeedSnapshot::default());

    // Maximum cost is 3 gas at 2 wei, plus 2 wei of value.
    let mut covered = FeeEngine::new(
        transaction.clone(),
        EditGasMode::ModifyInPlace,
        feed.clone(),
        Arc::new(RecordingStore::default()),
        FixedBalance(U256::from(0x210000000002u64)),
        true,
    );
    covered.set_max_fee_per_gas(U256::from(2));
    covered.set_gas_limit(3);
    assert!(!covered.recompute().balance_error);

    let mut broke = FeeEngine::new(
        transaction,
        EditGasMode::ModifyInPlace,
        feed,
        Arc::new(RecordingStore::default()),
        FixedBalance(U256::ZERO),
        true,
    );
    broke.set_max_fee_per_gas(U256::from(2));
    broke.set_gas_limit(3);
    assert!(broke.recompute().balance_error);
}

#[test]
fn tier_values_follow_feed_updates_until_overridden() {
    let (publisher, feed) = EstimateFeed::channel();
    publisher.publish(FeedSnapshot::new(fee_market_estimates()));
    let mut engine =
        fee_engine(meta(TxParams::default()), EditGasMode::ModifyInPlace, feed, Arc::default());

    assert_eq!(engine.recompute().max_fee_per_gas, gwei(30));

    let bumped_market = |max: u64| {
        let tier = |priority: u64, max: u64| FeeMarketEstimate {
            suggested_max_priority_fee_per_gas: gwei(priority),
            suggested_max_fee_per_gas: gwei(max),
            min_wait_time_estimate: 15_000,
            max_wait_time_estimate: 60_000,
        };
        GasFeeEstimates::FeeMarket(FeeMarketEstimates {
            low: tier(1, 35),
            medium: tier(2, max),
            high: tier(3, 70),
            estimated_base_fee: gwei(30),
            network_congestion: Some(0.4),
        })
    };
    publisher.publish(FeedSnapshot::new(bumped_market(50)));
    assert_eq!(engine.recompute().max_fee_per_gas, gwei(50));

    // A manual value stops tracking the feed.
    engine.set_max_fee_per_gas(gwei(70));
    publisher.publish(FeedSnapshot::new(bumped_market(55)));
    let state = engine.recompute();
    assert_eq!(state.max_fee_per_gas, gwei(70));
    assert_eq!(state.estimate_used, UserFeeLevel::Custom);

    // Re-selecting a tier resumes tracking.
    engine.set_estimate_to_use(EstimateLevel::Medium);
    assert_eq!(engine.recompute().max_fee_per_gas, gwei(55));
}

#[test]
fn commit_persists_patch_and_releases_overrides() {
    let store = Arc::new(RecordingStore::default());
    let transaction = meta(TxParams { gas: Some(21_000), ..Default::default() });
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, store.clone());

    engine.set_max_fee_per_gas(gwei(50));
    engine.update_transaction(FeeUpdate::new(UserFeeLevel::Custom)).unwrap();

    let patches = store.patches();
    assert_eq!(patches.len(), 1);
    let (id, patch) = &patches[0];
    assert_eq!(id.as_str(), "tx-1");
    assert_eq!(patch.user_fee_level, UserFeeLevel::Custom);
    assert_eq!(patch.max_fee_per_gas, Some(gwei(50)));
    // The untouched field is filled from its resolved value.
    assert_eq!(patch.max_priority_fee_per_gas, Some(gwei(2)));
    assert_eq!(patch.gas_price, None);
    assert_eq!(patch.gas, 21_000);
    assert!(!patch.user_edited_gas_limit);

    // The local mirror was patched and the override released; the committed
    // values survive through the record rather than the override.
    assert_eq!(engine.transaction().tx_params.max_fee_per_gas, Some(gwei(50)));
    assert_eq!(engine.transaction().user_fee_level, Some(UserFeeLevel::Custom));
    let state = engine.recompute();
    assert_eq!(state.max_fee_per_gas, gwei(50));
    assert_eq!(state.estimate_to_use, Some(UserFeeLevel::Custom));
    assert_eq!(state.estimate_used, UserFeeLevel::Custom);
}

#[test]
fn estimate_update_applies_suggested_values_and_is_idempotent() {
    let store = Arc::new(RecordingStore::default());
    let transaction = meta(TxParams::default());
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, store.clone());

    engine.update_transaction_using_estimate(EstimateLevel::Medium).unwrap();
    let first = engine.transaction().tx_params.clone();
    engine.update_transaction_using_estimate(EstimateLevel::Medium).unwrap();
    let second = engine.transaction().tx_params.clone();

    assert_eq!(first, second);
    assert_eq!(first.max_fee_per_gas, Some(gwei(30)));
    assert_eq!(first.max_priority_fee_per_gas, Some(gwei(2)));

    let patches = store.patches();
    assert_eq!(patches.len(), 2);
    assert_eq!(patches[0].1.max_fee_per_gas, patches[1].1.max_fee_per_gas);
    assert_eq!(patches[0].1.user_fee_level, UserFeeLevel::Medium);
}

#[test]
fn estimate_update_without_fee_market_is_a_no_op() {
    let store = Arc::new(RecordingStore::default());
    let transaction = meta(TxParams { gas_price: Some(gwei(10)), ..Default::default() });
    let feed = EstimateFeed::fixed(FeedSnapshot::new(legacy_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, store.clone());

    engine.update_transaction_using_estimate(EstimateLevel::Medium).unwrap();
    assert!(store.patches().is_empty());
}

#[test]
fn swaps_updates_route_to_the_swap_flow() {
    let store = Arc::new(RecordingStore::default());
    let transaction = meta(TxParams::default());
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::Swaps, feed, store.clone());

    let update = FeeUpdate::new(UserFeeLevel::High)
        .with_max_fee_per_gas(gwei(40))
        .with_max_priority_fee_per_gas(gwei(3));
    engine.update_transaction(update).unwrap();

    assert!(store.patches().is_empty());
    let swaps = store.swap_updates();
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].estimate_used, UserFeeLevel::High);
    assert_eq!(swaps[0].max_fee_per_gas, Some(gwei(40)));
    // The transaction record itself is untouched.
    assert_eq!(engine.transaction().user_fee_level, None);
    assert_eq!(engine.transaction().tx_params.max_fee_per_gas, None);
}

#[test]
fn dapp_suggested_values_apply_verbatim() {
    let store = Arc::new(RecordingStore::default());
    let mut transaction = meta(TxParams::default());
    transaction.dapp_suggested_gas_fees = Some(DappSuggestedGasFees {
        max_fee_per_gas: Some(gwei(9)),
        max_priority_fee_per_gas: Some(gwei(1)),
        ..Default::default()
    });
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine =
        fee_engine(transaction, EditGasMode::ModifyInPlace, feed.clone(), store.clone());

    engine.update_transaction_using_dapp_suggested_values().unwrap();
    let patches = store.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].1.user_fee_level, UserFeeLevel::DappSuggested);
    assert_eq!(patches[0].1.max_fee_per_gas, Some(gwei(9)));
    assert_eq!(patches[0].1.max_priority_fee_per_gas, Some(gwei(1)));

    // Without a dapp suggestion nothing is dispatched.
    let bare_store = Arc::new(RecordingStore::default());
    let mut bare =
        fee_engine(meta(TxParams::default()), EditGasMode::ModifyInPlace, feed, bare_store.clone());
    bare.update_transaction_using_dapp_suggested_values().unwrap();
    assert!(bare_store.patches().is_empty());
}

#[test]
fn speed_up_with_zero_priority_fee_substitutes_medium_suggestion() {
    let store = Arc::new(RecordingStore::default());
    let mut transaction = meta(TxParams {
        gas: Some(21_000),
        max_fee_per_gas: Some(gwei(30)),
        max_priority_fee_per_gas: Some(U256::ZERO),
        ..Default::default()
    });
    transaction.previous_gas = Some(PreviousGasParams {
        gas_limit: Some(21_000),
        gas_price: None,
        max_fee_per_gas: Some(gwei(30)),
        max_priority_fee_per_gas: Some(U256::ZERO),
    });
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, store.clone());

    engine.speed_up_transaction().unwrap();

    // The medium suggestion (2 gwei) stood in for the zero and was bumped.
    let draft = engine.retry_tx_meta().unwrap();
    assert_eq!(draft.tx_params.max_priority_fee_per_gas, Some(U256::from(2_200_000_000u64)));
    assert_eq!(draft.tx_params.max_fee_per_gas, Some(gwei(33)));
    assert_eq!(draft.user_fee_level, Some(UserFeeLevel::Custom));
    assert_eq!(engine.edit_gas_mode(), EditGasMode::SpeedUp);

    // The live record and the store never see retry edits.
    assert_eq!(engine.transaction().tx_params.max_fee_per_gas, Some(gwei(30)));
    assert_eq!(engine.transaction().user_fee_level, None);
    assert!(store.patches().is_empty());
}

#[test]
fn cancel_bumps_from_params_and_captures_previous_gas() {
    let store = Arc::new(RecordingStore::default());
    let transaction = meta(TxParams {
        gas: Some(21_000),
        max_fee_per_gas: Some(gwei(30)),
        max_priority_fee_per_gas: Some(gwei(2)),
        ..Default::default()
    });
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, store.clone());

    engine.cancel_transaction().unwrap();
    assert_eq!(engine.edit_gas_mode(), EditGasMode::Cancel);

    let draft = engine.retry_tx_meta().unwrap();
    assert_eq!(draft.tx_params.max_fee_per_gas, Some(gwei(33)));
    assert_eq!(draft.tx_params.max_priority_fee_per_gas, Some(U256::from(2_200_000_000u64)));
    assert_eq!(draft.user_fee_level, Some(UserFeeLevel::TenPercentIncreased));
    // The automatic bump on open records the default tier as the suggestion.
    assert_eq!(draft.estimate_suggested, Some(UserFeeLevel::Medium));

    // The original fees were snapshotted before the bump.
    let previous = draft.previous_gas.as_ref().unwrap();
    assert_eq!(previous.max_fee_per_gas, Some(gwei(30)));
    assert_eq!(previous.max_priority_fee_per_gas, Some(gwei(2)));
    assert_eq!(engine.transaction().previous_gas, None);

    // A follow-up recompute edits the draft's values, not the live record's.
    let state = engine.recompute();
    assert_eq!(state.max_fee_per_gas, gwei(33));
    assert_eq!(state.estimate_used, UserFeeLevel::TenPercentIncreased);
}

#[test]
fn minimum_cost_grows_with_gas_limit() {
    let transaction = meta(TxParams::default());
    let feed = EstimateFeed::fixed(FeedSnapshot::new(fee_market_estimates()));
    let mut engine = fee_engine(transaction, EditGasMode::ModifyInPlace, feed, Arc::default());

    let narrow = engine.recompute();
    engine.set_gas_limit(63_000);
    let wide = engine.recompute();
    assert!(wide.minimum_cost > narrow.minimum_cost);
    assert!(wide.maximum_cost > narrow.maximum_cost);
}

#[test]
fn fee_market_feed_fixture_parses_and_drives_the_engine() {
    let snapshot: FeedSnapshot = serde_json::from_str(&load_fixture("fee_market.json")).unwrap();
    assert!(snapshot.is_network_busy);
    assert!(!snapshot.is_gas_estimates_loading);
    let market = snapshot.estimates.fee_market().unwrap();
    assert_eq!(market.medium.suggested_max_fee_per_gas, U256::from(35_165_462_129u64));
    assert_eq!(market.low.suggested_max_priority_fee_per_gas, gwei(1));
    assert_eq!(snapshot.estimates.estimated_base_fee(), Some(U256::from(27_148_689_466u64)));

    let mut engine = fee_engine(
        meta(TxParams::default()),
        EditGasMode::ModifyInPlace,
        EstimateFeed::fixed(snapshot),
        Arc::default(),
    );
    let state = engine.recompute();
    assert_eq!(state.max_fee_per_gas, U256::from(35_165_462_129u64));
    assert!(state.is_network_busy);
}

#[test]
fn legacy_feed_fixture_parses() {
    let snapshot: FeedSnapshot = serde_json::from_str(&load_fixture("legacy.json")).unwrap();
    assert_eq!(snapshot.estimates.legacy_suggestion(EstimateLevel::Medium), Some(gwei(32)));
    assert!(!snapshot.is_network_busy);
}

#[test]
fn transaction_record_fixture_round_trips() {
    let raw = load_fixture("transaction.json");
    let transaction: TransactionMeta = serde_json::from_str(&raw).unwrap();
    assert_eq!(transaction.id.as_str(), "3111025347726181");
    assert_eq!(transaction.chain_id, 1);
    assert_eq!(transaction.tx_params.gas, Some(21_000));
    assert_eq!(transaction.tx_params.max_fee_per_gas, Some(gwei(2)));
    assert_eq!(transaction.user_fee_level, Some(UserFeeLevel::Medium));
    assert_eq!(transaction.original_gas_estimate, Some(21_000));
    let dapp = transaction.dapp_suggested_gas_fees.as_ref().unwrap();
    assert_eq!(dapp.max_fee_per_gas, Some(U256::from(2_500_000_000u64)));

    let reserialized = serde_json::to_value(&transaction).unwrap();
    let original: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(reserialized, original);
}
