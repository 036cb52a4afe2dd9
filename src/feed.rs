//! Estimate feed handle.
//!
//! The engine never polls the network itself. The host owns a
//! [`FeedPublisher`] and pushes fresh [`FeedSnapshot`]s into it from whatever
//! polling loop it runs; the engine holds an [`EstimateFeed`] and reads the
//! latest snapshot synchronously on every recomputation.

use crate::{constants::NETWORK_BUSY_THRESHOLD, types::{GasEstimateType, GasFeeEstimates}};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// One observation of the estimate feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// The estimates, tagged by estimate type.
    #[serde(flatten)]
    pub estimates: GasFeeEstimates,
    /// Whether the feed is still waiting for usable estimates.
    pub is_gas_estimates_loading: bool,
    /// Whether the network is congested.
    pub is_network_busy: bool,
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self {
            estimates: GasFeeEstimates::None,
            is_gas_estimates_loading: true,
            is_network_busy: false,
        }
    }
}

impl FeedSnapshot {
    /// Creates a snapshot, deriving the busy flag from the congestion score
    /// and the loading flag from estimate availability.
    pub fn new(estimates: GasFeeEstimates) -> Self {
        let is_network_busy = estimates
            .network_congestion()
            .is_some_and(|congestion| congestion >= NETWORK_BUSY_THRESHOLD);
        Self { is_gas_estimates_loading: estimates.is_none(), is_network_busy, estimates }
    }

    /// Overrides the loading flag.
    pub fn with_loading(mut self, is_gas_estimates_loading: bool) -> Self {
        self.is_gas_estimates_loading = is_gas_estimates_loading;
        self
    }

    /// Overrides the busy flag.
    pub fn with_network_busy(mut self, is_network_busy: bool) -> Self {
        self.is_network_busy = is_network_busy;
        self
    }

    /// Whether a network that does (or does not) support EIP-1559 should
    /// treat estimates of the given type as still loading.
    ///
    /// A fee-market network cannot use legacy estimates and a legacy network
    /// cannot use fee-market estimates, so a type mismatch counts as loading
    /// until the feed catches up.
    pub fn estimates_loading(estimate_type: GasEstimateType, network_supports_1559: bool) -> bool {
        let tolerable_for_1559 =
            matches!(estimate_type, GasEstimateType::FeeMarket | GasEstimateType::EthGasPrice);
        estimate_type == GasEstimateType::None
            || (network_supports_1559 && !tolerable_for_1559)
            || (!network_supports_1559 && estimate_type == GasEstimateType::FeeMarket)
    }
}

/// Publishing side of the estimate feed, owned by the host.
#[derive(Debug)]
pub struct FeedPublisher {
    tx: watch::Sender<FeedSnapshot>,
}

impl FeedPublisher {
    /// Publishes a fresh snapshot, replacing the previous one.
    pub fn publish(&self, snapshot: FeedSnapshot) {
        self.tx.send_replace(snapshot);
    }

    /// Creates another handle reading this publisher's snapshots.
    pub fn subscribe(&self) -> EstimateFeed {
        EstimateFeed { rx: self.tx.subscribe() }
    }
}

/// Reading side of the estimate feed, held by the engine.
#[derive(Debug, Clone)]
pub struct EstimateFeed {
    rx: watch::Receiver<FeedSnapshot>,
}

impl EstimateFeed {
    /// Creates a connected publisher/feed pair. The feed starts out loading.
    pub fn channel() -> (FeedPublisher, EstimateFeed) {
        let (tx, rx) = watch::channel(FeedSnapshot::default());
        (FeedPublisher { tx }, EstimateFeed { rx })
    }

    /// Creates a feed that always returns the given snapshot. Useful for
    /// tests and offline hosts.
    pub fn fixed(snapshot: FeedSnapshot) -> Self {
        let (_tx, rx) = watch::channel(snapshot);
        Self { rx }
    }

    /// Returns the latest snapshot.
    pub fn latest(&self) -> FeedSnapshot {
        self.rx.borrow().clone()
    }
}
