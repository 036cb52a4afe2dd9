//! Engine configuration.

use crate::{
    constants::{HIGH_FEE_WARNING_PERCENT, MINIMUM_GAS_LIMIT},
    types::EstimateLevel,
};
use serde::{Deserialize, Serialize};

/// Fee engine configuration.
///
/// Hosts usually run with [`EngineConfig::default`]; the builders exist for
/// chains with non-standard floors and for tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// The lowest gas limit a user edit may set.
    minimum_gas_limit: u64,
    /// Estimate tier selected when the transaction does not carry one.
    default_estimate: EstimateLevel,
    /// Percentage over the high estimate at which a fee cap draws a warning.
    high_fee_warning_percent: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minimum_gas_limit: MINIMUM_GAS_LIMIT,
            default_estimate: EstimateLevel::Medium,
            high_fee_warning_percent: HIGH_FEE_WARNING_PERCENT,
        }
    }
}

impl EngineConfig {
    /// Sets the minimum gas limit.
    pub fn with_minimum_gas_limit(mut self, minimum_gas_limit: u64) -> Self {
        self.minimum_gas_limit = minimum_gas_limit;
        self
    }

    /// Sets the default estimate tier.
    pub fn with_default_estimate(mut self, default_estimate: EstimateLevel) -> Self {
        self.default_estimate = default_estimate;
        self
    }

    /// Sets the high fee warning threshold, as a percentage over the high estimate.
    pub fn with_high_fee_warning_percent(mut self, percent: u64) -> Self {
        self.high_fee_warning_percent = percent;
        self
    }

    /// Returns the lowest gas limit a user edit may set.
    pub const fn minimum_gas_limit(&self) -> u64 {
        self.minimum_gas_limit
    }

    /// Returns the estimate tier used when the transaction does not carry one.
    pub const fn default_estimate(&self) -> EstimateLevel {
        self.default_estimate
    }

    /// Returns the high fee warning threshold.
    pub const fn high_fee_warning_percent(&self) -> u64 {
        self.high_fee_warning_percent
    }
}
