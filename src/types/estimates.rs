//! Fee estimate types.
//!
//! The estimate feed publishes one of four shapes, discriminated by
//! `gasEstimateType` on the wire. The union makes the pairing a type: a
//! fee-market payload can only appear under the fee-market tag.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// A named level in the estimate map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateLevel {
    /// Cheapest, slowest inclusion.
    Low,
    /// The default recommendation.
    Medium,
    /// Fastest inclusion.
    High,
}

impl EstimateLevel {
    /// Returns the str identifier.
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for EstimateLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EstimateLevel> for crate::types::UserFeeLevel {
    fn from(level: EstimateLevel) -> Self {
        match level {
            EstimateLevel::Low => Self::Low,
            EstimateLevel::Medium => Self::Medium,
            EstimateLevel::High => Self::High,
        }
    }
}

/// The kind of estimate the feed is currently able to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasEstimateType {
    /// EIP-1559 estimates with per-level fee caps and priority fees.
    #[serde(rename = "fee-market")]
    FeeMarket,
    /// Per-level flat gas prices.
    #[serde(rename = "legacy")]
    Legacy,
    /// A single gas price from `eth_gasPrice`.
    #[serde(rename = "eth_gasPrice")]
    EthGasPrice,
    /// No estimate available.
    #[serde(rename = "none")]
    None,
}

impl GasEstimateType {
    /// Returns the str identifier.
    pub const fn as_str(&self) -> &str {
        match self {
            Self::FeeMarket => "fee-market",
            Self::Legacy => "legacy",
            Self::EthGasPrice => "eth_gasPrice",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for GasEstimateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level of a fee-market estimate. Fees are decimal gwei on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeMarketEstimate {
    /// Suggested priority fee, in wei.
    #[serde(with = "crate::serde::gwei")]
    pub suggested_max_priority_fee_per_gas: U256,
    /// Suggested fee cap, in wei.
    #[serde(with = "crate::serde::gwei")]
    pub suggested_max_fee_per_gas: U256,
    /// Shortest expected wait for inclusion at this level, in milliseconds.
    pub min_wait_time_estimate: u64,
    /// Longest expected wait for inclusion at this level, in milliseconds.
    pub max_wait_time_estimate: u64,
}

/// The full fee-market estimate map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeMarketEstimates {
    /// Low level estimate.
    pub low: FeeMarketEstimate,
    /// Medium level estimate.
    pub medium: FeeMarketEstimate,
    /// High level estimate.
    pub high: FeeMarketEstimate,
    /// Base fee expected for the next block, in wei.
    #[serde(with = "crate::serde::gwei")]
    pub estimated_base_fee: U256,
    /// Congestion score in `0..=1`, when the feed reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_congestion: Option<f64>,
}

impl FeeMarketEstimates {
    /// Returns the estimate for a level.
    pub const fn level(&self, level: EstimateLevel) -> &FeeMarketEstimate {
        match level {
            EstimateLevel::Low => &self.low,
            EstimateLevel::Medium => &self.medium,
            EstimateLevel::High => &self.high,
        }
    }
}

/// Per-level flat gas prices, in wei (decimal gwei on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEstimates {
    /// Low level gas price.
    #[serde(with = "crate::serde::gwei")]
    pub low: U256,
    /// Medium level gas price.
    #[serde(with = "crate::serde::gwei")]
    pub medium: U256,
    /// High level gas price.
    #[serde(with = "crate::serde::gwei")]
    pub high: U256,
}

impl LegacyEstimates {
    /// Returns the gas price for a level.
    pub const fn level(&self, level: EstimateLevel) -> U256 {
        match level {
            EstimateLevel::Low => self.low,
            EstimateLevel::Medium => self.medium,
            EstimateLevel::High => self.high,
        }
    }
}

/// A single `eth_gasPrice` estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPriceEstimate {
    /// The current gas price, in wei.
    #[serde(with = "crate::serde::gwei")]
    pub gas_price: U256,
}

/// Estimates as published by the feed, tagged by estimate type.
///
/// On the wire this is the `{gasEstimateType, gasFeeEstimates}` pair; the
/// `none` type carries no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gasEstimateType", content = "gasFeeEstimates")]
pub enum GasFeeEstimates {
    /// EIP-1559 estimates.
    #[serde(rename = "fee-market")]
    FeeMarket(FeeMarketEstimates),
    /// Per-level flat gas prices.
    #[serde(rename = "legacy")]
    Legacy(LegacyEstimates),
    /// A single gas price.
    #[serde(rename = "eth_gasPrice")]
    GasPrice(GasPriceEstimate),
    /// No estimate available.
    #[serde(rename = "none")]
    None,
}

impl GasFeeEstimates {
    /// Returns the estimate type these estimates were published under.
    pub const fn estimate_type(&self) -> GasEstimateType {
        match self {
            Self::FeeMarket(_) => GasEstimateType::FeeMarket,
            Self::Legacy(_) => GasEstimateType::Legacy,
            Self::GasPrice(_) => GasEstimateType::EthGasPrice,
            Self::None => GasEstimateType::None,
        }
    }

    /// Whether no estimate is available.
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the fee-market estimate map, if that is what the feed has.
    pub const fn fee_market(&self) -> Option<&FeeMarketEstimates> {
        match self {
            Self::FeeMarket(estimates) => Some(estimates),
            _ => None,
        }
    }

    /// Returns the estimated next-block base fee, if known.
    pub fn estimated_base_fee(&self) -> Option<U256> {
        self.fee_market().map(|estimates| estimates.estimated_base_fee)
    }

    /// Returns the congestion score, if the feed reports one.
    pub fn network_congestion(&self) -> Option<f64> {
        self.fee_market().and_then(|estimates| estimates.network_congestion)
    }

    /// Returns the suggested gas price for a level under the legacy model.
    ///
    /// `eth_gasPrice` estimates carry one price for every level.
    pub fn legacy_suggestion(&self, level: EstimateLevel) -> Option<U256> {
        match self {
            Self::Legacy(estimates) => Some(estimates.level(level)),
            Self::GasPrice(estimate) => Some(estimate.gas_price),
            _ => None,
        }
    }
}
