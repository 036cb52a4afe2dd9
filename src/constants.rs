//! Engine constants.

/// The lowest gas limit a transaction can carry and still be executable.
///
/// A plain value transfer consumes exactly this much gas; anything below it can
/// never be included and is rejected as out of bounds.
pub const MINIMUM_GAS_LIMIT: u64 = 21_000;

/// Minimum fee bump, in percent, that replacement transactions must carry to be
/// accepted into the pool in place of the original.
///
/// Ref <https://github.com/ethereum-optimism/op-geth/blob/e666543dc5500428ee7c940e54263fe4968c5efd/core/txpool/legacypool/legacypool.go#L168>
/// Ref <https://github.com/paradigmxyz/reth/blob/b312799e081259a2fbdfa91fb6b43f384625bbe2/crates/transaction-pool/src/config.rs#L23-L24>
pub const RETRY_FEE_BUMP_PERCENT: u64 = 10;

/// Percent over the high estimate at which a max fee is flagged as overpaying.
///
/// E.g. with a high estimate of 100 gwei, max fees above 120 gwei draw the
/// high-fee warning.
pub const HIGH_FEE_WARNING_PERCENT: u64 = 20;

/// Network congestion score (0..1) at or above which the network counts as busy.
pub const NETWORK_BUSY_THRESHOLD: f64 = 0.66;
