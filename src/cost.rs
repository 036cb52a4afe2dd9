//! Transaction cost bounds.

use alloy::primitives::U256;

/// Inputs to the cost calculation.
///
/// Built from resolved field values, so exactly one fee model's fields are
/// nonzero at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostContext {
    /// Gas limit the cost is computed over.
    pub gas_limit: u64,
    /// Resolved legacy gas price, in wei.
    pub gas_price: U256,
    /// Resolved fee cap, in wei.
    pub max_fee_per_gas: U256,
    /// Resolved priority fee, in wei.
    pub max_priority_fee_per_gas: U256,
    /// Base fee from the estimate feed, in wei.
    pub estimated_base_fee: Option<U256>,
    /// Which fee model the fields were resolved under.
    pub supports_eip1559: bool,
}

/// The wei range a transaction can cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostBounds {
    /// Cost if the base fee stays where the feed last saw it.
    pub minimum: U256,
    /// Cost if the full fee cap is consumed.
    pub maximum: U256,
}

impl CostContext {
    /// Computes the minimum and maximum cost of the transaction.
    ///
    /// Under EIP-1559 the maximum charges the full fee cap and the minimum
    /// charges `min(maxFeePerGas, estimatedBaseFee + maxPriorityFeePerGas)`.
    /// Without a base fee the minimum degrades to the maximum. Legacy
    /// transactions cost exactly `gasLimit * gasPrice` either way.
    pub fn bounds(&self) -> CostBounds {
        let gas_limit = U256::from(self.gas_limit);
        if !self.supports_eip1559 {
            let cost = gas_limit.saturating_mul(self.gas_price);
            return CostBounds { minimum: cost, maximum: cost };
        }

        let maximum = gas_limit.saturating_mul(self.max_fee_per_gas);
        let effective = match self.estimated_base_fee {
            Some(base_fee) => {
                base_fee.saturating_add(self.max_priority_fee_per_gas).min(self.max_fee_per_gas)
            }
            None => self.max_fee_per_gas,
        };
        CostBounds { minimum: gas_limit.saturating_mul(effective), maximum }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_costs_are_exact() {
        let bounds = CostContext {
            gas_limit: 21_000,
            gas_price: U256::from(1_000_000_000u64),
            max_fee_per_gas: U256::ZERO,
            max_priority_fee_per_gas: U256::ZERO,
            estimated_base_fee: None,
            supports_eip1559: false,
        }
        .bounds();
        assert_eq!(bounds.minimum, U256::from(21_000_000_000_000u64));
        assert_eq!(bounds.minimum, bounds.maximum);
    }

    #[test]
    fn fee_market_minimum_uses_base_plus_priority() {
        let bounds = CostContext {
            gas_limit: 21_000,
            gas_price: U256::ZERO,
            max_fee_per_gas: U256::from(100u64),
            max_priority_fee_per_gas: U256::from(2u64),
            estimated_base_fee: Some(U256::from(40u64)),
            supports_eip1559: true,
        }
        .bounds();
        assert_eq!(bounds.minimum, U256::from(21_000u64 * 42));
        assert_eq!(bounds.maximum, U256::from(21_000u64 * 100));
    }

    #[test]
    fn minimum_is_capped_by_max_fee() {
        let bounds = CostContext {
            gas_limit: 21_000,
            gas_price: U256::ZERO,
            max_fee_per_gas: U256::from(30u64),
            max_priority_fee_per_gas: U256::from(5u64),
            estimated_base_fee: Some(U256::from(40u64)),
            supports_eip1559: true,
        }
        .bounds();
        // Base fee already above the cap: both bounds collapse to the cap.
        assert_eq!(bounds.minimum, bounds.maximum);
        assert_eq!(bounds.maximum, U256::from(21_000u64 * 30));
    }

    #[test]
    fn missing_base_fee_degrades_minimum_to_maximum() {
        let bounds = CostContext {
            gas_limit: 50_000,
            gas_price: U256::ZERO,
            max_fee_per_gas: U256::from(77u64),
            max_priority_fee_per_gas: U256::from(3u64),
            estimated_base_fee: None,
            supports_eip1559: true,
        }
        .bounds();
        assert_eq!(bounds.minimum, bounds.maximum);
    }

    #[test]
    fn bounds_grow_with_gas_limit() {
        let context = CostContext {
            gas_limit: 21_000,
            gas_price: U256::ZERO,
            max_fee_per_gas: U256::from(100u64),
            max_priority_fee_per_gas: U256::from(2u64),
            estimated_base_fee: Some(U256::from(40u64)),
            supports_eip1559: true,
        };
        let wider = CostContext { gas_limit: 63_000, ..context };
        assert!(wider.bounds().minimum > context.bounds().minimum);
        assert!(wider.bounds().maximum > context.bounds().maximum);
    }
}
