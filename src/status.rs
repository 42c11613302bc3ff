use tracing::{debug, warn};

use crate::{
    constants::{BPS_PER_PERCENT, from_fixed},
    contract::PoolContract,
    pool::PoolStatus,
};

/// Raw valuation reported by the pool program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolValuation {
    /// Total pool value in USD, fixed point with 6 decimals.
    pub total_value_in_usd: u64,
    /// Share of each token in basis points.
    pub value_proportions: [u64; 2],
}

impl PoolValuation {
    pub fn total_value(&self) -> f64 {
        from_fixed(self.total_value_in_usd)
    }

    /// Normalize into percentages. An empty pool yields the zeroed status.
    pub fn to_status(&self) -> PoolStatus {
        if self.total_value() <= 0.0 {
            return PoolStatus::zeroed();
        }

        let [token0_bps, token1_bps] = self.value_proportions;
        PoolStatus::new(
            token0_bps as f64 / BPS_PER_PERCENT,
            token1_bps as f64 / BPS_PER_PERCENT,
        )
    }
}

/// Read the pool's current value split. Never fails: any read error is
/// logged and the zeroed status is returned so the pool is simply not
/// rebalanced on stale data.
pub async fn read_pool_status(contract: &dyn PoolContract) -> PoolStatus {
    match contract.token_balance_in_usd().await {
        Ok(valuation) => {
            let status = valuation.to_status();
            debug!(
                total_value_usd = valuation.total_value(),
                token0_pct = status.percentage(0),
                token1_pct = status.percentage(1),
                "Pool status"
            );
            status
        }
        Err(e) => {
            warn!(error = %e, "Failed to read pool valuation, using zeroed status");
            PoolStatus::zeroed()
        }
    }
}
