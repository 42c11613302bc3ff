/// Prices and USD values returned by the pool program carry 6 decimal places.
pub const VALUE_PRECISION: f64 = 1_000_000.0;

/// On-chain proportions are expressed in basis points.
pub const BPS_PER_PERCENT: f64 = 100.0;

pub const POOL_TOKEN_COUNT: usize = 2;

pub const GET_ALL_POOLS_PATH: &str = "/api/pools/get-all-pools";
pub const CREATE_TRANSACTION_PATH: &str = "/api/pools/transactions/create";

pub const REPORT_DESCRIPTION: &str = "Automatic rebalancing completed";

/// Convert a fixed-point on-chain amount into a decimal value.
pub fn from_fixed(amount: u64) -> f64 {
    amount as f64 / VALUE_PRECISION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_uses_six_decimals() {
        assert!((from_fixed(1_500_000) - 1.5).abs() < 1e-12);
        assert_eq!(from_fixed(0), 0.0);
    }
}
