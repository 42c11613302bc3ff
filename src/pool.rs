//! Pool records as served by the backend API, plus the two-token status
//! snapshot that is reported back after each rebalance.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::POOL_TOKEN_COUNT;

/// Per-token rebalancing policy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPolicy {
    /// Target share of total pool value, in percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub proportion: f64,
    /// Gain over the initial value that triggers take-profit. `0` disables it.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub take_profit_percentage: f64,
    /// Price at or below which stop-loss fires. Absent or `null` disables it.
    #[serde(default, deserialize_with = "lenient_number")]
    pub stop_loss_at_token_price: Option<f64>,
}

/// One managed pool. `tokens[0]` and `tokens[1]` mirror the on-chain token order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    /// `None` while the pool has not been deployed yet.
    #[serde(default)]
    pub pool_address: Option<String>,
    #[serde(default)]
    pub user_wallet_address: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_value: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rebalancing_threshold: f64,
    pub tokens: [TokenPolicy; POOL_TOKEN_COUNT],
}

impl PoolConfig {
    pub fn token0(&self) -> &TokenPolicy {
        &self.tokens[0]
    }

    pub fn token1(&self) -> &TokenPolicy {
        &self.tokens[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenShare {
    pub token_name: String,
    pub token_percentage: f64,
}

/// Value distribution of a pool, always ordered token0, token1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolStatus([TokenShare; POOL_TOKEN_COUNT]);

impl PoolStatus {
    pub fn new(token0_percentage: f64, token1_percentage: f64) -> Self {
        Self([
            TokenShare {
                token_name: "Token0".to_string(),
                token_percentage: token0_percentage,
            },
            TokenShare {
                token_name: "Token1".to_string(),
                token_percentage: token1_percentage,
            },
        ])
    }

    /// Status used whenever the pool value cannot be determined.
    pub fn zeroed() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn percentage(&self, index: usize) -> f64 {
        self.0[index].token_percentage
    }
}

impl Default for PoolStatus {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Backend documents are loosely typed: numbers sometimes arrive as strings
/// and sometimes as `null`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(f64),
        Text(String),
        Missing(()),
    }

    match Lenient::deserialize(deserializer)? {
        Lenient::Number(value) => Ok(Some(value)),
        Lenient::Text(text) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number {:?}: {}", text, e))),
        Lenient::Missing(()) => Ok(None),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_backend_pool_document() {
        let pool: PoolConfig = serde_json::from_value(json!({
            "_id": "66b1f0",
            "poolAddress": "9PWymxcJCKhgk1kjYnxLwtob94NFncJWAnrqQJ4fp7Tx",
            "userWalletAddress": "owner-1",
            "totalValue": 1000,
            "rebalancingThreshold": "5",
            "tokens": [
                { "proportion": 50, "takeProfitPercentage": 20, "stopLossAtTokenPrice": 0.5 },
                { "proportion": 50, "takeProfitPercentage": 0, "stopLossAtTokenPrice": null }
            ]
        }))
        .unwrap();

        assert_eq!(pool.total_value, 1000.0);
        assert_eq!(pool.rebalancing_threshold, 5.0);
        assert_eq!(pool.token0().take_profit_percentage, 20.0);
        assert_eq!(pool.token0().stop_loss_at_token_price, Some(0.5));
        assert_eq!(pool.token1().stop_loss_at_token_price, None);
        assert!(pool.pool_address.is_some());
    }

    #[test]
    fn null_pool_address_is_none() {
        let pool: PoolConfig = serde_json::from_value(json!({
            "poolAddress": null,
            "userWalletAddress": "owner-1",
            "totalValue": 0,
            "rebalancingThreshold": 5,
            "tokens": [{}, {}]
        }))
        .unwrap();

        assert!(pool.pool_address.is_none());
    }

    #[test]
    fn absent_stop_loss_is_disabled_but_explicit_zero_is_kept() {
        let policies: [TokenPolicy; 2] = serde_json::from_value(json!([
            { "proportion": "60" },
            { "proportion": 40, "stopLossAtTokenPrice": "0" }
        ]))
        .unwrap();

        assert_eq!(policies[0].proportion, 60.0);
        assert_eq!(policies[0].stop_loss_at_token_price, None);
        assert_eq!(policies[1].stop_loss_at_token_price, Some(0.0));
    }

    #[test]
    fn pool_with_wrong_token_count_is_rejected() {
        let result = serde_json::from_value::<PoolConfig>(json!({
            "poolAddress": "abc",
            "tokens": [{ "proportion": 100 }]
        }));

        assert!(result.is_err());
    }

    #[test]
    fn status_serializes_as_two_named_entries() {
        let status = PoolStatus::new(60.0, 40.0);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!([
                { "tokenName": "Token0", "tokenPercentage": 60.0 },
                { "tokenName": "Token1", "tokenPercentage": 40.0 }
            ])
        );
        assert_eq!(PoolStatus::default(), PoolStatus::zeroed());
    }
}
