//! Classification of what a due pool should do.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! stop-loss, take-profit, rebalance, then no-action. A pool whose inputs
//! could not be gathered is classified as [`Action::Error`] by the caller.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::pool::{PoolConfig, PoolStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    StopLoss,
    TakeProfit,
    Rebalance,
    NoAction,
    Error,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::StopLoss => "stop-loss",
            Action::TakeProfit => "take-profit",
            Action::Rebalance => "rebalance",
            Action::NoAction => "no-action",
            Action::Error => "error",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prices and baseline values read from chain for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarketSnapshot {
    pub token0_price: f64,
    pub token1_price: f64,
    /// USD value of each token when the pool was created or last reset.
    pub token0_initial_value: f64,
    pub token1_initial_value: f64,
}

/// Percentage gain of `value` over `initial`.
///
/// Returns `None` when there is no baseline to compare against, so a zero
/// initial value never produces a profit signal.
pub fn profit_percentage(value: f64, initial: f64) -> Option<f64> {
    if initial == 0.0 {
        return None;
    }
    let profit = (value - initial) * 100.0 / initial;
    profit.is_finite().then_some(profit)
}

fn stop_loss_hit(price: f64, stop_loss: Option<f64>) -> bool {
    stop_loss.is_some_and(|limit| price <= limit)
}

pub fn determine_action(
    pool: &PoolConfig,
    before_status: &PoolStatus,
    snapshot: &MarketSnapshot,
) -> Action {
    let token0 = pool.token0();
    let token1 = pool.token1();

    let current_proportion0 = before_status.percentage(0);
    let token0_balance = before_status.percentage(0) * pool.total_value / 100.0;
    let token1_balance = before_status.percentage(1) * pool.total_value / 100.0;
    let token0_value = token0_balance * snapshot.token0_price;
    let token1_value = token1_balance * snapshot.token1_price;

    let stop_loss0 = current_proportion0 != 0.0
        && stop_loss_hit(snapshot.token0_price, token0.stop_loss_at_token_price);
    let stop_loss1 = current_proportion0 != 100.0
        && stop_loss_hit(snapshot.token1_price, token1.stop_loss_at_token_price);
    if stop_loss0 || stop_loss1 {
        debug!(stop_loss0, stop_loss1, "Stop loss triggered");
        return Action::StopLoss;
    }

    let take_profit0 = token0.take_profit_percentage;
    let take_profit1 = token1.take_profit_percentage;
    let token0_profit = profit_percentage(token0_value, snapshot.token0_initial_value);
    let token1_profit = profit_percentage(token1_value, snapshot.token1_initial_value);
    debug!(?token0_profit, ?token1_profit, "Calculated profits");

    // Both branches are gated on token0's take-profit setting.
    let take_profit_enabled = current_proportion0 != 0.0 && take_profit0 != 0.0;
    let profit0_hit = token0_profit.is_some_and(|profit| profit >= take_profit0);
    let profit1_hit = token1_profit.is_some_and(|profit| profit >= take_profit1);
    if take_profit_enabled && (profit0_hit || profit1_hit) {
        debug!(profit0_hit, profit1_hit, "Take profit triggered");
        return Action::TakeProfit;
    }

    let diff_from_target = (current_proportion0 - token0.proportion).abs();
    let concentrated = current_proportion0 == 0.0 || current_proportion0 == 100.0;
    if diff_from_target > pool.rebalancing_threshold && !concentrated {
        debug!(
            diff_from_target,
            threshold = pool.rebalancing_threshold,
            "Rebalance needed"
        );
        return Action::Rebalance;
    }

    Action::NoAction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::TokenPolicy;

    fn pool(target0: f64, threshold: f64) -> PoolConfig {
        PoolConfig {
            pool_address: Some("pool".to_string()),
            user_wallet_address: "owner".to_string(),
            total_value: 1_000.0,
            rebalancing_threshold: threshold,
            tokens: [
                TokenPolicy {
                    proportion: target0,
                    ..Default::default()
                },
                TokenPolicy {
                    proportion: 100.0 - target0,
                    ..Default::default()
                },
            ],
        }
    }

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            token0_price: 1.0,
            token1_price: 1.0,
            token0_initial_value: 0.0,
            token1_initial_value: 0.0,
        }
    }

    #[test]
    fn rebalances_when_deviation_exceeds_threshold() {
        let action = determine_action(&pool(50.0, 5.0), &PoolStatus::new(60.0, 40.0), &snapshot());
        assert_eq!(action, Action::Rebalance);
    }

    #[test]
    fn no_action_when_deviation_within_threshold() {
        let action = determine_action(&pool(50.0, 15.0), &PoolStatus::new(60.0, 40.0), &snapshot());
        assert_eq!(action, Action::NoAction);
    }

    #[test]
    fn deviation_equal_to_threshold_does_not_rebalance() {
        let action = determine_action(&pool(50.0, 10.0), &PoolStatus::new(60.0, 40.0), &snapshot());
        assert_eq!(action, Action::NoAction);
    }

    #[test]
    fn concentrated_pool_is_never_rebalanced() {
        for (token0, token1) in [(0.0, 100.0), (100.0, 0.0)] {
            let status = PoolStatus::new(token0, token1);
            let action = determine_action(&pool(50.0, 5.0), &status, &snapshot());
            assert_eq!(action, Action::NoAction, "token0 at {}%", token0);
        }
    }

    #[test]
    fn stop_loss_on_token0_price() {
        let mut pool = pool(50.0, 5.0);
        pool.tokens[0].stop_loss_at_token_price = Some(10.0);
        let snapshot = MarketSnapshot {
            token0_price: 5.0,
            ..snapshot()
        };

        let action = determine_action(&pool, &PoolStatus::new(60.0, 40.0), &snapshot);
        assert_eq!(action, Action::StopLoss);
    }

    #[test]
    fn stop_loss_price_is_inclusive() {
        let mut pool = pool(50.0, 5.0);
        pool.tokens[1].stop_loss_at_token_price = Some(2.0);
        let snapshot = MarketSnapshot {
            token1_price: 2.0,
            ..snapshot()
        };

        let action = determine_action(&pool, &PoolStatus::new(50.0, 50.0), &snapshot);
        assert_eq!(action, Action::StopLoss);
    }

    #[test]
    fn token0_stop_loss_ignored_without_token0_exposure() {
        let mut pool = pool(50.0, 5.0);
        pool.tokens[0].stop_loss_at_token_price = Some(10.0);
        for price in [0.0, 5.0, 10.0] {
            let snapshot = MarketSnapshot {
                token0_price: price,
                ..snapshot()
            };
            let action = determine_action(&pool, &PoolStatus::new(0.0, 100.0), &snapshot);
            assert_ne!(action, Action::StopLoss, "token0 price {}", price);
        }
    }

    #[test]
    fn token1_stop_loss_ignored_without_token1_exposure() {
        let mut pool = pool(50.0, 5.0);
        pool.tokens[1].stop_loss_at_token_price = Some(10.0);
        let snapshot = MarketSnapshot {
            token1_price: 1.0,
            ..snapshot()
        };

        let action = determine_action(&pool, &PoolStatus::new(100.0, 0.0), &snapshot);
        assert_eq!(action, Action::NoAction);
    }

    #[test]
    fn zero_prices_trigger_any_configured_stop_loss() {
        let mut pool = pool(50.0, 5.0);
        pool.tokens[0].stop_loss_at_token_price = Some(0.5);
        let snapshot = MarketSnapshot::default();

        let action = determine_action(&pool, &PoolStatus::new(60.0, 40.0), &snapshot);
        assert_eq!(action, Action::StopLoss);
    }

    #[test]
    fn unset_stop_loss_never_fires() {
        let action = determine_action(
            &pool(50.0, 50.0),
            &PoolStatus::new(60.0, 40.0),
            &MarketSnapshot::default(),
        );
        assert_eq!(action, Action::NoAction);
    }

    #[test]
    fn stop_loss_takes_precedence_over_rebalance() {
        let mut pool = pool(50.0, 5.0);
        pool.tokens[0].stop_loss_at_token_price = Some(1.0);

        let action = determine_action(&pool, &PoolStatus::new(80.0, 20.0), &snapshot());
        assert_eq!(action, Action::StopLoss);
    }

    #[test]
    fn take_profit_on_token0_gain() {
        let mut pool = pool(50.0, 50.0);
        pool.tokens[0].take_profit_percentage = 20.0;
        // balance0 = 500, value0 = 500 * 1.5 = 750 against an initial 500: +50%.
        let snapshot = MarketSnapshot {
            token0_price: 1.5,
            token0_initial_value: 500.0,
            ..snapshot()
        };

        let action = determine_action(&pool, &PoolStatus::new(50.0, 50.0), &snapshot);
        assert_eq!(action, Action::TakeProfit);
    }

    #[test]
    fn take_profit_on_token1_gated_by_token0_setting() {
        let mut pool = pool(50.0, 50.0);
        pool.tokens[1].take_profit_percentage = 10.0;
        let snapshot = MarketSnapshot {
            token1_price: 2.0,
            token1_initial_value: 500.0,
            ..snapshot()
        };
        let status = PoolStatus::new(50.0, 50.0);

        let action = determine_action(&pool, &status, &snapshot);
        assert_eq!(action, Action::NoAction);

        pool.tokens[0].take_profit_percentage = 1_000.0;
        let action = determine_action(&pool, &status, &snapshot);
        assert_eq!(action, Action::TakeProfit);
    }

    #[test]
    fn take_profit_disabled_when_token0_threshold_is_zero() {
        let mut pool = pool(50.0, 50.0);
        pool.tokens[1].take_profit_percentage = 1.0;
        let snapshot = MarketSnapshot {
            token0_price: 10.0,
            token1_price: 10.0,
            token0_initial_value: 1.0,
            token1_initial_value: 1.0,
        };

        let action = determine_action(&pool, &PoolStatus::new(50.0, 50.0), &snapshot);
        assert_eq!(action, Action::NoAction);
    }

    #[test]
    fn take_profit_ignored_without_token0_exposure() {
        let mut pool = pool(50.0, 50.0);
        pool.tokens[0].take_profit_percentage = 5.0;
        pool.tokens[1].take_profit_percentage = 5.0;
        let snapshot = MarketSnapshot {
            token1_price: 3.0,
            token1_initial_value: 100.0,
            ..snapshot()
        };

        let action = determine_action(&pool, &PoolStatus::new(0.0, 100.0), &snapshot);
        assert_eq!(action, Action::NoAction);
    }

    #[test]
    fn zero_initial_value_gives_no_profit_signal() {
        let mut pool = pool(50.0, 50.0);
        pool.tokens[0].take_profit_percentage = 1.0;
        pool.tokens[1].take_profit_percentage = 1.0;
        let snapshot = MarketSnapshot {
            token0_price: 100.0,
            token1_price: 100.0,
            token0_initial_value: 0.0,
            token1_initial_value: 0.0,
        };

        let action = determine_action(&pool, &PoolStatus::new(50.0, 50.0), &snapshot);
        assert_eq!(action, Action::NoAction);
    }

    #[test]
    fn profit_percentage_handles_missing_baseline() {
        assert_eq!(profit_percentage(150.0, 100.0), Some(50.0));
        assert_eq!(profit_percentage(50.0, 100.0), Some(-50.0));
        assert_eq!(profit_percentage(10.0, 0.0), None);
        assert_eq!(profit_percentage(0.0, 0.0), None);
    }

    #[test]
    fn action_labels_match_backend_values() {
        assert_eq!(Action::StopLoss.to_string(), "stop-loss");
        assert_eq!(Action::NoAction.as_str(), "no-action");
        assert_eq!(
            serde_json::to_value(Action::TakeProfit).unwrap(),
            serde_json::json!("take-profit")
        );
        assert_eq!(
            serde_json::to_value(Action::Error).unwrap(),
            serde_json::json!("error")
        );
    }
}
