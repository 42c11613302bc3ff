//! One pass over every managed pool.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    action::{Action, MarketSnapshot, determine_action},
    backend::{PoolSource, ResultReporter, TransactionReport},
    constants::from_fixed,
    contract::{ContractConnector, PoolContract},
    metrics::Metrics,
    pool::{PoolConfig, PoolStatus},
    scheduler::Clock,
    status::read_pool_status,
};

/// What happened to a single pool during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolOutcome {
    NotDue { due_at: i64 },
    Rebalanced { action: Action, signature: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub pools: usize,
    pub undeployed: usize,
    pub not_due: usize,
    pub rebalanced: usize,
    pub failed: usize,
}

pub struct Rebalancer {
    source: Arc<dyn PoolSource>,
    connector: Arc<dyn ContractConnector>,
    reporter: Arc<dyn ResultReporter>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl Rebalancer {
    pub fn new(
        source: Arc<dyn PoolSource>,
        connector: Arc<dyn ContractConnector>,
        reporter: Arc<dyn ResultReporter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            connector,
            reporter,
            clock,
            metrics: Metrics::new(),
        }
    }

    /// Fetch the pool list and process pools one at a time, in list order.
    /// A failing pool is logged and counted; it never stops the cycle.
    pub async fn run_cycle(&self) -> CycleSummary {
        let pools = self.source.get_all_pools().await;
        let mut summary = CycleSummary {
            pools: pools.len(),
            ..CycleSummary::default()
        };

        for pool in &pools {
            let Some(address) = pool.pool_address.as_deref() else {
                debug!(user = %pool.user_wallet_address, "Skipping pool without address");
                summary.undeployed += 1;
                continue;
            };

            let span = info_span!("pool", pool = %address);
            let outcome = self.check_and_rebalance(address, pool).instrument(span);
            match outcome.await {
                Ok(PoolOutcome::NotDue { .. }) => summary.not_due += 1,
                Ok(PoolOutcome::Rebalanced { .. }) => summary.rebalanced += 1,
                Err(e) => {
                    error!(pool = %address, error = ?e, "Error processing pool");
                    self.metrics.record_pool_failure();
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    pub async fn check_and_rebalance(
        &self,
        address: &str,
        pool: &PoolConfig,
    ) -> anyhow::Result<PoolOutcome> {
        let contract = self.connector.connect(address)?;

        let time_period = contract.time_period().await?;
        let last_checked = contract.last_checked().await?;
        let now = self.clock.now();
        let due_at = last_checked.saturating_add(time_period);
        debug!(now, time_period, last_checked, "Checked schedule");

        if now < due_at {
            return Ok(PoolOutcome::NotDue { due_at });
        }

        info!("Rebalancing pool");

        let token0 = contract.token(0).await?;
        let token1 = contract.token(1).await?;
        debug!(%token0, %token1, "Pool tokens");

        let before_status = read_pool_status(contract.as_ref()).await;
        let action = classify(contract.as_ref(), pool, &before_status).await;
        info!(%action, "Action determined");
        self.metrics.record_action(action);

        let signature = contract.rebalance().await?;
        info!(%signature, "Rebalanced pool");

        let after_status = read_pool_status(contract.as_ref()).await;

        let report = TransactionReport::new(
            action,
            address,
            &pool.user_wallet_address,
            before_status,
            after_status,
            signature.clone(),
        );
        if let Err(e) = self.reporter.report(&report).await {
            warn!(error = %e, "Error posting transaction status for rebalance");
            self.metrics.record_report_failure();
        }

        Ok(PoolOutcome::Rebalanced { action, signature })
    }
}

/// Gather the classifier's on-chain inputs and classify. A failed read is
/// reported as [`Action::Error`] rather than propagated.
pub async fn classify(
    contract: &dyn PoolContract,
    pool: &PoolConfig,
    before_status: &PoolStatus,
) -> Action {
    match market_snapshot(contract).await {
        Ok(snapshot) => {
            debug!(?snapshot, "Market snapshot");
            determine_action(pool, before_status, &snapshot)
        }
        Err(e) => {
            error!(error = ?e, "Error in determine_action");
            Action::Error
        }
    }
}

async fn market_snapshot(contract: &dyn PoolContract) -> anyhow::Result<MarketSnapshot> {
    let [token0_price, token1_price] = contract.fetch_prices().await?;
    let token0_initial_value = contract.initial_token_value(0).await?;
    let token1_initial_value = contract.initial_token_value(1).await?;

    Ok(MarketSnapshot {
        token0_price: from_fixed(token0_price),
        token1_price: from_fixed(token1_price),
        token0_initial_value: from_fixed(token0_initial_value),
        token1_initial_value: from_fixed(token1_initial_value),
    })
}
