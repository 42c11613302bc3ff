//! The pool program as seen by the keeper.
//!
//! [`PoolContract`] is the seam between orchestration and the chain: the
//! production binding simulates view instructions and sends `rebalance`
//! through anchor-client, while tests plug in in-memory contracts.

use std::{str::FromStr, sync::Arc};

use anchor_client::{Program, solana_sdk::signature::Keypair};
use anchor_lang::prelude::Pubkey;
use async_trait::async_trait;

use crate::{
    error::ContractError,
    instructions::{
        ComputeBudget, build_fetch_prices_instruction, build_get_token_balance_in_usd_instruction,
        execute_rebalance,
    },
    managed_pool::{accounts::Pool, types::TokenBalanceInUsd},
    state::{fetch_pool, simulate_view},
    status::PoolValuation,
};

#[async_trait]
pub trait PoolContract: Send + Sync {
    /// Seconds between two rebalances.
    async fn time_period(&self) -> anyhow::Result<i64>;

    /// Unix timestamp of the last rebalance.
    async fn last_checked(&self) -> anyhow::Result<i64>;

    /// Mint of the token at `index` (0 or 1).
    async fn token(&self, index: usize) -> anyhow::Result<Pubkey>;

    /// Current unit prices of both tokens, fixed point with 6 decimals.
    async fn fetch_prices(&self) -> anyhow::Result<[u64; 2]>;

    /// Baseline USD value of the token at `index`, fixed point with 6 decimals.
    async fn initial_token_value(&self, index: usize) -> anyhow::Result<u64>;

    async fn token_balance_in_usd(&self) -> anyhow::Result<PoolValuation>;

    /// Send the rebalance transaction and return its signature.
    async fn rebalance(&self) -> anyhow::Result<String>;
}

/// Binds a pool address to a [`PoolContract`].
pub trait ContractConnector: Send + Sync {
    fn connect(&self, pool_address: &str) -> anyhow::Result<Arc<dyn PoolContract>>;
}

pub struct AnchorConnector {
    program: Arc<Program<Arc<Keypair>>>,
    compute_budget: ComputeBudget,
}

impl AnchorConnector {
    pub fn new(program: Program<Arc<Keypair>>, compute_budget: ComputeBudget) -> Self {
        Self {
            program: Arc::new(program),
            compute_budget,
        }
    }
}

impl ContractConnector for AnchorConnector {
    fn connect(&self, pool_address: &str) -> anyhow::Result<Arc<dyn PoolContract>> {
        let address =
            Pubkey::from_str(pool_address).map_err(|e| ContractError::InvalidAddress {
                address: pool_address.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Arc::new(AnchorPoolContract {
            program: self.program.clone(),
            address,
            compute_budget: self.compute_budget,
        }))
    }
}

pub struct AnchorPoolContract {
    program: Arc<Program<Arc<Keypair>>>,
    address: Pubkey,
    compute_budget: ComputeBudget,
}

impl AnchorPoolContract {
    async fn pool(&self) -> anyhow::Result<Pool> {
        fetch_pool(&self.program, self.address).await
    }
}

#[async_trait]
impl PoolContract for AnchorPoolContract {
    async fn time_period(&self) -> anyhow::Result<i64> {
        Ok(self.pool().await?.time_period)
    }

    async fn last_checked(&self) -> anyhow::Result<i64> {
        Ok(self.pool().await?.last_checked)
    }

    async fn token(&self, index: usize) -> anyhow::Result<Pubkey> {
        let pool = self.pool().await?;
        pool.tokens
            .get(index)
            .copied()
            .ok_or_else(|| ContractError::TokenIndex(index).into())
    }

    async fn fetch_prices(&self) -> anyhow::Result<[u64; 2]> {
        let ix = build_fetch_prices_instruction(&self.program, self.address)?;
        simulate_view(&self.program, "fetch_prices", ix).await
    }

    async fn initial_token_value(&self, index: usize) -> anyhow::Result<u64> {
        let pool = self.pool().await?;
        pool.initial_token_values
            .get(index)
            .copied()
            .ok_or_else(|| ContractError::TokenIndex(index).into())
    }

    async fn token_balance_in_usd(&self) -> anyhow::Result<PoolValuation> {
        let pool = self.pool().await?;
        let ix = build_get_token_balance_in_usd_instruction(&self.program, self.address, &pool)?;
        let balance: TokenBalanceInUsd =
            simulate_view(&self.program, "get_token_balance_in_usd", ix).await?;

        Ok(PoolValuation {
            total_value_in_usd: balance.total_value_in_usd,
            value_proportions: balance.value_proportions,
        })
    }

    async fn rebalance(&self) -> anyhow::Result<String> {
        let pool = self.pool().await?;
        let signature =
            execute_rebalance(&self.program, self.address, &pool, self.compute_budget).await?;
        Ok(signature.to_string())
    }
}
