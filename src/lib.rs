use std::sync::Arc;

use anchor_client::{
    Client, Cluster, Program,
    solana_sdk::{commitment_config::CommitmentConfig, signature::Keypair},
};
use anchor_lang::prelude::*;

pub mod accounts;
pub mod action;
pub mod backend;
pub mod constants;
pub mod contract;
pub mod error;
pub mod instructions;
pub mod metrics;
pub mod pool;
pub mod rebalancer;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod telemetry;

// Re-export commonly used types
pub use accounts::{AccountResolver, TOKEN_PROGRAM_ID};
pub use action::{Action, MarketSnapshot, determine_action};
pub use backend::{HttpBackend, PoolSource, ResultReporter, TransactionReport};
pub use contract::{AnchorConnector, ContractConnector, PoolContract};
pub use instructions::ComputeBudget;
pub use pool::{PoolConfig, PoolStatus, TokenPolicy, TokenShare};
pub use rebalancer::{CycleSummary, PoolOutcome, Rebalancer};
pub use scheduler::{Clock, Scheduler, SystemClock};
pub use status::{PoolValuation, read_pool_status};

declare_program!(managed_pool);

/// Connect to the managed pool program with `payer` as the signing authority.
pub fn pool_program(
    cluster: Cluster,
    payer: Arc<Keypair>,
) -> anyhow::Result<Program<Arc<Keypair>>> {
    let client = Client::new_with_options(cluster, payer, CommitmentConfig::confirmed());
    Ok(client.program(managed_pool::ID)?)
}
