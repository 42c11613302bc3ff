use anchor_client::{
    Program,
    solana_sdk::{
        compute_budget::ComputeBudgetInstruction,
        signature::{Keypair, Signature},
    },
};
use anchor_lang::prelude::{instruction::Instruction, *};
use std::sync::Arc;

use crate::{
    AccountResolver, TOKEN_PROGRAM_ID,
    managed_pool::{accounts::Pool, client::accounts, client::args},
};

/// Optional compute budget attached to the rebalance transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeBudget {
    pub unit_limit: Option<u32>,
    /// Priority fee in micro-lamports per compute unit.
    pub unit_price: Option<u64>,
}

impl ComputeBudget {
    pub fn instructions(&self) -> Vec<Instruction> {
        let mut instructions = Vec::new();
        if let Some(limit) = self.unit_limit {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
        }
        if let Some(price) = self.unit_price {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
        }
        instructions
    }
}

pub fn build_rebalance_instruction(
    program: &Program<Arc<Keypair>>,
    pool_address: Pubkey,
    pool: &Pool,
) -> anyhow::Result<Instruction> {
    let resolver = AccountResolver::new(pool_address);
    let [token0_vault, token1_vault] = resolver.pool_vaults(&pool.tokens);

    let mut instructions = program
        .request()
        .accounts(accounts::Rebalance {
            authority: program.payer(),
            pool: pool_address,
            token0_vault,
            token1_vault,
            token_program: TOKEN_PROGRAM_ID,
        })
        .args(args::Rebalance {})
        .instructions()?;

    instructions
        .pop()
        .ok_or_else(|| anyhow::anyhow!("Rebalance request produced no instruction"))
}

pub async fn execute_rebalance(
    program: &Program<Arc<Keypair>>,
    pool_address: Pubkey,
    pool: &Pool,
    compute_budget: ComputeBudget,
) -> anyhow::Result<Signature> {
    let rebalance_ix = build_rebalance_instruction(program, pool_address, pool)?;

    let mut request = program.request();
    for ix in compute_budget.instructions() {
        request = request.instruction(ix);
    }

    let signature = request
        .instruction(rebalance_ix)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send rebalance for {}: {}", pool_address, e))?;

    Ok(signature)
}
