//! Read-only pool instructions. They are never sent, only simulated so the
//! program's return data can be decoded.

use anchor_client::{Program, solana_sdk::signature::Keypair};
use anchor_lang::prelude::{instruction::Instruction, *};
use std::sync::Arc;

use crate::{
    AccountResolver,
    managed_pool::{accounts::Pool, client::accounts, client::args},
};

pub fn build_fetch_prices_instruction(
    program: &Program<Arc<Keypair>>,
    pool_address: Pubkey,
) -> anyhow::Result<Instruction> {
    let mut instructions = program
        .request()
        .accounts(accounts::FetchPrices { pool: pool_address })
        .args(args::FetchPrices {})
        .instructions()?;

    instructions
        .pop()
        .ok_or_else(|| anyhow::anyhow!("fetch_prices request produced no instruction"))
}

pub fn build_get_token_balance_in_usd_instruction(
    program: &Program<Arc<Keypair>>,
    pool_address: Pubkey,
    pool: &Pool,
) -> anyhow::Result<Instruction> {
    let resolver = AccountResolver::new(pool_address);
    let [token0_vault, token1_vault] = resolver.pool_vaults(&pool.tokens);

    let mut instructions = program
        .request()
        .accounts(accounts::GetTokenBalanceInUsd {
            pool: pool_address,
            token0_vault,
            token1_vault,
        })
        .args(args::GetTokenBalanceInUsd {})
        .instructions()?;

    instructions
        .pop()
        .ok_or_else(|| anyhow::anyhow!("get_token_balance_in_usd request produced no instruction"))
}
