use std::sync::Arc;

use anchor_client::{
    Program,
    solana_sdk::{commitment_config::CommitmentConfig, signature::Keypair},
};
use anchor_lang::prelude::{AnchorDeserialize, Pubkey, instruction::Instruction};
use base64::{Engine, engine::general_purpose::STANDARD};
use solana_rpc_client_types::config::RpcSimulateTransactionConfig;

use crate::{error::ContractError, managed_pool::accounts::Pool};

pub async fn fetch_pool(
    program: &Program<Arc<Keypair>>,
    pool_address: Pubkey,
) -> anyhow::Result<Pool> {
    Ok(program.account::<Pool>(pool_address).await?)
}

/// Simulate a view instruction and decode the program's return data as `T`.
pub async fn simulate_view<T: AnchorDeserialize>(
    program: &Program<Arc<Keypair>>,
    instruction_name: &'static str,
    instruction: Instruction,
) -> anyhow::Result<T> {
    let transaction = program
        .request()
        .instruction(instruction)
        .signed_transaction()
        .await?;

    let config = RpcSimulateTransactionConfig {
        sig_verify: false,
        replace_recent_blockhash: true,
        commitment: Some(CommitmentConfig::confirmed()),
        ..RpcSimulateTransactionConfig::default()
    };

    let result = program
        .rpc()
        .simulate_transaction_with_config(&transaction, config)
        .await?
        .value;

    if let Some(err) = result.err {
        return Err(ContractError::Simulation {
            instruction: instruction_name,
            reason: format!("{:?}", err),
        }
        .into());
    }

    // An all-zero value is trimmed down to no return data at all.
    let bytes = match result.return_data {
        Some(return_data) => STANDARD.decode(&return_data.data.0)?,
        None => Vec::new(),
    };

    decode_return_data(&bytes)
}

/// Solana trims trailing zero bytes from return data; pad them back before
/// decoding fixed-size values. Empty input decodes as the all-zero value.
pub fn decode_return_data<T: AnchorDeserialize>(bytes: &[u8]) -> anyhow::Result<T> {
    let mut reader = bytes;
    match T::deserialize(&mut reader) {
        Ok(value) => Ok(value),
        Err(_) => {
            let mut padded = bytes.to_vec();
            padded.resize(bytes.len().max(MAX_VIEW_RETURN_LEN), 0);
            let mut reader = padded.as_slice();
            Ok(T::deserialize(&mut reader)?)
        }
    }
}

/// Largest value any pool view returns (`u64` total plus `[u64; 2]`).
const MAX_VIEW_RETURN_LEN: usize = 24;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managed_pool::types::TokenBalanceInUsd;
    use anchor_lang::AnchorSerialize;

    #[test]
    fn decodes_prices() {
        let mut bytes = Vec::new();
        [1_500_000u64, 250_000u64].serialize(&mut bytes).unwrap();
        let prices: [u64; 2] = decode_return_data(&bytes).unwrap();
        assert_eq!(prices, [1_500_000, 250_000]);
    }

    #[test]
    fn empty_return_data_decodes_as_zero_prices() {
        let prices: [u64; 2] = decode_return_data(&[]).unwrap();
        assert_eq!(prices, [0, 0]);

        let balance: TokenBalanceInUsd = decode_return_data(&[]).unwrap();
        assert_eq!(balance.total_value_in_usd, 0);
        assert_eq!(balance.value_proportions, [0, 0]);
    }

    #[test]
    fn decodes_trimmed_trailing_zeroes() {
        let value = TokenBalanceInUsd {
            total_value_in_usd: 1_000_000_000,
            value_proportions: [10_000, 0],
        };
        let mut bytes = Vec::new();
        value.serialize(&mut bytes).unwrap();
        while bytes.last() == Some(&0) {
            bytes.pop();
        }

        let decoded: TokenBalanceInUsd = decode_return_data(&bytes).unwrap();
        assert_eq!(decoded.total_value_in_usd, 1_000_000_000);
        assert_eq!(decoded.value_proportions, [10_000, 0]);
    }
}
