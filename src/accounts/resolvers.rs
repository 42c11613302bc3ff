//! Address derivation for accounts owned by a managed pool.

use anchor_lang::solana_program::pubkey::Pubkey;

/// The SPL Token program that owns the pool vaults.
pub const TOKEN_PROGRAM_ID: Pubkey = anchor_spl::token::ID;

/// Helper struct for resolving the accounts a pool instruction touches.
///
/// # Example
/// ```ignore
/// let resolver = AccountResolver::new(pool_address);
/// let vault = resolver.pool_vault(&mint);
/// ```
#[derive(Debug, Clone)]
pub struct AccountResolver {
    pool: Pubkey,
}

impl AccountResolver {
    pub fn new(pool: Pubkey) -> Self {
        Self { pool }
    }

    /// Derive an associated token account address.
    ///
    /// This uses the standard Associated Token Program derivation.
    pub fn associated_token_account(&self, wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
        anchor_spl::associated_token::get_associated_token_address(wallet, mint)
    }

    /// Token vault holding the pool's balance of `mint`.
    ///
    /// This is an Associated Token Account owned by the pool account.
    pub fn pool_vault(&self, mint: &Pubkey) -> Pubkey {
        self.associated_token_account(&self.pool, mint)
    }

    /// Vaults for both pool tokens, in token order.
    pub fn pool_vaults(&self, mints: &[Pubkey; 2]) -> [Pubkey; 2] {
        [self.pool_vault(&mints[0]), self.pool_vault(&mints[1])]
    }
}
