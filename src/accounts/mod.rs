//! Account resolution for the managed pool program.
//!
//! This module provides:
//! - Vault derivation for a pool's two tokens
//! - The token program the vaults belong to

pub mod resolvers;

pub use resolvers::*;
