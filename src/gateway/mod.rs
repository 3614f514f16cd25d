//! RPC gateway
//!
//! The three chain queries the holder analysis needs, behind one trait so the
//! pipeline never sees `solana-client` response types.

pub mod error;
pub mod known_programs;
pub mod mock;
pub mod solana;

pub use error::GatewayError;
pub use mock::MockGateway;
pub use solana::SolanaGateway;

use crate::types::models::{TokenAccountRecord, TokenSupply};
use async_trait::async_trait;
use std::collections::HashMap;

/// Upper bound on addresses per `get_executable_flags` call (getMultipleAccounts limit).
pub const MAX_ACCOUNTS_PER_REQUEST: usize = 100;

#[async_trait]
pub trait TokenGateway: Send + Sync {
    async fn get_token_supply(&self, mint: &str) -> Result<TokenSupply, GatewayError>;

    async fn get_token_accounts_by_mint(&self, mint: &str) -> Result<Vec<TokenAccountRecord>, GatewayError>;

    /// `None` when the chain has no account at `address`.
    async fn get_account_executable_flag(&self, address: &str) -> Result<Option<bool>, GatewayError>;

    /// Current slot, used to stamp the report.
    async fn get_slot(&self) -> Result<u64, GatewayError>;

    /// How many addresses one `get_executable_flags` call should carry.
    fn flag_batch_size(&self) -> usize {
        MAX_ACCOUNTS_PER_REQUEST
    }

    /// Flags for one batch of addresses. Addresses the chain has no account
    /// for are left out of the map.
    async fn get_executable_flags(&self, addresses: &[String]) -> Result<HashMap<String, bool>, GatewayError> {
        let mut flags = HashMap::with_capacity(addresses.len());
        for address in addresses {
            match self.get_account_executable_flag(address).await? {
                Some(executable) => {
                    flags.insert(address.clone(), executable);
                }
                None => tracing::debug!("No account found for owner {}", address),
            }
        }
        Ok(flags)
    }
}
