use super::known_programs::is_program_owner;
use super::{GatewayError, TokenGateway, MAX_ACCOUNTS_PER_REQUEST};
use crate::config::Config;
use crate::types::models::{TokenAccountRecord, TokenSupply};
use async_trait::async_trait;
use governor::{clock::DefaultClock, state::{InMemoryState, NotKeyed}, Quota, RateLimiter};
use rayon::prelude::*;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
};
use solana_sdk::{account::Account, commitment_config::CommitmentConfig, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::Account as TokenAccount;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

pub type RpcRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone)]
pub struct SolanaGateway {
    client: Arc<RpcClient>,
    rate_limiter: Arc<RpcRateLimiter>,
    batch_size: usize,
    classify_program_owned: bool,
}

impl SolanaGateway {
    pub fn new(client: Arc<RpcClient>, rate_limiter: Arc<RpcRateLimiter>) -> Self {
        Self {
            client,
            rate_limiter,
            batch_size: 25,
            classify_program_owned: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(config.requests_per_second)));
        let client = Arc::new(RpcClient::new_with_timeout_and_commitment(
            config.rpc_url.clone(),
            config.request_timeout,
            CommitmentConfig::confirmed(),
        ));
        Self::new(client, rate_limiter)
            .with_batch_size(config.account_batch_size)
            .with_program_owned_heuristic(config.classify_program_owned)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_ACCOUNTS_PER_REQUEST);
        self
    }

    /// Also treat accounts owned by a known protocol program as program accounts.
    pub fn with_program_owned_heuristic(mut self, enabled: bool) -> Self {
        self.classify_program_owned = enabled;
        self
    }

    pub async fn log_node_version(&self) {
        self.rate_limiter.until_ready().await;
        match self.client.get_version().await {
            Ok(version) => tracing::info!("Connected to Solana RPC (version: {})", version.solana_core),
            Err(e) => tracing::warn!("Failed to query RPC version: {}", e),
        }
    }

    fn is_program(&self, account: &Account) -> bool {
        account.executable || (self.classify_program_owned && is_program_owner(&account.owner))
    }
}

fn parse_mint(mint: &str) -> Result<Pubkey, GatewayError> {
    Pubkey::from_str(mint).map_err(|e| GatewayError::InvalidMint(format!("{}: {}", mint, e)))
}

pub fn decode_token_account(pubkey: &Pubkey, account: &Account) -> Result<TokenAccountRecord, GatewayError> {
    let token_account = TokenAccount::unpack(&account.data)
        .map_err(|e| GatewayError::MalformedAccountData(format!("{}: {}", pubkey, e)))?;
    Ok(TokenAccountRecord::new(token_account.owner.to_string(), token_account.amount))
}

/// Decodes raw SPL token accounts, skipping any that fail to unpack.
pub fn decode_token_accounts(accounts: Vec<(Pubkey, Account)>) -> Vec<TokenAccountRecord> {
    let total = accounts.len();
    let records: Vec<TokenAccountRecord> = accounts
        .into_par_iter()
        .filter_map(|(pubkey, account)| match decode_token_account(&pubkey, &account) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping token account: {}", e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!("Skipped {} of {} token accounts with malformed data", total - records.len(), total);
    }
    records
}

#[async_trait]
impl TokenGateway for SolanaGateway {
    async fn get_token_supply(&self, mint: &str) -> Result<TokenSupply, GatewayError> {
        let mint_pubkey = parse_mint(mint)?;

        self.rate_limiter.until_ready().await;
        let supply = self
            .client
            .get_token_supply(&mint_pubkey)
            .await
            .map_err(|e| GatewayError::from_mint_query(mint, e))?;

        let raw_amount = supply.amount.parse::<u64>().map_err(|e| {
            GatewayError::MalformedAccountData(format!("supply amount {:?} for {}: {}", supply.amount, mint, e))
        })?;
        tracing::info!("Supply for {}: {} raw ({} decimals)", mint, raw_amount, supply.decimals);

        Ok(TokenSupply {
            raw_amount,
            decimals: supply.decimals,
        })
    }

    async fn get_token_accounts_by_mint(&self, mint: &str) -> Result<Vec<TokenAccountRecord>, GatewayError> {
        let mint_pubkey = parse_mint(mint)?;
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::Memcmp(Memcmp::new(0, MemcmpEncodedBytes::Base58(mint_pubkey.to_string()))),
                RpcFilterType::DataSize(TokenAccount::LEN as u64),
            ]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..Default::default()
            },
            with_context: None,
        };

        self.rate_limiter.until_ready().await;
        let accounts = self
            .client
            .get_program_accounts_with_config(&spl_token::ID, config)
            .await
            .map_err(|e| GatewayError::from_mint_query(mint, e))?;
        tracing::info!("Found {} total token accounts", accounts.len());

        Ok(decode_token_accounts(accounts))
    }

    async fn get_account_executable_flag(&self, address: &str) -> Result<Option<bool>, GatewayError> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|e| GatewayError::MalformedAccountData(format!("{}: {}", address, e)))?;

        self.rate_limiter.until_ready().await;
        let response = self
            .client
            .get_account_with_commitment(&pubkey, self.client.commitment())
            .await?;

        Ok(response.value.map(|account| self.is_program(&account)))
    }

    async fn get_slot(&self) -> Result<u64, GatewayError> {
        self.rate_limiter.until_ready().await;
        Ok(self.client.get_slot().await?)
    }

    fn flag_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn get_executable_flags(&self, addresses: &[String]) -> Result<HashMap<String, bool>, GatewayError> {
        let pubkeys: Vec<Pubkey> = addresses
            .iter()
            .filter_map(|address| match Pubkey::from_str(address) {
                Ok(pubkey) => Some(pubkey),
                Err(e) => {
                    tracing::warn!("Cannot look up account type for {}: {}", address, e);
                    None
                }
            })
            .collect();

        let mut flags = HashMap::with_capacity(pubkeys.len());
        for chunk in pubkeys.chunks(self.batch_size) {
            self.rate_limiter.until_ready().await;
            let accounts = self.client.get_multiple_accounts(chunk).await?;
            for (pubkey, account) in chunk.iter().zip(accounts.iter()) {
                match account {
                    Some(account) => {
                        flags.insert(pubkey.to_string(), self.is_program(account));
                    }
                    None => tracing::debug!("No account found for owner {}", pubkey),
                }
            }
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_token::state::AccountState;

    fn packed_token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> Account {
        let mut data = vec![0u8; TokenAccount::LEN];
        let token_account = TokenAccount {
            mint,
            owner,
            amount,
            state: AccountState::Initialized,
            ..Default::default()
        };
        TokenAccount::pack(token_account, &mut data).unwrap();
        Account {
            lamports: 2_039_280,
            data,
            owner: spl_token::ID,
            executable: false,
            rent_epoch: 0,
        }
    }

    fn gateway() -> SolanaGateway {
        let client = Arc::new(RpcClient::new("http://127.0.0.1:8899".to_string()));
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(nonzero_ext::nonzero!(5u32))));
        SolanaGateway::new(client, limiter)
    }

    #[test]
    fn decodes_owner_and_amount() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let account = packed_token_account(mint, owner, 42);

        let record = decode_token_account(&Pubkey::new_unique(), &account).unwrap();
        assert_eq!(record.owner, owner.to_string());
        assert_eq!(record.raw_balance, 42);
    }

    #[test]
    fn skips_malformed_accounts() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let good = packed_token_account(mint, owner, 7);
        let truncated = Account {
            data: vec![1, 2, 3],
            ..good.clone()
        };
        let uninitialized = Account {
            data: vec![0u8; TokenAccount::LEN],
            ..good.clone()
        };

        let records = decode_token_accounts(vec![
            (Pubkey::new_unique(), truncated),
            (Pubkey::new_unique(), good),
            (Pubkey::new_unique(), uninitialized),
        ]);
        assert_eq!(records, vec![TokenAccountRecord::new(owner.to_string(), 7)]);
    }

    #[test]
    fn invalid_mint_is_rejected_before_any_request() {
        assert!(matches!(parse_mint("not-a-mint"), Err(GatewayError::InvalidMint(_))));
    }

    #[tokio::test]
    async fn program_owned_heuristic_is_opt_in() {
        let owned_by_dex = Account {
            lamports: 1,
            data: vec![],
            owner: Pubkey::from_str("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc").unwrap(),
            executable: false,
            rent_epoch: 0,
        };
        let executable = Account {
            executable: true,
            ..owned_by_dex.clone()
        };

        let plain = gateway();
        assert!(!plain.is_program(&owned_by_dex));
        assert!(plain.is_program(&executable));

        let heuristic = gateway().with_program_owned_heuristic(true);
        assert!(heuristic.is_program(&owned_by_dex));
    }

    #[tokio::test]
    async fn batch_size_is_clamped_to_rpc_limit() {
        assert_eq!(gateway().with_batch_size(500).batch_size, 100);
        assert_eq!(gateway().with_batch_size(0).batch_size, 1);
    }
}
