use super::{GatewayError, TokenGateway, MAX_ACCOUNTS_PER_REQUEST};
use crate::types::models::{TokenAccountRecord, TokenSupply};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// In-memory gateway that records calls and replays configured responses.
///
/// Failures queued with [`MockGateway::fail_next`] are returned (in order) by
/// the next calls to the named operation before the configured data is served.
#[derive(Debug, Default, Clone)]
pub struct MockGateway {
    supply: Option<TokenSupply>,
    records: Vec<TokenAccountRecord>,
    flags: HashMap<String, bool>,
    slot: u64,
    flag_batch_size: Option<usize>,
    failures: Arc<Mutex<HashMap<&'static str, VecDeque<GatewayError>>>>,
    batch_failures: Arc<Mutex<HashMap<String, VecDeque<GatewayError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    flag_batches: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supply(mut self, raw_amount: u64, decimals: u8) -> Self {
        self.supply = Some(TokenSupply { raw_amount, decimals });
        self
    }

    pub fn with_account(mut self, owner: &str, raw_balance: u64) -> Self {
        self.records.push(TokenAccountRecord::new(owner, raw_balance));
        self
    }

    pub fn with_flag(mut self, address: &str, executable: bool) -> Self {
        self.flags.insert(address.to_string(), executable);
        self
    }

    pub fn with_slot(mut self, slot: u64) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_flag_batch_size(mut self, size: usize) -> Self {
        self.flag_batch_size = Some(size);
        self
    }

    /// Queue an error for the next flag batch that includes `address`.
    pub fn fail_batch_containing(self, address: &str, error: GatewayError) -> Self {
        self.batch_failures
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .push_back(error);
        self
    }

    /// Address lists passed to `get_executable_flags`, in call order.
    pub fn flag_batches(&self) -> Vec<Vec<String>> {
        self.flag_batches.lock().unwrap().clone()
    }

    /// Queue an error for the next call to `operation` (e.g. "get_token_supply").
    pub fn fail_next(self, operation: &'static str, error: GatewayError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(error);
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == operation)
            .count()
    }

    fn record(&self, operation: &'static str) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(operation.to_string());
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(|queue| queue.pop_front())
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TokenGateway for MockGateway {
    async fn get_token_supply(&self, mint: &str) -> Result<TokenSupply, GatewayError> {
        self.record("get_token_supply")?;
        self.supply
            .ok_or_else(|| GatewayError::InvalidMint(format!("{}: no supply configured", mint)))
    }

    async fn get_token_accounts_by_mint(&self, _mint: &str) -> Result<Vec<TokenAccountRecord>, GatewayError> {
        self.record("get_token_accounts_by_mint")?;
        Ok(self.records.clone())
    }

    async fn get_account_executable_flag(&self, address: &str) -> Result<Option<bool>, GatewayError> {
        self.record("get_account_executable_flag")?;
        Ok(self.flags.get(address).copied())
    }

    async fn get_slot(&self) -> Result<u64, GatewayError> {
        self.record("get_slot")?;
        Ok(self.slot)
    }

    fn flag_batch_size(&self) -> usize {
        self.flag_batch_size.unwrap_or(MAX_ACCOUNTS_PER_REQUEST)
    }

    async fn get_executable_flags(&self, addresses: &[String]) -> Result<HashMap<String, bool>, GatewayError> {
        self.flag_batches.lock().unwrap().push(addresses.to_vec());
        self.record("get_executable_flags")?;
        {
            let mut batch_failures = self.batch_failures.lock().unwrap();
            for address in addresses {
                if let Some(err) = batch_failures.get_mut(address).and_then(|queue| queue.pop_front()) {
                    return Err(err);
                }
            }
        }
        Ok(addresses
            .iter()
            .filter_map(|address| self.flags.get(address).map(|&flag| (address.clone(), flag)))
            .collect())
    }
}
