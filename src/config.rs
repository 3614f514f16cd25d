use anyhow::{Context, Result};
use nonzero_ext::nonzero;
use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub requests_per_second: NonZeroU32,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub account_batch_size: usize,
    pub classify_program_owned: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            requests_per_second: nonzero!(5u32),
            request_timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            account_batch_size: 25,
            classify_program_owned: false,
        }
    }
}

impl Config {
    /// Reads settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let rpc_url = lookup("SOLANA_RPC_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.rpc_url);
        let requests_per_second =
            parse_var(&lookup, "RPC_REQUESTS_PER_SECOND")?.unwrap_or(defaults.requests_per_second);
        let request_timeout = parse_var::<u64, _>(&lookup, "RPC_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let max_retries = parse_var(&lookup, "RPC_MAX_RETRIES")?.unwrap_or(defaults.max_retries);
        let retry_base_delay = parse_var::<u64, _>(&lookup, "RPC_RETRY_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_base_delay);
        let account_batch_size =
            parse_var(&lookup, "RPC_ACCOUNT_BATCH_SIZE")?.unwrap_or(defaults.account_batch_size);
        let classify_program_owned =
            parse_var(&lookup, "CLASSIFY_PROGRAM_OWNED")?.unwrap_or(defaults.classify_program_owned);

        if !(1..=100).contains(&account_batch_size) {
            anyhow::bail!("RPC_ACCOUNT_BATCH_SIZE must be between 1 and 100, got {}", account_batch_size);
        }

        Ok(Self {
            rpc_url,
            requests_per_second,
            request_timeout,
            max_retries,
            retry_base_delay,
            account_batch_size,
            classify_program_owned,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            let parsed = value
                .trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, value))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}
