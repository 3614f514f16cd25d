use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSupply {
    pub raw_amount: u64,
    pub decimals: u8,
}

impl TokenSupply {
    pub fn normalized(&self) -> f64 {
        normalize(self.raw_amount, self.decimals)
    }
}

/// One token account as reported by the chain, keyed by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccountRecord {
    pub owner: String,
    pub raw_balance: u64,
}

impl TokenAccountRecord {
    pub fn new(owner: impl Into<String>, raw_balance: u64) -> Self {
        Self {
            owner: owner.into(),
            raw_balance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    User,
    Program,
}

impl AccountType {
    pub fn from_executable(executable: bool) -> Self {
        if executable {
            AccountType::Program
        } else {
            AccountType::User
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::User => write!(f, "USER"),
            AccountType::Program => write!(f, "PROGRAM"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHolder {
    pub address: String,
    pub raw_balance: u64,
    pub decimals: u8,
    pub percentage: f64,
    pub account_type: AccountType,
}

impl TokenHolder {
    pub fn normalized_balance(&self) -> f64 {
        normalize(self.raw_balance, self.decimals)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_holders: usize,
    pub user_count: usize,
    pub program_count: usize,
    pub top10_concentration_pct: f64,
    pub top100_concentration_pct: f64,
    pub total_tracked_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub slot: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// Data-quality findings raised while aggregating. None of them abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataWarning {
    MissingExecutableFlag { address: String },
    ZeroSupply,
    SupplyMismatch { tracked: u128, supply: u64 },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::MissingExecutableFlag { address } => {
                write!(f, "no executable flag for {}, classified as USER", address)
            }
            DataWarning::ZeroSupply => {
                write!(f, "token reports zero total supply, percentages shown as 0")
            }
            DataWarning::SupplyMismatch { tracked, supply } => write!(
                f,
                "holder balances sum to {} but total supply is {}",
                tracked, supply
            ),
        }
    }
}

/// Everything one analysis run produces, handed to the renderers.
#[derive(Debug, Clone)]
pub struct HolderAnalysis {
    pub mint: String,
    pub supply: TokenSupply,
    pub token_accounts: usize,
    pub holders: Vec<TokenHolder>,
    pub summary: SummaryStats,
    pub warnings: Vec<DataWarning>,
    pub snapshot: SnapshotInfo,
}

pub fn normalize(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}
