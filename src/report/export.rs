use crate::types::models::{AccountType, HolderAnalysis};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::path::Path;

const HEADERS: &[&str] = &[
    "rank",
    "address",
    "raw_balance",
    "balance",
    "percentage",
    "account_type",
    "mint",
    "slot",
    "timestamp",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    address: &'a str,
    raw_balance: u64,
    balance: f64,
    percentage: f64,
    account_type: AccountType,
    mint: &'a str,
    slot: Option<u64>,
    timestamp: &'a str,
}

pub fn default_csv_filename(mint: &str, timestamp: DateTime<Utc>) -> String {
    let prefix: String = mint.chars().take(8).collect();
    format!("holders_{}_{}.csv", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Writes the full ranked holder list, one row per holder.
pub fn export_csv(path: &Path, analysis: &HolderAnalysis) -> Result<usize> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    writer.write_record(HEADERS)?;

    let timestamp = analysis.snapshot.timestamp.to_rfc3339();
    for (i, holder) in analysis.holders.iter().enumerate() {
        writer.serialize(CsvRow {
            rank: i + 1,
            address: &holder.address,
            raw_balance: holder.raw_balance,
            balance: holder.normalized_balance(),
            percentage: holder.percentage,
            account_type: holder.account_type,
            mint: &analysis.mint,
            slot: analysis.snapshot.slot,
            timestamp: &timestamp,
        })?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} holders to {}", analysis.holders.len(), path.display());
    Ok(analysis.holders.len())
}
