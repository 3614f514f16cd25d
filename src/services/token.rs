use super::aggregator::{aggregate, group_by_owner};
use super::classify::classify_owners;
use super::retry::{with_retry, RetryPolicy};
use super::summary::summarize;
use crate::gateway::{GatewayError, TokenGateway};
use crate::types::models::{HolderAnalysis, SnapshotInfo};
use chrono::Utc;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Fetches everything for `mint` through the gateway, then ranks and summarizes
/// the holders. Any gateway failure that survives the retry policy aborts the
/// run before aggregation.
pub async fn analyze_token_holders<G>(
    gateway: &G,
    mint: &str,
    retry: &RetryPolicy,
) -> Result<HolderAnalysis, GatewayError>
where
    G: TokenGateway + ?Sized,
{
    let operation_start = std::time::Instant::now();
    let mint = mint.trim();
    Pubkey::from_str(mint).map_err(|e| GatewayError::InvalidMint(format!("{}: {}", mint, e)))?;

    tracing::info!("Analyzing token holders for: {}", mint);

    let supply = with_retry(retry, "getTokenSupply", move || gateway.get_token_supply(mint)).await?;

    let slot = match with_retry(retry, "getSlot", move || gateway.get_slot()).await {
        Ok(slot) => Some(slot),
        Err(e) => {
            tracing::warn!("Could not fetch current slot: {}", e);
            None
        }
    };
    let snapshot = SnapshotInfo {
        slot,
        timestamp: Utc::now(),
    };

    let records = with_retry(retry, "getTokenAccountsByMint", move || {
        gateway.get_token_accounts_by_mint(mint)
    })
    .await?;
    tracing::info!("Found {} token accounts", records.len());

    let owners: Vec<String> = group_by_owner(&records)
        .into_iter()
        .map(|(owner, _)| owner.to_string())
        .collect();
    tracing::info!("Checking account types for {} unique holders...", owners.len());
    let flags = classify_owners(gateway, &owners, retry).await?;

    let aggregation = aggregate(mint, supply.decimals, supply.raw_amount, &records, &flags);
    let summary = summarize(&aggregation.holders);

    tracing::info!("Holder analysis for {} took: {:?}", mint, operation_start.elapsed());

    Ok(HolderAnalysis {
        mint: mint.to_string(),
        supply,
        token_accounts: records.len(),
        holders: aggregation.holders,
        summary,
        warnings: aggregation.warnings,
        snapshot,
    })
}
