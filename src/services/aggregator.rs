use crate::types::models::{AccountType, DataWarning, TokenAccountRecord, TokenHolder};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub holders: Vec<TokenHolder>,
    pub warnings: Vec<DataWarning>,
}

/// Sums balances per owner in first-seen order and drops owners whose total is
/// zero.
pub fn group_by_owner(records: &[TokenAccountRecord]) -> Vec<(&str, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut grouped: Vec<(&str, u64)> = Vec::new();
    for record in records {
        match index.get(record.owner.as_str()) {
            Some(&i) => grouped[i].1 = grouped[i].1.saturating_add(record.raw_balance),
            None => {
                index.insert(record.owner.as_str(), grouped.len());
                grouped.push((record.owner.as_str(), record.raw_balance));
            }
        }
    }
    grouped.retain(|(_, balance)| *balance > 0);
    grouped
}

/// Collapses token accounts into one ranked holder per owner.
///
/// Balances of accounts sharing an owner are summed, empty holders are dropped,
/// and the result is ordered by raw balance descending. Equal balances keep the
/// order in which their owner was first seen in `records`.
pub fn aggregate(
    mint: &str,
    decimals: u8,
    total_supply_raw: u64,
    records: &[TokenAccountRecord],
    executable_flags: &HashMap<String, bool>,
) -> Aggregation {
    let mut warnings = Vec::new();
    let grouped = group_by_owner(records);

    if total_supply_raw == 0 {
        tracing::warn!("Mint {} reports zero supply, percentages will be 0", mint);
        warnings.push(DataWarning::ZeroSupply);
    }

    let mut holders: Vec<TokenHolder> = grouped
        .into_iter()
        .map(|(owner, raw_balance)| {
            let percentage = if total_supply_raw == 0 {
                0.0
            } else {
                (raw_balance as f64 / total_supply_raw as f64) * 100.0
            };

            let account_type = match executable_flags.get(owner) {
                Some(&executable) => AccountType::from_executable(executable),
                None => {
                    tracing::warn!("No executable flag for {}, treating as user account", owner);
                    warnings.push(DataWarning::MissingExecutableFlag {
                        address: owner.to_string(),
                    });
                    AccountType::User
                }
            };

            TokenHolder {
                address: owner.to_string(),
                raw_balance,
                decimals,
                percentage,
                account_type,
            }
        })
        .collect();

    holders.sort_by(|a, b| b.raw_balance.cmp(&a.raw_balance));

    let tracked: u128 = holders.iter().map(|h| h.raw_balance as u128).sum();
    if total_supply_raw > 0 && tracked != total_supply_raw as u128 {
        tracing::warn!(
            "Holder balances for {} sum to {} but supply is {}",
            mint,
            tracked,
            total_supply_raw
        );
        warnings.push(DataWarning::SupplyMismatch {
            tracked,
            supply: total_supply_raw,
        });
    }

    tracing::info!(
        "Aggregated {} token accounts into {} holders for {}",
        records.len(),
        holders.len(),
        mint
    );

    Aggregation { holders, warnings }
}
